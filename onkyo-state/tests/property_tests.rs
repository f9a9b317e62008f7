//! Property-based tests for ReceiverState and the session policy

use proptest::prelude::*;

use onkyo_api::{
    ImageType, InformationType, JacketArt, LayerInfo, ListInfo, ListTitleInfo, Message,
    PacketFlag, PlayStatus, PlayStatusInfo, PowerStatus, ServiceType, TrackIndex, UiType,
    UpdateType, XmlListInfo, XmlListRequest,
};
use onkyo_state::{ChangeKind, Cover, ReceiverState, RecordingTransport, Session, SessionConfig};

// ============================================================================
// Strategies
// ============================================================================

fn service_strategy() -> impl Strategy<Value = ServiceType> {
    prop_oneof![
        Just(ServiceType::Net),
        Just(ServiceType::Usb),
        Just(ServiceType::TuneIn),
        Just(ServiceType::Spotify),
        Just(ServiceType::Deezer),
        Just(ServiceType::PlayQueue),
    ]
}

fn ui_strategy() -> impl Strategy<Value = UiType> {
    prop_oneof![
        Just(UiType::List),
        Just(UiType::Menu),
        Just(UiType::Playback),
        Just(UiType::Popup),
        Just(UiType::Keyboard),
        Just(UiType::MenuList),
    ]
}

fn layer_strategy() -> impl Strategy<Value = LayerInfo> {
    prop_oneof![
        Just(LayerInfo::NetTop),
        Just(LayerInfo::ServiceTop),
        Just(LayerInfo::Under2ndLayer),
    ]
}

fn list_title_strategy() -> impl Strategy<Value = Message> {
    (
        service_strategy(),
        ui_strategy(),
        layer_strategy(),
        0u16..20,
        0u8..4,
        "[A-Za-z ]{0,12}",
    )
        .prop_map(|(service_type, ui_type, layer_info, items, layers, title)| {
            Message::ListTitleInfo(ListTitleInfo {
                service_type,
                ui_type,
                layer_info,
                cursor_position: 0,
                number_of_items: items,
                number_of_layers: layers,
                title_bar: title,
            })
        })
}

fn list_info_strategy() -> impl Strategy<Value = Message> {
    let names = prop_oneof![
        Just("TuneIn"),
        Just("Spotify"),
        Just("Deezer"),
        Just("Play Queue"),
        Just("Something Else"),
    ];
    prop_oneof![
        (0u8..10, names).prop_map(|(line, name)| Message::ListInfo(ListInfo::Line {
            info_type: InformationType::Unicode,
            line: Some(line),
            property: '-',
            text: name.to_string(),
        })),
        Just(Message::ListInfo(ListInfo::Cursor {
            line: None,
            update: UpdateType::Page,
        })),
    ]
}

fn xml_list_strategy() -> impl Strategy<Value = Message> {
    prop::collection::vec("[A-Za-z][A-Za-z ]{0,11}", 0..6).prop_map(|titles| {
        let items: String = titles
            .iter()
            .map(|t| format!(r#"<item iconid="2D" title="{}" selectable="1"/>"#, t))
            .collect();
        Message::XmlListInfo(XmlListInfo {
            request_id: 1,
            success: true,
            ui_type: Some(UiType::List),
            xml: format!(
                r#"<response status="ok"><items offset="0" totalitems="{}">{}</items></response>"#,
                titles.len(),
                items
            ),
        })
    })
}

fn play_status_strategy() -> impl Strategy<Value = Message> {
    prop_oneof![
        Just(PlayStatus::Stop),
        Just(PlayStatus::Play),
        Just(PlayStatus::Pause),
        Just(PlayStatus::FastForward),
        Just(PlayStatus::EndOfFile),
    ]
    .prop_map(|play| {
        Message::PlayStatus(PlayStatusInfo {
            play,
            ..PlayStatusInfo::default()
        })
    })
}

/// Any message whose repeated application must be idempotent
fn message_strategy() -> impl Strategy<Value = Message> {
    prop_oneof![
        prop_oneof![Just(PowerStatus::On), Just(PowerStatus::Standby)].prop_map(Message::Power),
        (0u8..=80).prop_map(Message::MasterVolume),
        any::<bool>().prop_map(Message::AudioMuting),
        "[A-Za-z0-9 ]{0,16}".prop_map(Message::TitleName),
        "[A-Za-z0-9 ]{0,16}".prop_map(Message::ArtistName),
        (1u32..50, 1u32..50).prop_map(|(current, total)| Message::TrackInfo(TrackIndex {
            current: Some(current),
            total: Some(total),
        })),
        play_status_strategy(),
        list_title_strategy(),
        list_info_strategy(),
        xml_list_strategy(),
        Just(Message::JacketArt(JacketArt::NoImage)),
        "[a-z]{1,8}".prop_map(|host| Message::JacketArt(JacketArt::Url(format!(
            "http://{}/art.jpg",
            host
        )))),
    ]
}

fn cover_chunks(parts: &[Vec<u8>]) -> Vec<Message> {
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, data)| {
            let flag = match i {
                0 => PacketFlag::Start,
                i if i == last => PacketFlag::End,
                _ => PacketFlag::Next,
            };
            Message::JacketArt(JacketArt::Chunk {
                image_type: ImageType::Jpeg,
                flag,
                data: data.clone(),
            })
        })
        .collect()
}

// ============================================================================
// ReceiverState properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A list title with a new service type always leaves both lists empty,
    /// and at no point are both lists populated.
    #[test]
    fn prop_service_type_switch_clears_lists(
        messages in prop::collection::vec(message_strategy(), 1..40),
    ) {
        let mut state = ReceiverState::new();
        for message in &messages {
            let previous = state.navigation.service_type;
            state.apply(message);

            if let Message::ListTitleInfo(info) = message {
                if info.service_type != previous {
                    prop_assert!(state.navigation.media_items.is_empty());
                    prop_assert!(state.navigation.service_items.is_empty());
                }
            }
            prop_assert!(
                state.navigation.media_items.is_empty() || state.navigation.service_items.is_empty(),
                "both lists populated after {:?}",
                message
            );
        }
    }

    /// Applying the same message twice reports no change the second time and
    /// leaves the state untouched.
    #[test]
    fn prop_apply_is_idempotent(
        prefix in prop::collection::vec(message_strategy(), 0..20),
        message in message_strategy(),
    ) {
        let mut state = ReceiverState::new();
        for m in &prefix {
            state.apply(m);
        }

        state.apply(&message);
        let after_first = state.clone();
        prop_assert_eq!(state.apply(&message), ChangeKind::None);
        prop_assert_eq!(state, after_first);
    }

    /// Chunked cover art reassembles to the same bytes as one contiguous block.
    #[test]
    fn prop_chunked_cover_matches_contiguous(
        parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 2..6),
    ) {
        let mut chunked = ReceiverState::new();
        for message in cover_chunks(&parts) {
            chunked.apply(&message);
        }

        let mut whole = ReceiverState::new();
        whole.apply(&Message::JacketArt(JacketArt::Chunk {
            image_type: ImageType::Jpeg,
            flag: PacketFlag::NotUsed,
            data: parts.concat(),
        }));

        prop_assert_eq!(&chunked.track.cover, &whole.track.cover);
        prop_assert_eq!(
            &chunked.track.cover,
            &Some(Cover::Image { image_type: ImageType::Jpeg, bytes: parts.concat() })
        );
        prop_assert!(!chunked.cover_in_progress());
    }

    /// Chunks without a START never produce an image.
    #[test]
    fn prop_orphan_chunks_are_dropped(
        parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..5),
    ) {
        let mut state = ReceiverState::new();
        for data in &parts {
            let kind = state.apply(&Message::JacketArt(JacketArt::Chunk {
                image_type: ImageType::Bmp,
                flag: PacketFlag::Next,
                data: data.clone(),
            }));
            prop_assert_eq!(kind, ChangeKind::None);
        }
        state.apply(&Message::JacketArt(JacketArt::Chunk {
            image_type: ImageType::Bmp,
            flag: PacketFlag::End,
            data: vec![],
        }));
        prop_assert!(state.track.cover.is_none());
        prop_assert!(!state.cover_in_progress());
    }
}

// ============================================================================
// Session properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Stop to play with empty lists schedules exactly one list title query,
    /// whatever happened before, as long as the lists ended up empty.
    #[test]
    fn prop_stop_to_play_requests_list_state_once(
        prefix in prop::collection::vec(
            prop_oneof![
                (0u8..=80).prop_map(Message::MasterVolume),
                "[A-Za-z]{0,8}".prop_map(Message::TitleName),
                list_title_strategy(),
            ],
            0..10,
        ),
    ) {
        let mut transport = RecordingTransport::new();
        let mut session = Session::new(SessionConfig::default().with_initial_queries(false));
        for message in prefix {
            session.process(message, &mut transport);
        }
        session.process(
            Message::PlayStatus(PlayStatusInfo { play: PlayStatus::Stop, ..Default::default() }),
            &mut transport,
        );
        prop_assume!(session.state().navigation.lists_empty());
        transport.take();

        session.process(
            Message::PlayStatus(PlayStatusInfo { play: PlayStatus::Play, ..Default::default() }),
            &mut transport,
        );
        prop_assert_eq!(transport.queries_for(onkyo_api::code::LIST_TITLE_INFO), 1);
        prop_assert!(session.pending_xml_list());
    }

    /// Structured list request ids strictly increase.
    #[test]
    fn prop_request_ids_increase(
        messages in prop::collection::vec(
            prop_oneof![
                (1u32..20).prop_map(|n| Message::TrackInfo(TrackIndex { current: Some(n), total: Some(20) })),
                list_title_strategy(),
                list_info_strategy(),
            ],
            1..40,
        ),
    ) {
        let mut transport = RecordingTransport::new();
        let mut session = Session::new(SessionConfig::default().with_initial_queries(false));
        for message in messages {
            session.process(message, &mut transport);
        }

        let ids: Vec<u16> = transport
            .sent()
            .into_iter()
            .filter_map(|c| match c {
                onkyo_api::Command::XmlListRequest(XmlListRequest { request_id, .. }) => Some(request_id),
                _ => None,
            })
            .collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids {:?}", ids);
    }
}
