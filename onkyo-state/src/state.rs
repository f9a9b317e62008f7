//! Receiver state aggregate
//!
//! [`ReceiverState`] is the reconciled view of one receiver. It is owned and
//! mutated by the session loop only; listeners receive `Arc` snapshots.
//!
//! Every inbound message goes through [`ReceiverState::apply`], which updates
//! exactly the fields that message owns and reports a [`ChangeKind`]. Applying
//! the same message twice in a row reports `ChangeKind::None` the second time,
//! except for middle chunks of a cover transfer, which append by nature.
//!
//! # Invariants
//!
//! - at most one of `media_items` and `service_items` is non-empty
//! - a list title with a different service type clears both lists
//! - the cover assembly buffer only exists between a START and END chunk

use onkyo_api::{
    DigitalFilter, DimmerLevel, ImageType, InformationType, InputSelector, JacketArt, LayerInfo,
    ListInfo, ListTitleInfo, MenuStatus, Message, PacketFlag, PlayStatus, PlayStatusInfo,
    PowerStatus, ReceiverInformation, ServiceType, TimeInfo, Tone, TrackIndex, UiType,
    UpdateType, XmlList, XmlListInfo, XmlListItem,
};
use serde::Serialize;

use crate::change::ChangeKind;

// ============================================================================
// State groups
// ============================================================================

/// Power and device identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PowerState {
    pub status: PowerStatus,
    /// Parsed NRI descriptor, once received
    pub device: Option<ReceiverInformation>,
    pub friendly_name: Option<String>,
    pub input_selector: Option<InputSelector>,
    pub dimmer_level: Option<DimmerLevel>,
    pub digital_filter: Option<DigitalFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioState {
    pub master_volume: Option<u8>,
    pub muted: bool,
    pub listening_mode: Option<u8>,
    pub tone_front: Option<Tone>,
}

/// Finished cover art
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cover {
    /// Raw image bytes reassembled from NJA chunks
    Image { image_type: ImageType, bytes: Vec<u8> },
    /// Location for the UI to fetch the image from
    Url(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackState {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub file_format: String,
    pub time: TimeInfo,
    pub track: TrackIndex,
    pub cover: Option<Cover>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub status: PlayStatusInfo,
    pub menu: MenuStatus,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status.play.is_playing()
    }

    pub fn seek_enabled(&self) -> bool {
        self.menu.seek_enabled
    }

    pub fn track_menu(&self) -> bool {
        self.menu.track_menu
    }
}

/// One entry of the NET top listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceItem {
    pub line: Option<u8>,
    pub service: ServiceType,
    pub name: String,
}

/// Navigation context from NLT plus the browsable lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    pub service_type: ServiceType,
    pub ui_type: UiType,
    pub layer_info: LayerInfo,
    pub cursor_position: u16,
    pub number_of_items: u16,
    pub number_of_layers: u8,
    pub title_bar: String,
    /// Structured list from NLA
    pub media_items: Vec<XmlListItem>,
    /// Simple NLS listing of network services
    pub service_items: Vec<ServiceItem>,
}

impl NavigationState {
    /// The NET top level, whose listing describes itself
    pub fn is_net_top(&self) -> bool {
        self.service_type == ServiceType::Net && self.layer_info == LayerInfo::NetTop
    }

    pub fn is_top_layer(&self) -> bool {
        self.layer_info != LayerInfo::Under2ndLayer
    }

    pub fn is_playback_mode(&self) -> bool {
        self.ui_type == UiType::Playback
    }

    pub fn is_menu_mode(&self) -> bool {
        self.ui_type == UiType::Menu
    }

    pub fn lists_empty(&self) -> bool {
        self.media_items.is_empty() && self.service_items.is_empty()
    }

    /// Clear both lists, returning whether anything was removed
    fn clear_lists(&mut self) -> bool {
        let had_items = !self.lists_empty();
        self.media_items.clear();
        self.service_items.clear();
        had_items
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CoverBuffer {
    image_type: ImageType,
    bytes: Vec<u8>,
}

// ============================================================================
// ReceiverState
// ============================================================================

/// Last known state of one receiver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverState {
    pub power: PowerState,
    pub audio: AudioState,
    pub track: TrackState,
    pub playback: PlaybackState,
    pub navigation: NavigationState,
    model_fallback: Option<String>,
    #[serde(skip)]
    cover_buffer: Option<CoverBuffer>,
}

impl ReceiverState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that reports `model` until the receiver describes itself
    pub fn with_model_fallback(model: Option<String>) -> Self {
        Self {
            model_fallback: model,
            ..Self::default()
        }
    }

    pub fn is_on(&self) -> bool {
        self.power.status.is_on()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn play_status(&self) -> PlayStatus {
        self.playback.status.play
    }

    pub fn is_playback_mode(&self) -> bool {
        self.navigation.is_playback_mode()
    }

    pub fn model(&self) -> Option<&str> {
        self.power
            .device
            .as_ref()
            .map(|device| device.model.as_str())
            .filter(|model| !model.is_empty())
            .or(self.model_fallback.as_deref())
    }

    pub fn cover_in_progress(&self) -> bool {
        self.cover_buffer.is_some()
    }

    /// Apply one inbound message
    pub fn apply(&mut self, message: &Message) -> ChangeKind {
        let kind = match message {
            Message::Power(status) => common(replace(&mut self.power.status, *status)),
            Message::ReceiverInformation(xml) => self.apply_receiver_information(xml),
            Message::FriendlyName(name) => common(replace(
                &mut self.power.friendly_name,
                Some(name.clone()).filter(|n| !n.is_empty()),
            )),
            Message::InputSelector(selector) => {
                common(replace(&mut self.power.input_selector, Some(*selector)))
            }
            Message::DimmerLevel(level) => common(replace(&mut self.power.dimmer_level, Some(*level))),
            Message::DigitalFilter(filter) => {
                common(replace(&mut self.power.digital_filter, Some(*filter)))
            }

            Message::MasterVolume(volume) => {
                audio(replace(&mut self.audio.master_volume, Some(*volume)))
            }
            Message::AudioMuting(muted) => audio(replace(&mut self.audio.muted, *muted)),
            Message::ListeningMode(mode) => audio(replace(&mut self.audio.listening_mode, Some(*mode))),
            Message::ToneFront(tone) => audio(replace(&mut self.audio.tone_front, Some(*tone))),

            Message::JacketArt(art) => track(self.apply_jacket_art(art)),
            Message::ArtistName(name) => track(replace(&mut self.track.artist, name.clone())),
            Message::AlbumName(name) => track(replace(&mut self.track.album, name.clone())),
            Message::TitleName(name) => track(replace(&mut self.track.title, name.clone())),
            Message::FileFormat(format) => track(replace(&mut self.track.file_format, format.clone())),
            Message::TimeInfo(time) => track(replace(&mut self.track.time, time.clone())),
            Message::TrackInfo(index) => track(replace(&mut self.track.track, *index)),

            Message::PlayStatus(status) => playback(replace(&mut self.playback.status, *status)),
            Message::MenuStatus(menu) => playback(replace(&mut self.playback.menu, menu.clone())),

            Message::ListTitleInfo(info) => media(self.apply_list_title(info)),
            Message::ListInfo(info) => media(self.apply_list_info(info)),
            Message::XmlListInfo(info) => media(self.apply_xml_list(info)),

            Message::Unknown { code, .. } => {
                tracing::trace!("Ignoring unhandled message code {}", code);
                ChangeKind::None
            }
        };

        if kind.is_change() {
            tracing::trace!("{} changed {:?}", message.code(), kind);
        }
        kind
    }

    fn apply_receiver_information(&mut self, xml: &str) -> ChangeKind {
        match ReceiverInformation::parse(xml) {
            Ok(info) => {
                tracing::debug!(
                    "Receiver {} {} with {} selectors",
                    info.brand,
                    info.model,
                    info.selectors.len()
                );
                common(replace(&mut self.power.device, Some(info)))
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed receiver information: {}", e);
                ChangeKind::None
            }
        }
    }

    fn apply_jacket_art(&mut self, art: &JacketArt) -> bool {
        // URL and no-image covers travel outside the chunk channel and leave
        // any assembly in progress untouched
        match art {
            JacketArt::NoImage => replace(&mut self.track.cover, None),
            JacketArt::Url(url) => replace(&mut self.track.cover, Some(Cover::Url(url.clone()))),
            JacketArt::Chunk {
                image_type,
                flag,
                data,
            } => self.apply_cover_chunk(*image_type, *flag, data),
        }
    }

    /// Whether a chunk of `image_type` would interfere with another channel's
    /// assembly
    fn foreign_chunk(&self, image_type: ImageType) -> bool {
        self.cover_buffer
            .as_ref()
            .is_some_and(|buffer| buffer.image_type != image_type)
    }

    fn apply_cover_chunk(&mut self, image_type: ImageType, flag: PacketFlag, data: &[u8]) -> bool {
        if self.foreign_chunk(image_type) && flag != PacketFlag::NotUsed {
            tracing::debug!("Ignoring {:?} cover chunk mid-assembly", image_type);
            return false;
        }

        match flag {
            PacketFlag::Start => {
                self.cover_buffer = Some(CoverBuffer {
                    image_type,
                    bytes: data.to_vec(),
                });
                false
            }
            PacketFlag::Next => {
                match self.cover_buffer.as_mut() {
                    Some(buffer) => buffer.bytes.extend_from_slice(data),
                    None => tracing::debug!("Dropping cover chunk without START"),
                }
                false
            }
            PacketFlag::End => match self.cover_buffer.take() {
                Some(mut buffer) => {
                    buffer.bytes.extend_from_slice(data);
                    tracing::debug!("Cover complete, {} bytes", buffer.bytes.len());
                    replace(
                        &mut self.track.cover,
                        Some(Cover::Image {
                            image_type,
                            bytes: buffer.bytes,
                        }),
                    )
                }
                None => {
                    tracing::debug!("Dropping cover END without START");
                    false
                }
            },
            // Single-frame image; only one of the assembling channel restarts it
            PacketFlag::NotUsed => {
                if !self.foreign_chunk(image_type) {
                    self.cover_buffer = None;
                }
                replace(
                    &mut self.track.cover,
                    Some(Cover::Image {
                        image_type,
                        bytes: data.to_vec(),
                    }),
                )
            }
        }
    }

    fn apply_list_title(&mut self, info: &ListTitleInfo) -> bool {
        let nav = &mut self.navigation;
        let mut changed = false;

        if nav.service_type != info.service_type {
            tracing::debug!(
                "Service type {} -> {}, clearing lists",
                nav.service_type,
                info.service_type
            );
            nav.service_type = info.service_type;
            nav.clear_lists();
            changed = true;
        }

        changed |= replace(&mut nav.ui_type, info.ui_type);
        changed |= replace(&mut nav.layer_info, info.layer_info);
        changed |= replace(&mut nav.cursor_position, info.cursor_position);
        changed |= replace(&mut nav.number_of_items, info.number_of_items);
        changed |= replace(&mut nav.number_of_layers, info.number_of_layers);
        changed |= replace(&mut nav.title_bar, info.title_bar.clone());

        if nav.is_menu_mode() {
            changed |= nav.clear_lists();
        }
        changed
    }

    fn apply_list_info(&mut self, info: &ListInfo) -> bool {
        let nav = &mut self.navigation;
        match info {
            ListInfo::Cursor {
                update: UpdateType::Page,
                ..
            } => {
                let had_items = !nav.service_items.is_empty();
                nav.service_items.clear();
                had_items
            }
            ListInfo::Cursor { .. } => false,
            ListInfo::Line {
                info_type: InformationType::Ascii | InformationType::Unicode,
                line,
                text,
                ..
            } if nav.is_net_top() => {
                let item = ServiceItem {
                    line: *line,
                    service: ServiceType::from_name(text).unwrap_or_default(),
                    name: text.trim().to_string(),
                };
                let mut changed = !nav.media_items.is_empty();
                nav.media_items.clear();

                match nav.service_items.iter_mut().find(|i| i.line == item.line) {
                    Some(existing) => changed |= replace(existing, item),
                    None => {
                        let at = nav
                            .service_items
                            .iter()
                            .position(|i| i.line > item.line)
                            .unwrap_or(nav.service_items.len());
                        nav.service_items.insert(at, item);
                        changed = true;
                    }
                }
                changed
            }
            ListInfo::Line { .. } => false,
        }
    }

    fn apply_xml_list(&mut self, info: &XmlListInfo) -> bool {
        if !info.success {
            tracing::warn!("Receiver rejected list request {}", info.request_id);
            return false;
        }
        match XmlList::parse(&info.xml) {
            Ok(list) => {
                let nav = &mut self.navigation;
                let mut changed = !nav.service_items.is_empty();
                nav.service_items.clear();
                changed |= replace(&mut nav.media_items, list.items);
                changed
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed list {}: {}", info.request_id, e);
                false
            }
        }
    }
}

/// Store `value`, returning whether it differed
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn classify(changed: bool, kind: ChangeKind) -> ChangeKind {
    if changed {
        kind
    } else {
        ChangeKind::None
    }
}

fn common(changed: bool) -> ChangeKind {
    classify(changed, ChangeKind::Common)
}

fn audio(changed: bool) -> ChangeKind {
    classify(changed, ChangeKind::AudioControl)
}

fn track(changed: bool) -> ChangeKind {
    classify(changed, ChangeKind::TrackInfo)
}

fn playback(changed: bool) -> ChangeKind {
    classify(changed, ChangeKind::PlaybackState)
}

fn media(changed: bool) -> ChangeKind {
    classify(changed, ChangeKind::MediaItems)
}
