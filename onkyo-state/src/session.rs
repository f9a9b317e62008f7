//! Session reaction policy
//!
//! [`Session`] owns the [`ReceiverState`] of one connection together with the
//! scheduling flags that decide which follow-up queries to send:
//!
//! - the pending structured list flag, set whenever the listing on screen is
//!   expected to change and cleared once an `NLA` request goes out
//! - the time message skip counter, armed by a seek so stale positions do not
//!   make the progress bar jump back
//! - the circular auto-play command, re-sent on every populated list title
//!   until the user sends something else
//!
//! A session is a plain value driven by its caller: [`Session::process`] for
//! inbound messages and the `send_*` methods for user actions. Every query it
//! decides on goes to the [`Transport`] before `process` returns, so queries
//! caused by message N always precede the handling of message N+1.
//! [`SessionController`](crate::SessionController) runs one on a worker thread.
//!
//! ```rust,ignore
//! let mut transport = RecordingTransport::new();
//! let mut session = Session::new(SessionConfig::default());
//! session.start(&mut transport);
//!
//! let kind = session.process(Message::from_iscp("!1PWR01")?, &mut transport);
//! assert_eq!(kind, ChangeKind::Common);
//! ```

use onkyo_api::{code, Command, ListTitleInfo, Message, XmlListRequest};

use crate::change::ChangeKind;
use crate::config::SessionConfig;
use crate::queries::QueryGroup;
use crate::state::ReceiverState;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    state: ReceiverState,
    pending_xml_list: bool,
    skip_time_messages: u32,
    circular_autoplay: Option<Command>,
    autoplay_retries: u32,
    next_request_id: u16,
    /// A structured list request went out and neither its reply nor a new
    /// list title has arrived yet
    list_request_in_flight: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let state = ReceiverState::with_model_fallback(config.model.clone());
        Self {
            config,
            state,
            pending_xml_list: false,
            skip_time_messages: 0,
            circular_autoplay: None,
            autoplay_retries: 0,
            next_request_id: 1,
            list_request_in_flight: false,
        }
    }

    pub fn state(&self) -> &ReceiverState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pending_xml_list(&self) -> bool {
        self.pending_xml_list
    }

    pub fn circular_autoplay(&self) -> Option<&Command> {
        self.circular_autoplay.as_ref()
    }

    pub fn skip_time_messages(&self) -> u32 {
        self.skip_time_messages
    }

    /// Send the initial power-state queries, unless disabled
    pub fn start(&mut self, transport: &mut dyn Transport) {
        if self.config.send_initial_queries {
            self.send_query_group(QueryGroup::PowerState, transport);
        }
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    /// Apply one inbound message and send whatever queries it calls for
    ///
    /// A time message swallowed by the post-seek skip counter reports
    /// `ChangeKind::None` without touching the state.
    pub fn process(&mut self, message: Message, transport: &mut dyn Transport) -> ChangeKind {
        if let Message::TimeInfo(_) = message {
            if self.skip_time_messages > 0 {
                self.skip_time_messages -= 1;
                tracing::trace!(
                    "Skipping time message after seek, {} left",
                    self.skip_time_messages
                );
                return ChangeKind::None;
            }
        }

        let previous_play = self.state.play_status();
        let was_playing_in_playback = self.state.is_playing() && self.state.is_playback_mode();

        let kind = self.state.apply(&message);

        match &message {
            Message::Power(status) if kind.is_change() => {
                tracing::debug!("Power changed to {:?}", status);
                self.send_query_group(QueryGroup::PlayState, transport);
                self.request_list_state(transport);
            }
            Message::PlayStatus(status) => {
                if was_playing_in_playback {
                    transport.transmit(&Command::query(code::MENU_STATUS));
                }
                if status.play != previous_play {
                    tracing::debug!("Play status {:?} -> {:?}", previous_play, status.play);
                    if status.play.is_playing() {
                        self.send_query_group(QueryGroup::TrackState, transport);
                        if self.state.navigation.lists_empty() {
                            self.request_list_state(transport);
                        }
                    } else {
                        self.request_list_state(transport);
                    }
                }
            }
            Message::TrackInfo(_) => {
                self.pending_xml_list = true;
            }
            Message::ListInfo(_) => {
                if !self.list_request_in_flight && self.is_delayed_usb_listing() {
                    tracing::debug!(
                        "USB listing announces {} items but {} are known, requesting list",
                        self.state.navigation.number_of_items,
                        self.state.navigation.media_items.len()
                    );
                    self.request_xml_list(transport);
                }
            }
            Message::XmlListInfo(_) => {
                self.list_request_in_flight = false;
            }
            Message::ListTitleInfo(info) => self.on_list_title(info, transport),
            _ => {}
        }

        kind
    }

    /// USB storage sometimes finishes indexing after the list title went out,
    /// leaving the top listing with fewer items than announced
    fn is_delayed_usb_listing(&self) -> bool {
        let nav = &self.state.navigation;
        let usb_selected = self
            .state
            .power
            .input_selector
            .is_some_and(|selector| self.config.is_usb_selector(selector));

        usb_selected
            && nav.is_top_layer()
            && nav.number_of_items > 0
            && nav.media_items.len() != usize::from(nav.number_of_items)
    }

    fn on_list_title(&mut self, info: &ListTitleInfo, transport: &mut dyn Transport) {
        self.list_request_in_flight = false;

        if let Some(command) = self.circular_autoplay.clone() {
            if info.number_of_items == 0 {
                return;
            }

            let exhausted = self
                .config
                .autoplay_retry_limit
                .is_some_and(|limit| self.autoplay_retries >= limit);
            if !exhausted {
                self.autoplay_retries += 1;
                tracing::debug!("Auto-play retry {}: {}", self.autoplay_retries, command);
                self.pending_xml_list = true;
                transport.transmit(&command);
                return;
            }

            tracing::warn!(
                "Giving up auto-play of {} after {} retries",
                command,
                self.autoplay_retries
            );
            self.clear_circular_autoplay();
        }

        if self.pending_xml_list {
            self.request_xml_list_if_useful(transport);
        }
    }

    fn request_xml_list_if_useful(&mut self, transport: &mut dyn Transport) {
        let nav = &self.state.navigation;
        if nav.is_net_top() {
            tracing::trace!("NET top listing, no structured list needed");
            return;
        }
        if nav.is_playback_mode() || nav.is_menu_mode() {
            tracing::trace!("{:?} screen, no structured list needed", nav.ui_type);
            return;
        }
        if nav.number_of_layers > 0 {
            self.request_xml_list(transport);
        }
    }

    fn request_xml_list(&mut self, transport: &mut dyn Transport) {
        let request = XmlListRequest {
            request_id: self.next_request_id,
            layer: self.state.navigation.number_of_layers,
            offset: self.config.xml_list_offset,
            count: self.state.navigation.number_of_items,
        };
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.pending_xml_list = false;
        self.list_request_in_flight = true;

        tracing::debug!(
            "Requesting list {} (layer {}, {} items)",
            request.request_id,
            request.layer,
            request.count
        );
        transport.transmit(&Command::XmlListRequest(request));
    }

    /// Ask for the list title and fetch the structured list once it arrives
    fn request_list_state(&mut self, transport: &mut dyn Transport) {
        self.pending_xml_list = true;
        transport.transmit(&Command::query(code::LIST_TITLE_INFO));
    }

    fn send_query_group(&mut self, group: QueryGroup, transport: &mut dyn Transport) {
        tracing::debug!("Sending {:?} queries", group);
        for command in group.commands() {
            transport.transmit(&command);
        }
    }

    fn clear_circular_autoplay(&mut self) {
        self.circular_autoplay = None;
        self.autoplay_retries = 0;
    }

    // ========================================================================
    // Outbound
    // ========================================================================

    /// Send a user command
    ///
    /// Any explicit send cancels circular auto-play.
    pub fn send_message(&mut self, command: Command, transport: &mut dyn Transport) {
        if command.has_impact_on_media_list()
            || (command.is_display_mode_change() && !self.state.is_playback_mode())
        {
            self.pending_xml_list = true;
        }
        if self.circular_autoplay.is_some() {
            tracing::debug!("{} cancels auto-play", command);
            self.clear_circular_autoplay();
        }
        transport.transmit(&command);
    }

    /// Send a play queue command, optionally re-sending it on every populated
    /// list title until another command is sent
    pub fn send_play_queue_msg(
        &mut self,
        command: Command,
        repeat: bool,
        transport: &mut dyn Transport,
    ) {
        if repeat {
            self.circular_autoplay = Some(command.clone());
            self.autoplay_retries = 0;
        }
        self.pending_xml_list = true;
        transport.transmit(&command);
    }

    /// Seek to `seconds` into the current track
    pub fn seek(&mut self, seconds: u32, transport: &mut dyn Transport) {
        self.send_message(Command::seek_seconds(seconds), transport);
        self.skip_time_messages = self.config.time_skip_after_seek;
    }
}
