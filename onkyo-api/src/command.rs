//! Outbound commands
//!
//! A `Command` is what the client sends to the receiver: either a `QSTN`
//! status query or an action. Commands are values; encoding them into an eISCP
//! frame is the transport's job (see [`crate::frame`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::code;
use crate::types::{InputSelector, OperationCommand, PowerStatus, ServiceType};

/// Parameters of a structured list request (NLA `L` request)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XmlListRequest {
    /// Monotonic sequence number echoed back in the NLA reply
    pub request_id: u16,
    /// Layer to list (the NLT layer count)
    pub layer: u8,
    pub offset: u16,
    pub count: u16,
}

/// Where a play queue addition lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueAddType {
    PlayNow,
    PlayNext,
    AddLast,
    ReplaceAndPlay,
}

impl QueueAddType {
    fn digit(&self) -> char {
        match self {
            QueueAddType::PlayNow => '0',
            QueueAddType::PlayNext => '1',
            QueueAddType::AddLast => '2',
            QueueAddType::ReplaceAndPlay => '3',
        }
    }
}

/// A command sent to the receiver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// `<code>QSTN`
    Query(String),
    Power(PowerStatus),
    InputSelector(InputSelector),
    Operation(OperationCommand),
    /// Open a network service from the NET top listing
    NetworkService(ServiceType),
    /// Toggle the front display / remote display mode
    DisplayMode,
    /// Seek within the current track, `hh:mm:ss`
    TimeSeek(String),
    XmlListRequest(XmlListRequest),
    /// Select an item of the structured list
    XmlListItem { layer: u8, index: u16 },
    PlayQueueAdd {
        layer: u8,
        index: u16,
        add_type: QueueAddType,
        target: u16,
    },
    PlayQueueRemove { index: u16 },
    PlayQueueClear,
    /// Anything else, sent verbatim
    Raw { code: String, parameter: String },
}

impl Command {
    pub fn query(code: &str) -> Self {
        Command::Query(code.to_string())
    }

    /// Build a time seek command from a position in seconds
    pub fn seek_seconds(seconds: u32) -> Self {
        Command::TimeSeek(format!(
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        ))
    }

    pub fn code(&self) -> &str {
        match self {
            Command::Query(code) => code,
            Command::Power(_) => code::POWER,
            Command::InputSelector(_) => code::INPUT_SELECTOR,
            Command::Operation(_) => code::OPERATION,
            Command::NetworkService(_) => code::NETWORK_SERVICE,
            Command::DisplayMode => code::DISPLAY_MODE,
            Command::TimeSeek(_) => code::TIME_SEEK,
            Command::XmlListRequest(_) => code::XML_LIST_INFO,
            Command::XmlListItem { .. } => code::XML_LIST_ITEM,
            Command::PlayQueueAdd { .. } => code::PLAY_QUEUE_ADD,
            Command::PlayQueueRemove { .. } | Command::PlayQueueClear => code::PLAY_QUEUE_REMOVE,
            Command::Raw { code, .. } => code,
        }
    }

    pub fn parameter(&self) -> String {
        match self {
            Command::Query(_) => code::QUERY.to_string(),
            Command::Power(status) => status.code().to_string(),
            Command::InputSelector(selector) => selector.code(),
            Command::Operation(op) => op.code().to_string(),
            Command::NetworkService(service) => {
                format!("{:02X}0", service.hex().unwrap_or_default())
            }
            Command::DisplayMode => "TG".to_string(),
            Command::TimeSeek(time) => time.clone(),
            Command::XmlListRequest(req) => format!(
                "L{:04X}{:02X}{:04X}{:04X}",
                req.request_id, req.layer, req.offset, req.count
            ),
            Command::XmlListItem { layer, index } => format!("I{:02X}{:04X}----", layer, index),
            Command::PlayQueueAdd {
                layer,
                index,
                add_type,
                target,
            } => format!("{:02X}{:04X}{}{:04X}", layer, index, add_type.digit(), target),
            Command::PlayQueueRemove { index } => format!("0{:04X}", index),
            Command::PlayQueueClear => "10000".to_string(),
            Command::Raw { parameter, .. } => parameter.clone(),
        }
    }

    /// ISCP text form, e.g. `!1NTCPLAY`
    pub fn to_iscp(&self) -> String {
        format!("!1{}{}", self.code(), self.parameter())
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Command::Query(_))
    }

    /// True when the receiver is expected to replace the current listing after this command
    pub fn has_impact_on_media_list(&self) -> bool {
        match self {
            Command::Operation(op) => op.changes_layer(),
            Command::InputSelector(_)
            | Command::NetworkService(_)
            | Command::XmlListItem { .. }
            | Command::PlayQueueAdd { .. }
            | Command::PlayQueueRemove { .. }
            | Command::PlayQueueClear => true,
            _ => false,
        }
    }

    pub fn is_display_mode_change(&self) -> bool {
        matches!(self, Command::DisplayMode)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code(), self.parameter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_encoding() {
        assert_eq!(Command::query(code::POWER).to_iscp(), "!1PWRQSTN");
        assert!(Command::query(code::POWER).is_query());
    }

    #[test]
    fn test_xml_list_request_encoding() {
        let cmd = Command::XmlListRequest(XmlListRequest {
            request_id: 3,
            layer: 2,
            offset: 0,
            count: 0x1F,
        });
        assert_eq!(cmd.to_string(), "NLAL0003020000001F");
    }

    #[test]
    fn test_seek_seconds() {
        assert_eq!(Command::seek_seconds(3725).to_string(), "NTS01:02:05");
    }

    #[test]
    fn test_network_service_encoding() {
        assert_eq!(
            Command::NetworkService(ServiceType::TuneIn).to_string(),
            "NSV0E0"
        );
    }

    #[test]
    fn test_media_list_impact() {
        assert!(Command::Operation(OperationCommand::Return).has_impact_on_media_list());
        assert!(!Command::Operation(OperationCommand::Play).has_impact_on_media_list());
        assert!(Command::NetworkService(ServiceType::Spotify).has_impact_on_media_list());
        assert!(!Command::query(code::TITLE_NAME).has_impact_on_media_list());
        assert!(!Command::DisplayMode.has_impact_on_media_list());
        assert!(Command::DisplayMode.is_display_mode_change());
    }
}
