//! Typed inbound messages
//!
//! A `Message` is one decoded ISCP status/update. The receiver sends these in
//! any order, unsolicited or as a reply to a `QSTN` query. Decoding never
//! touches state: embedded XML (NRI, NLA) is carried raw and parsed by whoever
//! applies the message, so a malformed document can be rejected there without
//! losing the message itself.
//!
//! # Example
//!
//! ```rust
//! use onkyo_api::{Message, PlayStatus};
//!
//! let msg = Message::from_iscp("!1NSTP--").unwrap();
//! if let Message::PlayStatus(status) = msg {
//!     assert_eq!(status.play, PlayStatus::Play);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::code;
use crate::error::{ProtocolError, Result};
use crate::types::{
    DigitalFilter, DimmerLevel, ImageType, InformationType, InputSelector, LayerInfo,
    PacketFlag, PlayStatus, PowerStatus, RepeatStatus, ServiceType, ShuffleStatus, UiType,
    UpdateType,
};

// ============================================================================
// Payload types
// ============================================================================

/// Elapsed and total time of the current track (NTM)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub current: String,
    pub max: String,
}

impl TimeInfo {
    pub fn current_seconds(&self) -> Option<u32> {
        parse_time(&self.current)
    }

    pub fn max_seconds(&self) -> Option<u32> {
        parse_time(&self.max)
    }
}

/// Parse `hh:mm:ss` or `mm:ss`; placeholder dashes yield `None`
pub fn parse_time(value: &str) -> Option<u32> {
    value
        .trim()
        .split(':')
        .try_fold((0u32, 0usize), |(acc, parts), part| {
            part.parse::<u32>().ok().map(|v| (acc * 60 + v, parts + 1))
        })
        .filter(|(_, parts)| (2..=3).contains(parts))
        .map(|(seconds, _)| seconds)
}

/// Current and total track number (NTR)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackIndex {
    pub current: Option<u32>,
    pub total: Option<u32>,
}

/// Play, repeat and shuffle status (NST)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStatusInfo {
    pub play: PlayStatus,
    pub repeat: RepeatStatus,
    pub shuffle: ShuffleStatus,
}

/// How the receiver displays track time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDisplay {
    #[default]
    ElapsedTotal,
    Elapsed,
    Disabled,
}

/// Playback screen capabilities (NMS)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuStatus {
    pub track_menu: bool,
    pub positive_icon: String,
    pub negative_icon: String,
    pub seek_enabled: bool,
    pub time_display: TimeDisplay,
    pub service_icon: Option<ServiceType>,
}

/// Summary of the listing currently on screen (NLT)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTitleInfo {
    pub service_type: ServiceType,
    pub ui_type: UiType,
    pub layer_info: LayerInfo,
    pub cursor_position: u16,
    pub number_of_items: u16,
    pub number_of_layers: u8,
    pub title_bar: String,
}

/// One NLS record: either a cursor/page event or a listed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListInfo {
    Cursor {
        line: Option<u8>,
        update: UpdateType,
    },
    Line {
        info_type: InformationType,
        line: Option<u8>,
        property: char,
        text: String,
    },
}

/// Reply to an XML list request (NLA)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlListInfo {
    pub request_id: u16,
    pub success: bool,
    pub ui_type: Option<UiType>,
    pub xml: String,
}

/// Cover art delivery (NJA)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JacketArt {
    /// One frame of a chunked raw image transfer
    Chunk {
        image_type: ImageType,
        flag: PacketFlag,
        data: Vec<u8>,
    },
    Url(String),
    NoImage,
}

/// Front tone control (TFR)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub bass: i8,
    pub treble: i8,
}

// ============================================================================
// Message
// ============================================================================

/// A decoded inbound ISCP message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Power(PowerStatus),
    /// Raw NRI XML document
    ReceiverInformation(String),
    FriendlyName(String),
    InputSelector(InputSelector),
    DimmerLevel(DimmerLevel),
    DigitalFilter(DigitalFilter),
    MasterVolume(u8),
    AudioMuting(bool),
    ListeningMode(u8),
    ToneFront(Tone),
    JacketArt(JacketArt),
    ArtistName(String),
    AlbumName(String),
    TitleName(String),
    TimeInfo(TimeInfo),
    TrackInfo(TrackIndex),
    FileFormat(String),
    PlayStatus(PlayStatusInfo),
    MenuStatus(MenuStatus),
    ListTitleInfo(ListTitleInfo),
    ListInfo(ListInfo),
    XmlListInfo(XmlListInfo),
    /// A code this library does not model
    Unknown { code: String, data: String },
}

impl Message {
    /// Decode an ISCP message string such as `!1PWR01` or `NTM00:01:02/00:04:00`
    ///
    /// The `!1` start sequence and trailing EOF/CR/LF are optional.
    pub fn from_iscp(data: &str) -> Result<Self> {
        let data = data.trim_end_matches(['\u{1a}', '\r', '\n']);
        let data = data.strip_prefix("!1").unwrap_or(data);
        match (data.get(..3), data.get(3..)) {
            (Some(code), Some(parameter)) => Self::parse(code, parameter),
            _ => Err(ProtocolError::invalid(data, "")),
        }
    }

    /// Decode the parameter of a message with the given code
    pub fn parse(code: &str, parameter: &str) -> Result<Self> {
        let invalid = || ProtocolError::invalid(code, parameter);

        let message = match code {
            code::POWER => Message::Power(PowerStatus::from_code(parameter).ok_or_else(invalid)?),
            code::RECEIVER_INFORMATION => Message::ReceiverInformation(parameter.to_string()),
            code::FRIENDLY_NAME => Message::FriendlyName(parameter.trim().to_string()),
            code::INPUT_SELECTOR => {
                Message::InputSelector(InputSelector::from_code(parameter).ok_or_else(invalid)?)
            }
            code::DIMMER_LEVEL => {
                Message::DimmerLevel(DimmerLevel::from_code(parameter).ok_or_else(invalid)?)
            }
            code::DIGITAL_FILTER => {
                Message::DigitalFilter(DigitalFilter::from_code(parameter).ok_or_else(invalid)?)
            }
            code::MASTER_VOLUME => Message::MasterVolume(parse_hex_u8(parameter).ok_or_else(invalid)?),
            code::AUDIO_MUTING => match parameter {
                "00" => Message::AudioMuting(false),
                "01" => Message::AudioMuting(true),
                _ => return Err(invalid()),
            },
            code::LISTENING_MODE => {
                Message::ListeningMode(parse_hex_u8(parameter).ok_or_else(invalid)?)
            }
            code::TONE_FRONT => Message::ToneFront(parse_tone(parameter).ok_or_else(invalid)?),
            code::JACKET_ART => Message::JacketArt(parse_jacket_art(parameter).ok_or_else(invalid)?),
            code::ARTIST_NAME => Message::ArtistName(parameter.to_string()),
            code::ALBUM_NAME => Message::AlbumName(parameter.to_string()),
            code::TITLE_NAME => Message::TitleName(parameter.to_string()),
            code::TIME_INFO => {
                let (current, max) = parameter.split_once('/').ok_or_else(invalid)?;
                Message::TimeInfo(TimeInfo {
                    current: current.to_string(),
                    max: max.to_string(),
                })
            }
            code::TRACK_INFO => {
                let (current, total) = parameter.split_once('/').ok_or_else(invalid)?;
                Message::TrackInfo(TrackIndex {
                    current: current.trim().parse().ok(),
                    total: total.trim().parse().ok(),
                })
            }
            code::FILE_FORMAT => Message::FileFormat(parameter.to_string()),
            code::PLAY_STATUS => Message::PlayStatus(parse_play_status(parameter).ok_or_else(invalid)?),
            code::MENU_STATUS => Message::MenuStatus(parse_menu_status(parameter).ok_or_else(invalid)?),
            code::LIST_TITLE_INFO => {
                Message::ListTitleInfo(parse_list_title(parameter).ok_or_else(invalid)?)
            }
            code::LIST_INFO => Message::ListInfo(parse_list_info(parameter).ok_or_else(invalid)?),
            code::XML_LIST_INFO => {
                Message::XmlListInfo(parse_xml_list_info(parameter).ok_or_else(invalid)?)
            }
            other => Message::Unknown {
                code: other.to_string(),
                data: parameter.to_string(),
            },
        };

        Ok(message)
    }

    /// The three-letter code this message was decoded from
    pub fn code(&self) -> &str {
        match self {
            Message::Power(_) => code::POWER,
            Message::ReceiverInformation(_) => code::RECEIVER_INFORMATION,
            Message::FriendlyName(_) => code::FRIENDLY_NAME,
            Message::InputSelector(_) => code::INPUT_SELECTOR,
            Message::DimmerLevel(_) => code::DIMMER_LEVEL,
            Message::DigitalFilter(_) => code::DIGITAL_FILTER,
            Message::MasterVolume(_) => code::MASTER_VOLUME,
            Message::AudioMuting(_) => code::AUDIO_MUTING,
            Message::ListeningMode(_) => code::LISTENING_MODE,
            Message::ToneFront(_) => code::TONE_FRONT,
            Message::JacketArt(_) => code::JACKET_ART,
            Message::ArtistName(_) => code::ARTIST_NAME,
            Message::AlbumName(_) => code::ALBUM_NAME,
            Message::TitleName(_) => code::TITLE_NAME,
            Message::TimeInfo(_) => code::TIME_INFO,
            Message::TrackInfo(_) => code::TRACK_INFO,
            Message::FileFormat(_) => code::FILE_FORMAT,
            Message::PlayStatus(_) => code::PLAY_STATUS,
            Message::MenuStatus(_) => code::MENU_STATUS,
            Message::ListTitleInfo(_) => code::LIST_TITLE_INFO,
            Message::ListInfo(_) => code::LIST_INFO,
            Message::XmlListInfo(_) => code::XML_LIST_INFO,
            Message::Unknown { code, .. } => code,
        }
    }
}

// ============================================================================
// Parameter parsers
// ============================================================================

fn parse_hex_u8(value: &str) -> Option<u8> {
    u8::from_str_radix(value.get(..2)?, 16).ok()
}

fn parse_hex_u16(value: &str) -> Option<u16> {
    u16::from_str_radix(value, 16).ok()
}

/// `BxxTxx` where each `xx` is `00` or a sign followed by one hex digit
fn parse_tone(parameter: &str) -> Option<Tone> {
    fn level(value: &str) -> Option<i8> {
        let mut chars = value.chars();
        let sign = chars.next()?;
        let magnitude = chars.next()?.to_digit(16)? as i8;
        match sign {
            '+' | '0' => Some(magnitude),
            '-' => Some(-magnitude),
            _ => None,
        }
    }

    if parameter.get(..1)? != "B" || parameter.get(3..4)? != "T" {
        return None;
    }
    Some(Tone {
        bass: level(parameter.get(1..3)?)?,
        treble: level(parameter.get(4..6)?)?,
    })
}

fn parse_jacket_art(parameter: &str) -> Option<JacketArt> {
    let mut chars = parameter.chars();
    let image_type = ImageType::from_char(chars.next()?)?;
    let flag = PacketFlag::from_char(chars.next()?)?;
    let data = parameter.get(2..).unwrap_or_default();

    match image_type {
        ImageType::NoImage => Some(JacketArt::NoImage),
        ImageType::Url => Some(JacketArt::Url(data.trim().to_string())),
        ImageType::Bmp | ImageType::Jpeg => Some(JacketArt::Chunk {
            image_type,
            flag,
            data: hex::decode(data).ok()?,
        }),
    }
}

fn parse_play_status(parameter: &str) -> Option<PlayStatusInfo> {
    let mut chars = parameter.chars();
    Some(PlayStatusInfo {
        play: PlayStatus::from_char(chars.next()?)?,
        repeat: RepeatStatus::from_char(chars.next()?)?,
        shuffle: ShuffleStatus::from_char(chars.next()?)?,
    })
}

/// `maabbstii`
fn parse_menu_status(parameter: &str) -> Option<MenuStatus> {
    let track_menu = match parameter.get(..1)? {
        "M" => true,
        "x" => false,
        _ => return None,
    };
    let time_display = match parameter.get(6..7)? {
        "1" => TimeDisplay::ElapsedTotal,
        "2" => TimeDisplay::Elapsed,
        _ => TimeDisplay::Disabled,
    };

    Some(MenuStatus {
        track_menu,
        positive_icon: parameter.get(1..3)?.to_string(),
        negative_icon: parameter.get(3..5)?.to_string(),
        seek_enabled: parameter.get(5..6)? == "S",
        time_display,
        service_icon: parameter.get(7..9).and_then(ServiceType::from_code),
    })
}

/// `xxuycccciiiillsraabbssnnn...`
fn parse_list_title(parameter: &str) -> Option<ListTitleInfo> {
    let char_at = |index: usize| parameter.get(index..index + 1)?.chars().next();

    Some(ListTitleInfo {
        service_type: ServiceType::from_code(parameter.get(0..2)?)?,
        ui_type: UiType::from_char(char_at(2)?)?,
        layer_info: LayerInfo::from_char(char_at(3)?)?,
        cursor_position: parse_hex_u16(parameter.get(4..8)?).unwrap_or_default(),
        number_of_items: parse_hex_u16(parameter.get(8..12)?).unwrap_or_default(),
        number_of_layers: parse_hex_u8(parameter.get(12..14)?).unwrap_or_default(),
        title_bar: parameter.get(22..).unwrap_or_default().to_string(),
    })
}

/// `tlp` followed by the listed text, or `C` + line + update type
fn parse_list_info(parameter: &str) -> Option<ListInfo> {
    let mut chars = parameter.chars();
    let info_type = InformationType::from_char(chars.next()?)?;
    let line = chars.next()?.to_digit(10).map(|d| d as u8);
    let third = chars.next()?;

    match info_type {
        InformationType::Cursor => Some(ListInfo::Cursor {
            line,
            update: UpdateType::from_char(third)?,
        }),
        InformationType::Ascii | InformationType::Unicode => Some(ListInfo::Line {
            info_type,
            line,
            property: third,
            text: parameter.get(3..).unwrap_or_default().to_string(),
        }),
    }
}

/// `tzzzzsurr<xml>`
fn parse_xml_list_info(parameter: &str) -> Option<XmlListInfo> {
    if parameter.get(..1)? != "X" {
        return None;
    }
    Some(XmlListInfo {
        request_id: parse_hex_u16(parameter.get(1..5)?)?,
        success: parameter.get(5..6)? == "S",
        ui_type: parameter
            .get(6..7)
            .and_then(|s| s.chars().next())
            .and_then(UiType::from_char),
        xml: parameter.get(9..).unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iscp_strips_framing() {
        let msg = Message::from_iscp("!1PWR01\u{1a}\r\n").unwrap();
        assert_eq!(msg, Message::Power(PowerStatus::On));
        assert_eq!(msg.code(), "PWR");
    }

    #[test]
    fn test_unknown_code_is_kept() {
        let msg = Message::from_iscp("XYZ123").unwrap();
        assert_eq!(
            msg,
            Message::Unknown {
                code: "XYZ".to_string(),
                data: "123".to_string()
            }
        );
        assert_eq!(msg.code(), "XYZ");
    }

    #[test]
    fn test_na_reply_is_invalid() {
        let err = Message::parse("PWR", "N/A").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidParameter { .. }));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("00:01:05"), Some(65));
        assert_eq!(parse_time("03:20"), Some(200));
        assert_eq!(parse_time("--:--:--"), None);
        assert_eq!(parse_time("1:2:3:4"), None);
    }

    #[test]
    fn test_track_info_with_placeholders() {
        let msg = Message::parse("NTR", "----/0012").unwrap();
        assert_eq!(
            msg,
            Message::TrackInfo(TrackIndex {
                current: None,
                total: Some(12)
            })
        );
    }

    #[test]
    fn test_list_title_info() {
        let msg = Message::parse("NLT", "F300000000030100FF0000NET").unwrap();
        let Message::ListTitleInfo(info) = msg else {
            panic!("expected NLT");
        };
        assert_eq!(info.service_type, ServiceType::Net);
        assert_eq!(info.ui_type, UiType::List);
        assert_eq!(info.layer_info, LayerInfo::NetTop);
        assert_eq!(info.number_of_items, 3);
        assert_eq!(info.number_of_layers, 1);
        assert_eq!(info.title_bar, "NET");
    }

    #[test]
    fn test_list_title_info_too_short() {
        assert!(Message::parse("NLT", "F300").is_err());
    }

    #[test]
    fn test_jacket_art_chunk_is_hex_decoded() {
        let msg = Message::parse("NJA", "10FFD8FF").unwrap();
        assert_eq!(
            msg,
            Message::JacketArt(JacketArt::Chunk {
                image_type: ImageType::Jpeg,
                flag: PacketFlag::Start,
                data: vec![0xFF, 0xD8, 0xFF],
            })
        );
    }

    #[test]
    fn test_jacket_art_url() {
        let msg = Message::parse("NJA", "2-http://192.168.1.10/album_art.cgi").unwrap();
        assert_eq!(
            msg,
            Message::JacketArt(JacketArt::Url(
                "http://192.168.1.10/album_art.cgi".to_string()
            ))
        );
    }

    #[test]
    fn test_jacket_art_bad_hex() {
        assert!(Message::parse("NJA", "11ZZ").is_err());
    }

    #[test]
    fn test_tone_front() {
        let msg = Message::parse("TFR", "B+2T-A").unwrap();
        assert_eq!(msg, Message::ToneFront(Tone { bass: 2, treble: -10 }));
        let flat = Message::parse("TFR", "B00T00").unwrap();
        assert_eq!(flat, Message::ToneFront(Tone::default()));
    }

    #[test]
    fn test_xml_list_info_header() {
        let msg = Message::parse("NLA", "X002AS000<response status=\"ok\"/>").unwrap();
        let Message::XmlListInfo(info) = msg else {
            panic!("expected NLA");
        };
        assert_eq!(info.request_id, 0x2A);
        assert!(info.success);
        assert_eq!(info.ui_type, Some(UiType::List));
        assert_eq!(info.xml, "<response status=\"ok\"/>");
    }
}
