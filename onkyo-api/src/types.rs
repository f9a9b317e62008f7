//! Protocol enumerations shared by inbound messages and outbound commands
//!
//! Each enum knows the character or hex code the receiver uses on the wire.
//! Parsing is lenient where the protocol is: unknown codes map to `None` (or an
//! `Other` variant where the value space is open) and the caller decides.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Power / device
// ============================================================================

/// System power state (PWR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerStatus {
    #[default]
    Standby,
    On,
}

impl PowerStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "00" => Some(PowerStatus::Standby),
            "01" => Some(PowerStatus::On),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PowerStatus::Standby => "00",
            PowerStatus::On => "01",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PowerStatus::On)
    }
}

/// Input selector (SLI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSelector {
    VideoDvr,
    CblSat,
    Game,
    Aux,
    Pc,
    BdDvd,
    StreamBox,
    Tv,
    Tape,
    Phono,
    Cd,
    Fm,
    Am,
    Tuner,
    MusicServer,
    InternetRadio,
    UsbFront,
    UsbRear,
    Net,
    Bluetooth,
    /// Any selector code not listed above
    Other(u8),
}

impl InputSelector {
    const TABLE: [(u8, InputSelector); 20] = [
        (0x00, InputSelector::VideoDvr),
        (0x01, InputSelector::CblSat),
        (0x02, InputSelector::Game),
        (0x03, InputSelector::Aux),
        (0x05, InputSelector::Pc),
        (0x10, InputSelector::BdDvd),
        (0x11, InputSelector::StreamBox),
        (0x12, InputSelector::Tv),
        (0x20, InputSelector::Tape),
        (0x22, InputSelector::Phono),
        (0x23, InputSelector::Cd),
        (0x24, InputSelector::Fm),
        (0x25, InputSelector::Am),
        (0x26, InputSelector::Tuner),
        (0x27, InputSelector::MusicServer),
        (0x28, InputSelector::InternetRadio),
        (0x29, InputSelector::UsbFront),
        (0x2A, InputSelector::UsbRear),
        (0x2B, InputSelector::Net),
        (0x2E, InputSelector::Bluetooth),
    ];

    pub fn from_hex(value: u8) -> Self {
        Self::TABLE
            .iter()
            .find(|(code, _)| *code == value)
            .map(|(_, selector)| *selector)
            .unwrap_or(InputSelector::Other(value))
    }

    /// Parse the two-digit hex code used by SLI and the NRI selector list
    pub fn from_code(code: &str) -> Option<Self> {
        u8::from_str_radix(code.get(..2)?, 16).ok().map(Self::from_hex)
    }

    pub fn hex(&self) -> u8 {
        match self {
            InputSelector::Other(value) => *value,
            known => Self::TABLE
                .iter()
                .find(|(_, selector)| selector == known)
                .map(|(code, _)| *code)
                .unwrap_or_default(),
        }
    }

    pub fn code(&self) -> String {
        format!("{:02X}", self.hex())
    }

    pub fn is_usb(&self) -> bool {
        matches!(self, InputSelector::UsbFront | InputSelector::UsbRear)
    }
}

/// Front-panel dimmer level (DIM)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimmerLevel {
    Bright,
    Dim,
    Dark,
    ShutOff,
    BrightLedOff,
}

impl DimmerLevel {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "00" => Some(DimmerLevel::Bright),
            "01" => Some(DimmerLevel::Dim),
            "02" => Some(DimmerLevel::Dark),
            "03" => Some(DimmerLevel::ShutOff),
            "08" => Some(DimmerLevel::BrightLedOff),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DimmerLevel::Bright => "00",
            DimmerLevel::Dim => "01",
            DimmerLevel::Dark => "02",
            DimmerLevel::ShutOff => "03",
            DimmerLevel::BrightLedOff => "08",
        }
    }
}

/// DAC digital filter (DGF)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigitalFilter {
    Slow,
    Sharp,
    Short,
    Auto,
}

impl DigitalFilter {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "00" => Some(DigitalFilter::Slow),
            "01" => Some(DigitalFilter::Sharp),
            "02" => Some(DigitalFilter::Short),
            "03" => Some(DigitalFilter::Auto),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DigitalFilter::Slow => "00",
            DigitalFilter::Sharp => "01",
            DigitalFilter::Short => "02",
            DigitalFilter::Auto => "03",
        }
    }
}

// ============================================================================
// Playback
// ============================================================================

/// Transport state, first character of NST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayStatus {
    #[default]
    Stop,
    Play,
    Pause,
    FastForward,
    FastRewind,
    EndOfFile,
}

impl PlayStatus {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(PlayStatus::Stop),
            'P' => Some(PlayStatus::Play),
            'p' => Some(PlayStatus::Pause),
            'F' => Some(PlayStatus::FastForward),
            'R' => Some(PlayStatus::FastRewind),
            'E' => Some(PlayStatus::EndOfFile),
            _ => None,
        }
    }

    /// Audio is flowing (normal, fast-forward or rewind)
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            PlayStatus::Play | PlayStatus::FastForward | PlayStatus::FastRewind
        )
    }
}

/// Repeat mode, second character of NST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepeatStatus {
    #[default]
    Off,
    All,
    Folder,
    One,
    Disabled,
}

impl RepeatStatus {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(RepeatStatus::Off),
            'R' => Some(RepeatStatus::All),
            'F' => Some(RepeatStatus::Folder),
            '1' => Some(RepeatStatus::One),
            'x' => Some(RepeatStatus::Disabled),
            _ => None,
        }
    }
}

/// Shuffle mode, third character of NST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShuffleStatus {
    #[default]
    Off,
    All,
    Album,
    Folder,
    Disabled,
}

impl ShuffleStatus {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(ShuffleStatus::Off),
            'S' => Some(ShuffleStatus::All),
            'A' => Some(ShuffleStatus::Album),
            'F' => Some(ShuffleStatus::Folder),
            'x' => Some(ShuffleStatus::Disabled),
            _ => None,
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Kind of screen the receiver's network UI is showing (NLT `u`, NLA `u`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UiType {
    #[default]
    List,
    Menu,
    Playback,
    Popup,
    Keyboard,
    MenuList,
}

impl UiType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(UiType::List),
            '1' => Some(UiType::Menu),
            '2' => Some(UiType::Playback),
            '3' => Some(UiType::Popup),
            '4' => Some(UiType::Keyboard),
            '5' => Some(UiType::MenuList),
            _ => None,
        }
    }
}

/// Depth of the current listing (NLT `y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerInfo {
    /// The NET top level: list of network services
    #[default]
    NetTop,
    /// Top level of a service or the USB root
    ServiceTop,
    /// Second layer or deeper
    Under2ndLayer,
}

impl LayerInfo {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(LayerInfo::NetTop),
            '1' => Some(LayerInfo::ServiceTop),
            '2' => Some(LayerInfo::Under2ndLayer),
            _ => None,
        }
    }
}

/// Network service (NLT `xx`, NSV `ss`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceType {
    MusicServer,
    Favorite,
    VTuner,
    SiriusXm,
    Pandora,
    Rhapsody,
    LastFm,
    Napster,
    Slacker,
    Mediafly,
    Spotify,
    Aupeo,
    Radiko,
    EOnkyo,
    TuneIn,
    Mp3Tunes,
    Simfy,
    HomeMedia,
    Deezer,
    IHeartRadio,
    Airplay,
    OnkyoMusic,
    Tidal,
    PlayQueue,
    Chromecast,
    FireConnect,
    PlayFi,
    FlareConnect,
    Usb,
    UsbRear,
    InternetRadio,
    Net,
    Bluetooth,
    /// No NLT has been received yet
    #[default]
    Unknown,
    /// A service id this library has no name for
    Other(u8),
}

impl ServiceType {
    const TABLE: [(u8, ServiceType, &'static str); 33] = [
        (0x00, ServiceType::MusicServer, "Music Server"),
        (0x01, ServiceType::Favorite, "My Favorite"),
        (0x02, ServiceType::VTuner, "vTuner Internet Radio"),
        (0x03, ServiceType::SiriusXm, "SiriusXM Internet Radio"),
        (0x04, ServiceType::Pandora, "Pandora Internet Radio"),
        (0x05, ServiceType::Rhapsody, "Rhapsody"),
        (0x06, ServiceType::LastFm, "Last.fm Internet Radio"),
        (0x07, ServiceType::Napster, "Napster"),
        (0x08, ServiceType::Slacker, "Slacker Personal Radio"),
        (0x09, ServiceType::Mediafly, "Mediafly"),
        (0x0A, ServiceType::Spotify, "Spotify"),
        (0x0B, ServiceType::Aupeo, "AUPEO! PERSONAL RADIO"),
        (0x0C, ServiceType::Radiko, "radiko.jp"),
        (0x0D, ServiceType::EOnkyo, "e-onkyo music"),
        (0x0E, ServiceType::TuneIn, "TuneIn"),
        (0x0F, ServiceType::Mp3Tunes, "MP3tunes"),
        (0x10, ServiceType::Simfy, "Simfy"),
        (0x11, ServiceType::HomeMedia, "Home Media"),
        (0x12, ServiceType::Deezer, "Deezer"),
        (0x13, ServiceType::IHeartRadio, "iHeartRadio"),
        (0x18, ServiceType::Airplay, "AirPlay"),
        (0x1A, ServiceType::OnkyoMusic, "onkyo music"),
        (0x1B, ServiceType::Tidal, "TIDAL"),
        (0x1D, ServiceType::PlayQueue, "Play Queue"),
        (0x40, ServiceType::Chromecast, "Chromecast built-in"),
        (0x41, ServiceType::FireConnect, "FireConnect"),
        (0x42, ServiceType::PlayFi, "DTS Play-Fi"),
        (0x43, ServiceType::FlareConnect, "FlareConnect"),
        (0xF0, ServiceType::Usb, "USB"),
        (0xF1, ServiceType::UsbRear, "USB(Rear)"),
        (0xF2, ServiceType::InternetRadio, "Internet Radio"),
        (0xF3, ServiceType::Net, "NET"),
        (0xF4, ServiceType::Bluetooth, "Bluetooth"),
    ];

    pub fn from_hex(value: u8) -> Self {
        Self::TABLE
            .iter()
            .find(|(code, _, _)| *code == value)
            .map(|(_, service, _)| *service)
            .unwrap_or(ServiceType::Other(value))
    }

    pub fn from_code(code: &str) -> Option<Self> {
        u8::from_str_radix(code.get(..2)?, 16).ok().map(Self::from_hex)
    }

    /// Match the display name a receiver prints in the NET top listing
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::TABLE
            .iter()
            .find(|(_, _, display)| display.eq_ignore_ascii_case(name))
            .map(|(_, service, _)| *service)
    }

    pub fn hex(&self) -> Option<u8> {
        match self {
            ServiceType::Unknown => None,
            ServiceType::Other(value) => Some(*value),
            known => Self::TABLE
                .iter()
                .find(|(_, service, _)| service == known)
                .map(|(code, _, _)| *code),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceType::Unknown => "Unknown",
            ServiceType::Other(_) => "Other",
            known => Self::TABLE
                .iter()
                .find(|(_, service, _)| service == known)
                .map(|(_, _, name)| *name)
                .unwrap_or("Other"),
        }
    }

    pub fn is_usb(&self) -> bool {
        matches!(self, ServiceType::Usb | ServiceType::UsbRear)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First character of NLS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InformationType {
    Ascii,
    Cursor,
    Unicode,
}

impl InformationType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(InformationType::Ascii),
            'C' => Some(InformationType::Cursor),
            'U' => Some(InformationType::Unicode),
            _ => None,
        }
    }
}

/// Update type carried by an NLS cursor record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateType {
    /// A new page starts; previously listed lines are void
    Page,
    /// Only the cursor moved
    Cursor,
    NoUpdate,
}

impl UpdateType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(UpdateType::Page),
            'C' => Some(UpdateType::Cursor),
            '-' => Some(UpdateType::NoUpdate),
            _ => None,
        }
    }
}

// ============================================================================
// Cover art
// ============================================================================

/// Encoding of an NJA payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    Bmp,
    Jpeg,
    Url,
    NoImage,
}

impl ImageType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(ImageType::Bmp),
            '1' => Some(ImageType::Jpeg),
            '2' => Some(ImageType::Url),
            'n' => Some(ImageType::NoImage),
            _ => None,
        }
    }
}

/// Position of an NJA chunk inside a multi-frame image transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketFlag {
    Start,
    Next,
    End,
    NotUsed,
}

impl PacketFlag {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(PacketFlag::Start),
            '1' => Some(PacketFlag::Next),
            '2' => Some(PacketFlag::End),
            '-' => Some(PacketFlag::NotUsed),
            _ => None,
        }
    }
}

// ============================================================================
// Operation commands (NTC)
// ============================================================================

/// Network/USB operation command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationCommand {
    Play,
    Stop,
    Pause,
    PlayPause,
    TrackUp,
    TrackDown,
    FastForward,
    Rewind,
    Repeat,
    Random,
    Display,
    Right,
    Left,
    Up,
    Down,
    Select,
    Return,
    Top,
    Menu,
    Home,
}

impl OperationCommand {
    pub fn code(&self) -> &'static str {
        match self {
            OperationCommand::Play => "PLAY",
            OperationCommand::Stop => "STOP",
            OperationCommand::Pause => "PAUSE",
            OperationCommand::PlayPause => "P/P",
            OperationCommand::TrackUp => "TRUP",
            OperationCommand::TrackDown => "TRDN",
            OperationCommand::FastForward => "FF",
            OperationCommand::Rewind => "REW",
            OperationCommand::Repeat => "REPEAT",
            OperationCommand::Random => "RANDOM",
            OperationCommand::Display => "DISPLAY",
            OperationCommand::Right => "RIGHT",
            OperationCommand::Left => "LEFT",
            OperationCommand::Up => "UP",
            OperationCommand::Down => "DOWN",
            OperationCommand::Select => "SELECT",
            OperationCommand::Return => "RETURN",
            OperationCommand::Top => "TOP",
            OperationCommand::Menu => "MENU",
            OperationCommand::Home => "HOME",
        }
    }

    /// Commands that move through the browse tree and so void the current listing
    pub fn changes_layer(&self) -> bool {
        matches!(
            self,
            OperationCommand::Right
                | OperationCommand::Left
                | OperationCommand::Select
                | OperationCommand::Return
                | OperationCommand::Top
                | OperationCommand::Menu
                | OperationCommand::Home
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_selector_round_trip_known_codes() {
        assert_eq!(InputSelector::from_code("2B"), Some(InputSelector::Net));
        assert_eq!(InputSelector::from_code("29"), Some(InputSelector::UsbFront));
        assert_eq!(InputSelector::UsbRear.code(), "2A");
        assert!(InputSelector::UsbFront.is_usb());
        assert!(!InputSelector::Net.is_usb());
    }

    #[test]
    fn test_input_selector_keeps_unknown_code() {
        let selector = InputSelector::from_code("55").unwrap();
        assert_eq!(selector, InputSelector::Other(0x55));
        assert_eq!(selector.code(), "55");
    }

    #[test]
    fn test_service_type_lookup() {
        assert_eq!(ServiceType::from_code("F3"), Some(ServiceType::Net));
        assert_eq!(ServiceType::from_code("0e"), Some(ServiceType::TuneIn));
        assert_eq!(ServiceType::from_name(" tidal "), Some(ServiceType::Tidal));
        assert_eq!(ServiceType::from_name("Unheard Of"), None);
        assert_eq!(ServiceType::from_hex(0x77), ServiceType::Other(0x77));
        assert_eq!(ServiceType::Unknown.hex(), None);
    }

    #[test]
    fn test_play_status_is_playing() {
        assert!(PlayStatus::Play.is_playing());
        assert!(PlayStatus::FastRewind.is_playing());
        assert!(!PlayStatus::Pause.is_playing());
        assert!(!PlayStatus::Stop.is_playing());
        assert!(!PlayStatus::EndOfFile.is_playing());
    }

    #[test]
    fn test_operation_command_layer_changes() {
        assert!(OperationCommand::Return.changes_layer());
        assert!(OperationCommand::Select.changes_layer());
        assert!(!OperationCommand::Play.changes_layer());
        assert!(!OperationCommand::Up.changes_layer());
    }
}
