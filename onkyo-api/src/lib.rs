//! ISCP protocol vocabulary for Onkyo/Pioneer network receivers
//!
//! This crate knows what the receiver says and how to talk back. It holds no
//! state and performs no I/O:
//!
//! - [`Message`]: typed inbound status messages decoded from ISCP text
//! - [`Command`]: outbound queries and actions
//! - [`frame`]: the eISCP TCP framing both travel in
//! - [`xml`]: the NRI receiver descriptor and NLA structured list documents
//!
//! ```rust
//! use onkyo_api::{code, Command, Frame, Message, PowerStatus};
//!
//! let query = Frame::from_command(&Command::query(code::POWER)).encode();
//! assert_eq!(&query[16..], b"!1PWRQSTN\r");
//!
//! let reply = Message::from_iscp("!1PWR01\x1a\r\n").unwrap();
//! assert_eq!(reply, Message::Power(PowerStatus::On));
//! ```

pub mod code;
pub mod command;
pub mod error;
pub mod frame;
pub mod message;
pub mod types;
pub mod xml;

pub use command::{Command, QueueAddType, XmlListRequest};
pub use error::{ProtocolError, Result};
pub use frame::{Frame, DEFAULT_PORT};
pub use message::{
    JacketArt, ListInfo, ListTitleInfo, MenuStatus, Message, PlayStatusInfo, TimeDisplay,
    TimeInfo, Tone, TrackIndex, XmlListInfo,
};
pub use types::{
    DigitalFilter, DimmerLevel, ImageType, InformationType, InputSelector, LayerInfo,
    OperationCommand, PacketFlag, PlayStatus, PowerStatus, RepeatStatus, ServiceType,
    ShuffleStatus, UiType, UpdateType,
};
pub use xml::{ReceiverInformation, Selector, XmlList, XmlListItem};
