//! eISCP framing
//!
//! Over TCP every ISCP message travels inside a 16-byte header:
//!
//! ```text
//! "ISCP" | header size (u32 BE, 16) | data size (u32 BE) | version (1) | 3 reserved
//! "!1" <code> <parameter> <EOF|CR|LF ...>
//! ```
//!
//! Receivers terminate data with any combination of `\x1a`, `\r` and `\n`;
//! the decoder strips all of them.

use crate::command::Command;
use crate::error::{ProtocolError, Result};
use crate::message::Message;

const MAGIC: &[u8; 4] = b"ISCP";
pub const HEADER_SIZE: usize = 16;
const VERSION: u8 = 1;
/// Largest header a receiver is expected to announce
const MAX_HEADER_SIZE: usize = 64;
/// Largest data block accepted; list and cover payloads stay far below this
pub const MAX_DATA_SIZE: usize = 1024 * 1024;

/// Default TCP port of the eISCP service
pub const DEFAULT_PORT: u16 = 60128;

/// One decoded eISCP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// ISCP text without start sequence or terminators, e.g. `PWR01`
    pub data: String,
}

impl Frame {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    pub fn from_command(command: &Command) -> Self {
        Self::new(command.to_string())
    }

    /// Encode this frame for sending (terminated with CR)
    pub fn encode(&self) -> Vec<u8> {
        let payload = format!("!1{}\r", self.data);
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.push(VERSION);
        out.extend_from_slice(&[0, 0, 0]);
        out.extend_from_slice(payload.as_bytes());
        out
    }

    /// Decode one frame from the front of `buf`
    ///
    /// Returns the frame and the number of bytes consumed. Yields
    /// [`ProtocolError::Incomplete`] when `buf` holds a partial frame.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < HEADER_SIZE {
            return Err(ProtocolError::Incomplete {
                needed: HEADER_SIZE - buf.len(),
            });
        }
        if &buf[..4] != MAGIC {
            return Err(ProtocolError::InvalidFrame("missing ISCP magic".to_string()));
        }

        let header_size = read_u32(&buf[4..8]) as usize;
        let data_size = read_u32(&buf[8..12]) as usize;
        if !(HEADER_SIZE..=MAX_HEADER_SIZE).contains(&header_size) {
            return Err(ProtocolError::InvalidFrame(format!(
                "header size {}",
                header_size
            )));
        }
        if data_size > MAX_DATA_SIZE {
            return Err(ProtocolError::InvalidFrame(format!(
                "data size {} exceeds {}",
                data_size, MAX_DATA_SIZE
            )));
        }
        if buf[12] != VERSION {
            return Err(ProtocolError::InvalidFrame(format!("version {}", buf[12])));
        }

        let total = header_size + data_size;
        if buf.len() < total {
            return Err(ProtocolError::Incomplete {
                needed: total - buf.len(),
            });
        }

        let text = String::from_utf8_lossy(&buf[header_size..total]);
        let text = text.trim_end_matches(['\u{1a}', '\r', '\n', '\0']);
        let text = text.strip_prefix("!1").unwrap_or(text);

        Ok((Self::new(text), total))
    }

    /// Position of the next `ISCP` magic after the first byte, for resynchronising
    pub fn resync_offset(buf: &[u8]) -> Option<usize> {
        buf.windows(MAGIC.len())
            .skip(1)
            .position(|w| w == MAGIC)
            .map(|p| p + 1)
    }

    pub fn to_message(&self) -> Result<Message> {
        Message::from_iscp(&self.data)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
