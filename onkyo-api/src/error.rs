use thiserror::Error;

/// Errors produced while decoding ISCP payloads and eISCP frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The byte stream does not contain a valid eISCP frame
    ///
    /// Raised when the magic, header size or version fields are wrong.
    /// The reader should resynchronise on the next `ISCP` magic.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// More bytes are required before a frame can be decoded
    #[error("Incomplete frame: {needed} more bytes required")]
    Incomplete { needed: usize },

    /// The parameter of a known message code could not be decoded
    ///
    /// Devices answer `N/A` to queries they do not support, which also ends up here.
    #[error("Invalid parameter for {code}: {parameter:?}")]
    InvalidParameter { code: String, parameter: String },

    /// An embedded XML payload (NRI, NLA) could not be parsed
    #[error("XML parse error: {0}")]
    Xml(String),
}

impl ProtocolError {
    pub(crate) fn invalid(code: &str, parameter: &str) -> Self {
        ProtocolError::InvalidParameter {
            code: code.to_string(),
            parameter: parameter.to_string(),
        }
    }
}

/// Result alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
