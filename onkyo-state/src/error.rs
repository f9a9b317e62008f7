//! Error types for onkyo-state

use onkyo_api::ProtocolError;

/// Result type for onkyo-state operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session layer
///
/// Device input never produces one of these: malformed payloads are logged
/// and dropped inside the session loop.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session is already running")]
    AlreadyRunning,

    #[error("Session is not running")]
    NotRunning,

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Session channel closed")]
    ChannelClosed,
}
