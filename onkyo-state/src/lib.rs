//! Onkyo Receiver State
//!
//! Keeps an application-level view of an Onkyo/Pioneer network receiver
//! consistent while the receiver streams unordered, bursty ISCP status
//! messages.
//!
//! # Architecture
//!
//! ```text
//! Transport → Message → Session ──apply──→ ReceiverState
//!                          │                    │
//!                     follow-up queries    ChangeNotifier (debounce)
//!                          ↓                    ↓
//!                      Transport          StateListener
//! ```
//!
//! - [`ReceiverState`]: the aggregate, updated by [`ReceiverState::apply`]
//! - [`Session`]: reaction policy deciding which queries each change calls for
//! - [`ChangeNotifier`]: single-slot coalescing of change notifications
//! - [`SessionController`]: runs a session on its own thread
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use onkyo_state::{SessionConfig, SessionController, SessionEvent, TcpTransport};
//!
//! onkyo_state::logging::init_logging_from_env()?;
//!
//! let (transport, inbound) = TcpTransport::connect("192.168.1.80:60128")?;
//! let (events_tx, events) = crossbeam::channel::unbounded();
//! let mut controller = SessionController::new(SessionConfig::default(), inbound, transport, events_tx);
//! let handle = controller.start()?;
//!
//! while let Ok(SessionEvent::StateChanged { state, changes }) = events.recv() {
//!     println!("{}: {} - {}", changes, state.track.artist, state.track.title);
//! }
//! ```

pub mod change;
pub mod config;
pub mod controller;
pub mod error;
pub mod listener;
pub mod logging;
pub mod notifier;
pub mod queries;
pub mod session;
pub mod state;
pub mod transport;

pub use change::{ChangeKind, ChangeSet};
pub use config::SessionConfig;
pub use controller::{SessionController, SessionHandle, SessionStatus};
pub use error::{Result, SessionError};
pub use listener::{SessionEvent, StateListener};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use notifier::ChangeNotifier;
pub use queries::QueryGroup;
pub use session::Session;
pub use state::{
    AudioState, Cover, NavigationState, PlaybackState, PowerState, ReceiverState, ServiceItem,
    TrackState,
};
pub use transport::{ChannelTransport, RecordingTransport, TcpTransport, Transport};

// Protocol types used throughout the public API
pub use onkyo_api::{Command, Message};
