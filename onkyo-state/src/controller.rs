//! Threaded session controller
//!
//! [`SessionController`] runs a [`Session`] on a dedicated worker thread. The
//! worker is the only writer of the receiver state: inbound messages, user
//! commands (through a control channel) and the notification deadline are
//! multiplexed with `crossbeam::channel::select!`, so no lock guards the state
//! itself. Listeners get `Arc` snapshots.
//!
//! ```rust,ignore
//! let (transport, inbound) = TcpTransport::connect(("192.168.1.80", DEFAULT_PORT))?;
//! let (events_tx, events) = crossbeam::channel::unbounded();
//!
//! let mut controller = SessionController::new(SessionConfig::default(), inbound, transport, events_tx);
//! let handle = controller.start()?;
//! handle.send_message(Command::Power(PowerStatus::On))?;
//!
//! for event in events {
//!     if let SessionEvent::StateChanged { state, changes } = event {
//!         println!("{} {}", changes, state.track.title);
//!     }
//! }
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, after, never, select, Receiver, Sender};
use onkyo_api::{Command, Message};
use parking_lot::Mutex;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::listener::StateListener;
use crate::notifier::ChangeNotifier;
use crate::session::Session;
use crate::transport::Transport;

/// Lifecycle of a session loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug)]
enum Control {
    Send(Command),
    PlayQueue { command: Command, repeat: bool },
    Seek(u32),
    Stop,
}

type SharedStatus = Arc<Mutex<SessionStatus>>;

struct Parts {
    inbound: Receiver<Message>,
    transport: Box<dyn Transport + Send>,
    listener: Box<dyn StateListener + Send>,
}

/// Owns the worker thread of one connection
pub struct SessionController {
    config: SessionConfig,
    status: SharedStatus,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
    parts: Option<Parts>,
    worker: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        inbound: Receiver<Message>,
        transport: impl Transport + Send + 'static,
        listener: impl StateListener + Send + 'static,
    ) -> Self {
        let (control_tx, control_rx) = channel::unbounded();
        Self {
            config,
            status: Arc::new(Mutex::new(SessionStatus::Idle)),
            control_tx,
            control_rx,
            parts: Some(Parts {
                inbound,
                transport: Box::new(transport),
                listener: Box::new(listener),
            }),
            worker: None,
        }
    }

    /// Spawn the session loop
    ///
    /// A controller runs once; starting it again fails with
    /// [`SessionError::AlreadyRunning`].
    pub fn start(&mut self) -> Result<SessionHandle> {
        self.config.validate()?;

        let parts = {
            let mut status = self.status.lock();
            if *status != SessionStatus::Idle {
                return Err(SessionError::AlreadyRunning);
            }
            let parts = self.parts.take().ok_or(SessionError::AlreadyRunning)?;
            *status = SessionStatus::Running;
            parts
        };

        let worker = SessionWorker {
            session: Session::new(self.config.clone()),
            notifier: ChangeNotifier::new(self.config.refresh_delay),
            inbound: parts.inbound,
            control: self.control_rx.clone(),
            transport: parts.transport,
            listener: parts.listener,
            status: Arc::clone(&self.status),
        };

        let spawned = thread::Builder::new()
            .name("onkyo-session".to_string())
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                *self.status.lock() = SessionStatus::Stopped;
                return Err(e.into());
            }
        }

        tracing::info!("Session started");
        Ok(self.handle())
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            control: self.control_tx.clone(),
            status: Arc::clone(&self.status),
        }
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.lock()
    }

    pub fn stop(&self) -> Result<()> {
        self.handle().stop()
    }

    /// Wait for the worker thread to finish
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Session worker panicked");
                *self.status.lock() = SessionStatus::Stopped;
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let _ = self.stop();
        self.join();
    }
}

/// Cloneable handle for talking to a running session from other threads
#[derive(Debug, Clone)]
pub struct SessionHandle {
    control: Sender<Control>,
    status: SharedStatus,
}

impl SessionHandle {
    pub fn status(&self) -> SessionStatus {
        *self.status.lock()
    }

    pub fn is_running(&self) -> bool {
        self.status() == SessionStatus::Running
    }

    pub fn send_message(&self, command: Command) -> Result<()> {
        self.send(Control::Send(command))
    }

    pub fn send_play_queue_msg(&self, command: Command, repeat: bool) -> Result<()> {
        self.send(Control::PlayQueue { command, repeat })
    }

    pub fn seek(&self, seconds: u32) -> Result<()> {
        self.send(Control::Seek(seconds))
    }

    /// Request the loop to stop
    ///
    /// Commands accepted before the stop are still transmitted; later ones
    /// fail with [`SessionError::NotRunning`]. Calling stop on a session that
    /// is not running is a no-op.
    pub fn stop(&self) -> Result<()> {
        {
            let mut status = self.status.lock();
            if *status != SessionStatus::Running {
                return Ok(());
            }
            *status = SessionStatus::Stopping;
        }
        tracing::debug!("Session stop requested");
        // The worker may already be gone after a transport disconnect
        let _ = self.control.send(Control::Stop);
        Ok(())
    }

    /// Queue a request while holding the status lock, so anything accepted
    /// here is already in the channel when the worker sees `Stopping`
    fn send(&self, control: Control) -> Result<()> {
        let status = self.status.lock();
        if *status != SessionStatus::Running {
            return Err(SessionError::NotRunning);
        }
        self.control
            .send(control)
            .map_err(|_| SessionError::ChannelClosed)
    }
}

// ============================================================================
// Worker
// ============================================================================

struct SessionWorker {
    session: Session,
    notifier: ChangeNotifier,
    inbound: Receiver<Message>,
    control: Receiver<Control>,
    transport: Box<dyn Transport + Send>,
    listener: Box<dyn StateListener + Send>,
    status: SharedStatus,
}

impl SessionWorker {
    fn run(mut self) {
        tracing::info!("Session loop running");
        self.session.start(&mut *self.transport);
        let inbound = self.inbound.clone();
        let control = self.control.clone();

        while *self.status.lock() == SessionStatus::Running {
            self.publish_if_due();

            let timeout = match self.notifier.deadline() {
                Some(deadline) => after(deadline.saturating_duration_since(Instant::now())),
                None => never(),
            };

            select! {
                recv(inbound) -> message => match message {
                    Ok(message) => {
                        let kind = self.session.process(message, &mut *self.transport);
                        self.notifier.arm(kind, Instant::now());
                    }
                    Err(_) => {
                        tracing::info!("Inbound channel disconnected, stopping session");
                        break;
                    }
                },
                recv(control) -> request => match request {
                    Ok(request) => {
                        if !self.handle_control(request) {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                recv(timeout) -> _ => self.publish_if_due(),
            }
        }

        *self.status.lock() = SessionStatus::Stopping;

        // Commands accepted before the stop still go out
        for request in control.try_iter() {
            self.handle_control(request);
        }

        self.notifier.cancel();
        *self.status.lock() = SessionStatus::Stopped;
        self.listener.on_manager_stopped();
        tracing::info!("Session loop stopped");
    }

    /// Returns false for a stop request
    fn handle_control(&mut self, request: Control) -> bool {
        let transport = &mut *self.transport;
        match request {
            Control::Send(command) => self.session.send_message(command, transport),
            Control::PlayQueue { command, repeat } => {
                self.session.send_play_queue_msg(command, repeat, transport)
            }
            Control::Seek(seconds) => self.session.seek(seconds, transport),
            Control::Stop => return false,
        }
        true
    }

    fn publish_if_due(&mut self) {
        if let Some(changes) = self.notifier.poll(Instant::now()) {
            tracing::debug!("Publishing state change {}", changes);
            let snapshot = Arc::new(self.session.state().clone());
            self.listener.on_state_changed(snapshot, changes);
        }
    }
}
