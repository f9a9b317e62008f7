//! State change listeners

use std::sync::Arc;

use crossbeam::channel::Sender;

use crate::change::ChangeSet;
use crate::state::ReceiverState;

/// Receives debounced state snapshots from a running session
pub trait StateListener {
    /// Called at most once per coalescing window
    fn on_state_changed(&mut self, state: Arc<ReceiverState>, changes: ChangeSet);

    /// Called exactly once, after the session loop has exited
    fn on_manager_stopped(&mut self) {}
}

/// Event form of [`StateListener`] callbacks, for channel-based consumers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged {
        state: Arc<ReceiverState>,
        changes: ChangeSet,
    },
    Stopped,
}

impl StateListener for Sender<SessionEvent> {
    fn on_state_changed(&mut self, state: Arc<ReceiverState>, changes: ChangeSet) {
        if self
            .send(SessionEvent::StateChanged { state, changes })
            .is_err()
        {
            tracing::debug!("Session event receiver dropped");
        }
    }

    fn on_manager_stopped(&mut self) {
        let _ = self.send(SessionEvent::Stopped);
    }
}

impl<L: StateListener + ?Sized> StateListener for Box<L> {
    fn on_state_changed(&mut self, state: Arc<ReceiverState>, changes: ChangeSet) {
        (**self).on_state_changed(state, changes)
    }

    fn on_manager_stopped(&mut self) {
        (**self).on_manager_stopped()
    }
}
