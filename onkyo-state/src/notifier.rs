//! Debounced change notification
//!
//! A single-slot deadline: the first change arms it, later changes only add
//! their kind to the pending set, and the deadline firing hands back everything
//! accumulated since the last publish. The session loop owns the notifier and
//! drives it with its own clock readings, so it needs no timer thread.

use std::time::{Duration, Instant};

use crate::change::{ChangeKind, ChangeSet};

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    delay: Duration,
    deadline: Option<Instant>,
    pending: ChangeSet,
}

impl ChangeNotifier {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            pending: ChangeSet::new(),
        }
    }

    /// Record a change, arming the deadline if it is not armed yet
    ///
    /// Returns true when this call armed the deadline.
    pub fn arm(&mut self, kind: ChangeKind, now: Instant) -> bool {
        if !kind.is_change() {
            return false;
        }
        self.pending.insert(kind);
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.delay);
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Take the accumulated changes if the deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<ChangeSet> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.take(),
            _ => None,
        }
    }

    /// Take the accumulated changes regardless of the deadline
    pub fn take(&mut self) -> Option<ChangeSet> {
        self.deadline = None;
        let changes = std::mem::take(&mut self.pending);
        (!changes.is_empty()).then_some(changes)
    }

    /// Drop pending changes without publishing them
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = ChangeSet::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn test_burst_within_window_publishes_once() {
        let start = Instant::now();
        let mut notifier = ChangeNotifier::new(WINDOW);

        assert!(notifier.arm(ChangeKind::TrackInfo, start));
        for i in 1..10u64 {
            let now = start + Duration::from_millis(i * 40);
            assert!(!notifier.arm(ChangeKind::PlaybackState, now));
            assert!(notifier.poll(now).is_none());
        }

        let changes = notifier.poll(start + WINDOW).unwrap();
        assert!(changes.contains(ChangeKind::TrackInfo));
        assert!(changes.contains(ChangeKind::PlaybackState));
        assert!(!notifier.is_armed());
        assert!(notifier.poll(start + WINDOW * 3).is_none());
    }

    #[test]
    fn test_spaced_changes_publish_separately() {
        let start = Instant::now();
        let mut notifier = ChangeNotifier::new(WINDOW);
        let mut published = 0;

        for i in 0..5u32 {
            let now = start + WINDOW * 2 * i;
            assert!(notifier.arm(ChangeKind::AudioControl, now));
            if notifier.poll(now + WINDOW).is_some() {
                published += 1;
            }
        }
        assert_eq!(published, 5);
    }

    #[test]
    fn test_deadline_is_not_pushed_back() {
        let start = Instant::now();
        let mut notifier = ChangeNotifier::new(WINDOW);
        notifier.arm(ChangeKind::Common, start);
        notifier.arm(ChangeKind::Common, start + Duration::from_millis(400));
        assert_eq!(notifier.deadline(), Some(start + WINDOW));
    }

    #[test]
    fn test_no_change_does_not_arm() {
        let mut notifier = ChangeNotifier::new(WINDOW);
        assert!(!notifier.arm(ChangeKind::None, Instant::now()));
        assert!(!notifier.is_armed());
        assert!(notifier.take().is_none());
    }

    #[test]
    fn test_cancel_discards_pending() {
        let start = Instant::now();
        let mut notifier = ChangeNotifier::new(WINDOW);
        notifier.arm(ChangeKind::MediaItems, start);
        notifier.cancel();
        assert!(notifier.poll(start + WINDOW).is_none());
    }
}
