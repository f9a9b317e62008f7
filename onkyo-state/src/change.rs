//! Change classification
//!
//! [`ReceiverState::apply`](crate::ReceiverState::apply) reports which part of
//! the state a message touched. The session reacts per category and the
//! notifier accumulates categories into a [`ChangeSet`] between publishes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What aspect of the receiver state a message altered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Nothing observable changed
    #[default]
    None,
    /// Power, device identity, selectors, dimmer and other common settings
    Common,
    /// Track metadata, cover art, time and track index
    TrackInfo,
    /// Play/repeat/shuffle status and playback screen capabilities
    PlaybackState,
    /// Navigation context and the browsable lists
    MediaItems,
    /// Volume, muting, listening mode and tone
    AudioControl,
}

impl ChangeKind {
    const ALL: [ChangeKind; 5] = [
        ChangeKind::Common,
        ChangeKind::TrackInfo,
        ChangeKind::PlaybackState,
        ChangeKind::MediaItems,
        ChangeKind::AudioControl,
    ];

    pub fn is_change(&self) -> bool {
        *self != ChangeKind::None
    }

    fn bit(&self) -> u8 {
        match self {
            ChangeKind::None => 0,
            ChangeKind::Common => 1 << 0,
            ChangeKind::TrackInfo => 1 << 1,
            ChangeKind::PlaybackState => 1 << 2,
            ChangeKind::MediaItems => 1 << 3,
            ChangeKind::AudioControl => 1 << 4,
        }
    }
}

/// Set of change kinds accumulated over one coalescing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeSet {
    bits: u8,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind; `ChangeKind::None` is ignored
    pub fn insert(&mut self, kind: ChangeKind) {
        self.bits |= kind.bit();
    }

    pub fn contains(&self, kind: ChangeKind) -> bool {
        kind.is_change() && self.bits & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = ChangeKind> + '_ {
        ChangeKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }
}

impl FromIterator<ChangeKind> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeKind>>(iter: I) -> Self {
        let mut set = ChangeSet::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self.iter().map(|kind| format!("{:?}", kind)).collect();
        write!(f, "[{}]", kinds.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_never_stored() {
        let mut set = ChangeSet::new();
        set.insert(ChangeKind::None);
        assert!(set.is_empty());
        assert!(!set.contains(ChangeKind::None));
    }

    #[test]
    fn test_accumulates_distinct_kinds() {
        let set: ChangeSet = [
            ChangeKind::TrackInfo,
            ChangeKind::MediaItems,
            ChangeKind::TrackInfo,
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(ChangeKind::TrackInfo));
        assert!(!set.contains(ChangeKind::Common));
        assert_eq!(set.to_string(), "[TrackInfo, MediaItems]");
    }
}
