//! Declarative query groups
//!
//! The session re-issues whole groups of `QSTN` queries on state transitions
//! rather than tracking individual fields.

use onkyo_api::{code, Command};

/// A named set of status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryGroup {
    /// Sent once when a session starts
    PowerState,
    /// Sent after the power status changes
    PlayState,
    /// Sent when playback starts
    TrackState,
}

impl QueryGroup {
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            QueryGroup::PowerState => &[
                code::POWER,
                code::RECEIVER_INFORMATION,
                code::FRIENDLY_NAME,
                code::INPUT_SELECTOR,
                code::DIMMER_LEVEL,
                code::DIGITAL_FILTER,
                code::MASTER_VOLUME,
                code::AUDIO_MUTING,
            ],
            QueryGroup::PlayState => &[
                code::PLAY_STATUS,
                code::LISTENING_MODE,
                code::MASTER_VOLUME,
                code::AUDIO_MUTING,
                code::TONE_FRONT,
            ],
            QueryGroup::TrackState => &[
                code::ARTIST_NAME,
                code::ALBUM_NAME,
                code::TITLE_NAME,
                code::FILE_FORMAT,
                code::TRACK_INFO,
                code::TIME_INFO,
                code::MENU_STATUS,
            ],
        }
    }

    pub fn commands(&self) -> impl Iterator<Item = Command> {
        self.codes().iter().map(|code| Command::query(code))
    }
}
