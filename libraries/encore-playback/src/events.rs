//! Player events
//!
//! Emitted by the session for UI synchronization and drained with
//! [`PlayerSession::drain_events`](crate::PlayerSession::drain_events):
//! - Play/pause transitions
//! - Track changes and natural track ends
//! - Position updates from the handle
//! - Queue, mode and volume changes
//! - Source failures and the end of the queue

use crate::types::RepeatMode;
use encore_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the player session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Playing flag changed
    StateChanged {
        /// Whether playback is (or is about to be) running
        is_playing: bool,
    },

    /// Cursor moved to a different track and its source was requested
    TrackChanged {
        /// ID of the new current track
        track_id: TrackId,
        /// Queue index of the new current track
        index: usize,
    },

    /// Track played to its end
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update from the handle or a seek
    PositionChanged {
        /// Current position in seconds
        position_secs: f64,
        /// Track duration in seconds, when known
        duration_secs: Option<f64>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Stored level (0.0-1.0), unaffected by mute
        volume: f32,
        /// Whether audio is muted
        muted: bool,
    },

    /// Tracks added, removed, reordered or replaced
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Shuffle or repeat mode changed
    ModeChanged {
        shuffle: bool,
        repeat: RepeatMode,
    },

    /// A source failed to load or decode; the queue moved on
    PlaybackFailed {
        /// ID of the failed track
        track_id: TrackId,
        /// Failure description from the handle
        reason: String,
    },

    /// Every track in a looping queue failed in a row; playback stopped
    PlaybackStalled {
        /// Length of the failure streak
        failures: usize,
    },

    /// Queue ran out with repeat off
    QueueEnded,
}
