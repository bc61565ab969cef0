//! UI intents
//!
//! Every command the UI can issue, as data. [`PlayerSession::dispatch`] is
//! the one place they are applied, so a UI (or a test) can drive the session
//! from a stream of intents.

use crate::error::Result;
use crate::handle::PlaybackHandle;
use crate::session::PlayerSession;
use encore_core::Track;
use serde::{Deserialize, Serialize};

/// A command from the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    PlayTracks { tracks: Vec<Track>, start: usize },
    SetQueue { tracks: Vec<Track> },
    AddTracks { tracks: Vec<Track> },
    JumpTo { index: usize },
    Next,
    Previous,
    Play,
    Pause,
    TogglePlay,
    SeekTo { secs: f64 },
    SeekToFraction { fraction: f64 },
    SetVolume { level: f32 },
    ToggleMute,
    ToggleShuffle,
    CycleRepeatMode,
    RemoveFromQueue { index: usize },
    ReorderQueue { from: usize, to: usize },
    ClearQueue,
}

impl<H: PlaybackHandle> PlayerSession<H> {
    /// Apply a UI intent
    ///
    /// Only malformed input fails (bad index, non-finite seek or volume); the
    /// session stays usable either way.
    pub fn dispatch(&mut self, intent: Intent) -> Result<()> {
        tracing::trace!(?intent, "dispatching intent");

        match intent {
            Intent::PlayTracks { tracks, start } => self.play_tracks(tracks, start),
            Intent::SetQueue { tracks } => self.set_queue(tracks),
            Intent::AddTracks { tracks } => self.add_tracks(tracks),
            Intent::JumpTo { index } => {
                self.jump_to(index);
            }
            Intent::Next => self.next(),
            Intent::Previous => self.previous(),
            Intent::Play => self.play(),
            Intent::Pause => self.pause(),
            Intent::TogglePlay => self.toggle_play(),
            Intent::SeekTo { secs } => self.seek_to(secs)?,
            Intent::SeekToFraction { fraction } => self.seek_to_fraction(fraction)?,
            Intent::SetVolume { level } => self.set_volume(level)?,
            Intent::ToggleMute => self.toggle_mute(),
            Intent::ToggleShuffle => {
                self.toggle_shuffle();
            }
            Intent::CycleRepeatMode => {
                self.cycle_repeat_mode();
            }
            Intent::RemoveFromQueue { index } => {
                self.remove_from_queue(index)?;
            }
            Intent::ReorderQueue { from, to } => self.reorder_queue(from, to)?,
            Intent::ClearQueue => self.clear_queue(),
        }

        Ok(())
    }
}
