//! Queue store
//!
//! Ordered list of tracks, a cursor, and the shuffle/repeat flags that decide
//! what plays next:
//!
//! ```text
//! tracks:  [A] [B] [C] [D]
//!                ^
//!             cursor = Some(1)
//! ```
//!
//! `cursor` is `None` when the queue is empty, or when it ran off the end with
//! repeat and shuffle off (the ended state). Otherwise it is always a valid
//! index.

use crate::error::{PlaybackError, Result};
use crate::history::History;
use crate::shuffle;
use crate::types::{PlaybackConfig, RepeatMode};
use encore_core::Track;
use rand::Rng;
use std::cmp::Ordering;

/// Session-local play queue
#[derive(Debug, Clone)]
pub struct QueueStore {
    tracks: Vec<Track>,
    cursor: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,

    /// Indices the cursor moved away from, for "previous" under shuffle
    history: History,
}

impl QueueStore {
    /// Create new empty queue
    pub fn new(history_size: usize) -> Self {
        Self {
            tracks: Vec::new(),
            cursor: None,
            shuffle: false,
            repeat: RepeatMode::Off,
            history: History::new(history_size),
        }
    }

    /// Empty queue with the configured initial modes
    pub fn from_config(config: &PlaybackConfig) -> Self {
        let mut queue = Self::new(config.history_size);
        queue.shuffle = config.shuffle;
        queue.repeat = config.repeat;
        queue
    }

    // ===== Mutation =====

    /// Replace the queue; the cursor starts at the first track
    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        self.cursor = if tracks.is_empty() { None } else { Some(0) };
        self.tracks = tracks;
        self.history.clear();
    }

    /// Append tracks to the end
    ///
    /// Returns `true` when the queue had no current track and the cursor now
    /// points at the first appended track, meaning playback should start.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> bool {
        if tracks.is_empty() {
            return false;
        }

        let first_new = self.tracks.len();
        self.tracks.extend(tracks);

        if self.cursor.is_none() {
            self.cursor = Some(first_new);
            return true;
        }

        false
    }

    /// Move the cursor to `index`
    ///
    /// Out-of-range indices are ignored and return `false`.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }

        if let Some(current) = self.cursor.filter(|&c| c != index) {
            self.history.push(current);
        }
        self.cursor = Some(index);
        true
    }

    /// Move to the track that plays after the current one
    pub fn advance(&mut self) -> Option<usize> {
        self.advance_with(&mut rand::thread_rng())
    }

    /// [`advance`](Self::advance) with a caller-supplied RNG for shuffle
    pub fn advance_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        self.step(rng, self.repeat)
    }

    /// Advance past the current track even under repeat-one
    ///
    /// Used when the current track cannot be played at all.
    pub fn skip(&mut self) -> Option<usize> {
        self.skip_with(&mut rand::thread_rng())
    }

    pub fn skip_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let repeat = match self.repeat {
            RepeatMode::One => RepeatMode::All,
            other => other,
        };
        self.step(rng, repeat)
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R, repeat: RepeatMode) -> Option<usize> {
        let current = self.cursor?;
        let len = self.tracks.len();

        let next = if repeat == RepeatMode::One {
            Some(current)
        } else if self.shuffle {
            shuffle::pick_next(rng, len, Some(current))
        } else if repeat == RepeatMode::All {
            Some((current + 1) % len)
        } else if current + 1 < len {
            Some(current + 1)
        } else {
            None
        };

        if next != Some(current) {
            self.history.push(current);
        }
        self.cursor = next;
        next
    }

    /// Move to the track before the current one
    ///
    /// Under shuffle this returns to the previously played index, if any.
    /// At the first track with repeat off the cursor stays put. Returns the
    /// cursor afterwards, or `None` when there is no current track.
    pub fn retreat(&mut self) -> Option<usize> {
        let current = self.cursor?;
        let len = self.tracks.len();

        let previous = match (self.repeat, self.shuffle) {
            (RepeatMode::One, _) => current,
            (_, true) => self
                .history
                .pop()
                .filter(|&index| index < len)
                .unwrap_or(current),
            (RepeatMode::All, false) => (current + len - 1) % len,
            (RepeatMode::Off, false) => current.saturating_sub(1),
        };

        self.cursor = Some(previous);
        Some(previous)
    }

    /// Flip the shuffle flag, returning the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    /// Off -> All -> One -> Off, returning the new mode
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    /// Remove track by index
    ///
    /// The cursor keeps pointing at the same track. When the current track
    /// itself is removed, the track that slid into its place becomes current
    /// (or the new last track, or nothing once the queue is empty).
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let track = self.tracks.remove(index);
        let len = self.tracks.len();

        self.cursor = match self.cursor {
            Some(c) if c > index => Some(c - 1),
            Some(c) if c == index && len == 0 => None,
            Some(c) if c == index => Some(c.min(len - 1)),
            other => other,
        };

        self.history.remap(|i| match i.cmp(&index) {
            Ordering::Less => Some(i),
            Ordering::Equal => None,
            Ordering::Greater => Some(i - 1),
        });

        Ok(track)
    }

    /// Move the track at `from` to `to`; the cursor follows its track
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }
        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        let relocate = |i: usize| -> usize {
            if i == from {
                to
            } else if from < to && i > from && i <= to {
                i - 1
            } else if from > to && i >= to && i < from {
                i + 1
            } else {
                i
            }
        };

        self.cursor = self.cursor.map(relocate);
        self.history.remap(|i| Some(relocate(i)));

        Ok(())
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
        self.history.clear();
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    // ===== Queries =====

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|c| self.tracks.get(c))
    }

    /// Whether playback ran off the end of a non-empty queue
    pub fn is_ended(&self) -> bool {
        self.cursor.is_none() && !self.tracks.is_empty()
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Track that `advance` would select, when that is deterministic
    ///
    /// `None` under shuffle (with more than one track) and at the end of the
    /// queue with repeat off.
    pub fn peek_next(&self) -> Option<&Track> {
        let current = self.cursor?;
        let len = self.tracks.len();

        let next = match self.repeat {
            RepeatMode::One => current,
            _ if self.shuffle && len > 1 => return None,
            _ if self.shuffle => current,
            RepeatMode::All => (current + 1) % len,
            RepeatMode::Off => current + 1,
        };

        self.tracks.get(next)
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}
