//! Playback handle abstraction
//!
//! The transport drives exactly one [`PlaybackHandle`]. Loading is
//! non-blocking: the handle reports completion, progress, the end of the
//! track and failures later as [`HandleEvent`]s, each tagged with the
//! [`LoadTicket`] of the load it belongs to. Events for a superseded ticket
//! are discarded by the transport.

use encore_core::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

/// Identifies one load request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket {
    /// Monotonically increasing per transport
    pub generation: u64,
    /// Track the load was issued for
    pub track_id: TrackId,
}

impl LoadTicket {
    pub fn new(generation: u64, track_id: TrackId) -> Self {
        Self {
            generation,
            track_id,
        }
    }
}

/// Notification from the playback handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandleEvent {
    /// Source is ready to play
    Loaded {
        ticket: LoadTicket,
        duration_secs: Option<f64>,
    },

    /// Playback position advanced
    TimeUpdate {
        ticket: LoadTicket,
        position_secs: f64,
    },

    /// Source played to its end
    Ended { ticket: LoadTicket },

    /// Source failed to load or decode
    Error { ticket: LoadTicket, message: String },
}

impl HandleEvent {
    /// Ticket of the load this event belongs to
    pub fn ticket(&self) -> &LoadTicket {
        match self {
            Self::Loaded { ticket, .. }
            | Self::TimeUpdate { ticket, .. }
            | Self::Ended { ticket }
            | Self::Error { ticket, .. } => ticket,
        }
    }
}

/// Single audio output owned by the transport
///
/// Implementors wrap a platform player (browser media element, native
/// decoder pipeline, etc.). Calls must not block.
pub trait PlaybackHandle {
    /// Start loading `url`; completion arrives as `Loaded` or `Error`
    fn load(&mut self, ticket: &LoadTicket, url: &str);

    fn play(&mut self);

    fn pause(&mut self);

    /// Move the playhead
    fn set_position(&mut self, secs: f64);

    /// Duration of the loaded source, when known
    fn duration(&self) -> Option<f64>;

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);
}

#[derive(Debug, Clone)]
struct LoadedSource {
    ticket: LoadTicket,
    url: String,
    ready: bool,
}

/// Headless handle with a virtual clock
///
/// Loads resolve on the next [`tick`](Self::tick) (or
/// [`resolve_load`](Self::resolve_load)); while playing, the playhead moves
/// with the elapsed time passed to `tick` and `Ended` fires at the
/// source's duration.
#[derive(Debug, Clone)]
pub struct SimulatedHandle {
    source: Option<LoadedSource>,
    position_secs: f64,
    playing: bool,
    volume: f32,
    muted: bool,
    default_duration_secs: f64,
    durations: HashMap<String, f64>,
    broken: HashSet<String>,
    loads: usize,
}

impl SimulatedHandle {
    /// Handle whose sources last `default_duration_secs` unless registered
    pub fn new(default_duration_secs: f64) -> Self {
        Self {
            source: None,
            position_secs: 0.0,
            playing: false,
            volume: 1.0,
            muted: false,
            default_duration_secs,
            durations: HashMap::new(),
            broken: HashSet::new(),
            loads: 0,
        }
    }

    /// Register the duration of a source
    pub fn set_source_duration(&mut self, url: impl Into<String>, secs: f64) {
        self.durations.insert(url.into(), secs);
    }

    /// Make every load of `url` fail
    pub fn break_source(&mut self, url: impl Into<String>) {
        self.broken.insert(url.into());
    }

    /// Complete a pending load
    pub fn resolve_load(&mut self) -> Option<HandleEvent> {
        let broken = {
            let source = self.source.as_ref().filter(|s| !s.ready)?;
            self.broken.contains(&source.url)
        };
        let duration_secs = self.duration_for_current();
        let source = self.source.as_mut()?;

        if broken {
            let event = HandleEvent::Error {
                ticket: source.ticket.clone(),
                message: format!("failed to load {}", source.url),
            };
            self.source = None;
            self.playing = false;
            return Some(event);
        }

        source.ready = true;
        Some(HandleEvent::Loaded {
            ticket: source.ticket.clone(),
            duration_secs,
        })
    }

    /// Advance the virtual clock
    ///
    /// Resolves a pending load first, then moves the playhead if playing.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<HandleEvent> {
        let mut events = Vec::new();

        if let Some(event) = self.resolve_load() {
            events.push(event);
            return events;
        }

        let Some(source) = self.source.as_ref().filter(|s| s.ready) else {
            return events;
        };
        if !self.playing {
            return events;
        }

        let ticket = source.ticket.clone();
        let duration = self.duration_for_current().unwrap_or(f64::INFINITY);
        self.position_secs = (self.position_secs + elapsed.as_secs_f64()).min(duration);

        if self.position_secs >= duration {
            self.playing = false;
            events.push(HandleEvent::Ended { ticket });
        } else {
            events.push(HandleEvent::TimeUpdate {
                ticket,
                position_secs: self.position_secs,
            });
        }

        events
    }

    /// Fail the loaded source as if decoding broke mid-track
    pub fn fail_current(&mut self, message: impl Into<String>) -> Option<HandleEvent> {
        let source = self.source.take()?;
        self.playing = false;
        Some(HandleEvent::Error {
            ticket: source.ticket,
            message: message.into(),
        })
    }

    /// Jump to the end of the loaded source
    pub fn finish_current(&mut self) -> Option<HandleEvent> {
        let source = self.source.as_ref().filter(|s| s.ready)?;
        let ticket = source.ticket.clone();
        if let Some(duration) = self.duration_for_current() {
            self.position_secs = duration;
        }
        self.playing = false;
        Some(HandleEvent::Ended { ticket })
    }

    pub fn loaded_url(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.url.as_str())
    }

    pub fn current_ticket(&self) -> Option<&LoadTicket> {
        self.source.as_ref().map(|s| &s.ticket)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position_secs
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Number of `load` calls so far
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn duration_for_current(&self) -> Option<f64> {
        let source = self.source.as_ref()?;
        Some(
            self.durations
                .get(&source.url)
                .copied()
                .unwrap_or(self.default_duration_secs),
        )
    }
}

impl Default for SimulatedHandle {
    fn default() -> Self {
        Self::new(180.0)
    }
}

impl PlaybackHandle for SimulatedHandle {
    fn load(&mut self, ticket: &LoadTicket, url: &str) {
        self.loads += 1;
        self.source = Some(LoadedSource {
            ticket: ticket.clone(),
            url: url.to_string(),
            ready: false,
        });
        self.position_secs = 0.0;
        self.playing = false;
    }

    fn play(&mut self) {
        if self.source.as_ref().is_some_and(|s| s.ready) {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_position(&mut self, secs: f64) {
        self.position_secs = secs.max(0.0);
    }

    fn duration(&self) -> Option<f64> {
        self.source
            .as_ref()
            .filter(|s| s.ready)
            .and_then(|_| self.duration_for_current())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
