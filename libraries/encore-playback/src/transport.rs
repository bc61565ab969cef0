//! Transport controller
//!
//! Owns the playback handle and keeps the playback state (playing flag,
//! position, duration, volume) consistent with it. Every load gets a fresh
//! [`LoadTicket`]; handle events carrying any other ticket are stale and get
//! dropped, so a slow load can never resume a track the cursor already left.

use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::handle::{HandleEvent, LoadTicket, PlaybackHandle};
use crate::queue::QueueStore;
use crate::volume::Volume;
use encore_core::TrackId;
use std::collections::HashSet;

/// Transport over a single playback handle
pub struct TransportController<H: PlaybackHandle> {
    handle: H,

    // Load tracking
    ticket: Option<LoadTicket>,
    next_generation: u64,
    loaded: bool,
    autoplay: bool,

    // Playback state
    is_playing: bool,
    position_secs: f64,
    duration_secs: Option<f64>,
    volume: Volume,

    /// Failures back to back, and the distinct tracks among them
    failure_streak: usize,
    failed_tracks: HashSet<TrackId>,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl<H: PlaybackHandle> TransportController<H> {
    /// Create a transport and push the initial volume to the handle
    pub fn new(mut handle: H, volume: f32) -> Self {
        let volume = Volume::new(volume);
        handle.set_volume(volume.level());
        handle.set_muted(volume.is_muted());

        Self {
            handle,
            ticket: None,
            next_generation: 0,
            loaded: false,
            autoplay: false,
            is_playing: false,
            position_secs: 0.0,
            duration_secs: None,
            volume,
            failure_streak: 0,
            failed_tracks: HashSet::new(),
            pending_events: Vec::new(),
        }
    }

    // ===== Loading =====

    /// Load the queue's current track
    ///
    /// With `autoplay` the track starts as soon as the handle reports it
    /// loaded. Tracks without a source are failed on the spot and the queue
    /// moves on. With no current track the transport stops.
    pub fn load_current(&mut self, queue: &mut QueueStore, autoplay: bool) {
        loop {
            let Some((index, track)) = queue.cursor().zip(queue.current().cloned()) else {
                self.halt(queue.is_ended());
                return;
            };

            self.next_generation += 1;
            let ticket = LoadTicket::new(self.next_generation, track.id.clone());

            self.ticket = Some(ticket.clone());
            self.loaded = false;
            self.autoplay = autoplay;
            self.position_secs = 0.0;
            self.duration_secs = track.duration().map(|d| d.as_secs_f64());
            self.set_playing(autoplay);
            self.emit(PlayerEvent::TrackChanged {
                track_id: track.id.clone(),
                index,
            });

            if track.has_source() {
                tracing::debug!(track_id = %track.id, generation = ticket.generation, "loading source");
                self.handle.load(&ticket, &track.audio_url);
                return;
            }

            if !self.fail_track(queue, track.id, "missing audio source".to_string()) {
                return;
            }
        }
    }

    /// Replay the current track from the start
    pub fn restart(&mut self, queue: &mut QueueStore) {
        if !self.is_loaded_for(queue) {
            let autoplay = self.is_playing;
            self.load_current(queue, autoplay);
            return;
        }

        self.handle.set_position(0.0);
        self.position_secs = 0.0;
        if self.is_playing {
            self.handle.play();
        }
        self.emit_position();
    }

    /// Unload everything after the queue was cleared
    pub fn stop(&mut self) {
        self.halt(false);
    }

    /// Forget the failure streak after the user picks something new
    pub fn reset_failures(&mut self) {
        self.failure_streak = 0;
        self.failed_tracks.clear();
    }

    // ===== Transport =====

    /// Start or resume playback; no-op without a current track
    pub fn play(&mut self, queue: &mut QueueStore) {
        if queue.current().is_none() {
            return;
        }

        if !self.is_ticket_for(queue) {
            self.reset_failures();
            self.load_current(queue, true);
            return;
        }

        self.autoplay = true;
        if self.loaded {
            self.handle.play();
        }
        self.set_playing(true);
    }

    /// Pause playback; no-op without a current track
    pub fn pause(&mut self, queue: &QueueStore) {
        if queue.current().is_none() {
            return;
        }

        self.autoplay = false;
        self.handle.pause();
        self.set_playing(false);
    }

    pub fn toggle_play(&mut self, queue: &mut QueueStore) {
        if self.is_playing {
            self.pause(queue);
        } else {
            self.play(queue);
        }
    }

    /// Seek within the current track, clamped to `[0, duration]`
    ///
    /// Does not change the playing flag. When the duration is unknown only
    /// the lower bound applies.
    pub fn seek_to(&mut self, queue: &QueueStore, secs: f64) -> Result<()> {
        if !secs.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(secs));
        }
        if queue.current().is_none() {
            return Ok(());
        }

        let mut target = secs.max(0.0);
        if let Some(duration) = self.duration() {
            target = target.min(duration);
        }

        self.handle.set_position(target);
        self.position_secs = target;
        self.emit_position();
        Ok(())
    }

    /// Seek to a fraction (0.0-1.0) of the track; no-op while the duration is unknown
    pub fn seek_to_fraction(&mut self, queue: &QueueStore, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(fraction));
        }

        match self.duration() {
            Some(duration) => self.seek_to(queue, duration * fraction.clamp(0.0, 1.0)),
            None => Ok(()),
        }
    }

    // ===== Volume =====

    /// Set volume, clamped to `0.0..=1.0`; mute is left alone
    pub fn set_volume(&mut self, level: f32) -> Result<()> {
        if !self.volume.set_level(level) {
            return Err(PlaybackError::InvalidVolume(level));
        }

        self.handle.set_volume(self.volume.level());
        self.emit_volume_changed();
        Ok(())
    }

    /// Flip mute; the stored volume is untouched
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.handle.set_muted(self.volume.is_muted());
        self.emit_volume_changed();
    }

    // ===== Handle events =====

    /// Apply a handle notification
    ///
    /// Events for any ticket but the latest are discarded.
    pub fn handle_event(&mut self, queue: &mut QueueStore, event: HandleEvent) {
        if self.ticket.as_ref() != Some(event.ticket()) {
            tracing::debug!(
                generation = event.ticket().generation,
                track_id = %event.ticket().track_id,
                "discarding stale handle event"
            );
            return;
        }

        match event {
            HandleEvent::Loaded { duration_secs, .. } => {
                self.loaded = true;
                self.reset_failures();
                if let Some(duration) = duration_secs.filter(|d| d.is_finite() && *d >= 0.0) {
                    self.duration_secs = Some(duration);
                }
                if self.autoplay {
                    self.handle.play();
                    self.set_playing(true);
                }
            }
            HandleEvent::TimeUpdate { position_secs, .. } => {
                if position_secs.is_finite() {
                    self.position_secs = position_secs.max(0.0);
                    self.emit_position();
                }
            }
            HandleEvent::Ended { ticket } => {
                self.reset_failures();
                self.emit(PlayerEvent::TrackFinished {
                    track_id: ticket.track_id,
                });
                self.advance_after_end(queue);
            }
            HandleEvent::Error { ticket, message } => {
                let autoplay = self.autoplay || self.is_playing;
                if self.fail_track(queue, ticket.track_id, message) {
                    self.load_current(queue, autoplay);
                }
            }
        }
    }

    fn advance_after_end(&mut self, queue: &mut QueueStore) {
        let previous = queue.cursor();

        match queue.advance() {
            Some(next) if Some(next) == previous => {
                self.handle.set_position(0.0);
                self.position_secs = 0.0;
                self.handle.play();
                self.set_playing(true);
                self.emit_position();
            }
            Some(_) => self.load_current(queue, true),
            None => self.halt(true),
        }
    }

    /// Report a failed track and move the queue past it
    ///
    /// Returns `false` when playback stalled and nothing more should load.
    fn fail_track(&mut self, queue: &mut QueueStore, track_id: TrackId, reason: String) -> bool {
        tracing::warn!(track_id = %track_id, reason = %reason, "playback failed, skipping track");
        self.emit(PlayerEvent::PlaybackFailed {
            track_id: track_id.clone(),
            reason,
        });

        self.failure_streak += 1;
        self.failed_tracks.insert(track_id);
        if queue.skip().is_none() {
            return true;
        }

        // Shuffle may revisit a failed track before reaching the rest
        let all_failed = queue
            .tracks()
            .iter()
            .all(|track| self.failed_tracks.contains(&track.id));
        if all_failed {
            tracing::warn!(failures = self.failure_streak, "every queued track failed, stopping");
            let failures = self.failure_streak;
            self.reset_failures();
            self.ticket = None;
            self.loaded = false;
            self.autoplay = false;
            self.handle.pause();
            self.set_playing(false);
            self.emit(PlayerEvent::PlaybackStalled { failures });
            return false;
        }

        true
    }

    /// Stop playing; `ended` keeps the last source loaded
    fn halt(&mut self, ended: bool) {
        self.autoplay = false;
        self.handle.pause();
        self.set_playing(false);

        if ended {
            tracing::info!("queue ended");
            self.emit(PlayerEvent::QueueEnded);
        } else {
            self.ticket = None;
            self.loaded = false;
            self.position_secs = 0.0;
            self.duration_secs = None;
        }
    }

    // ===== Queries =====

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether a load for the current ticket is still in flight
    pub fn is_loading(&self) -> bool {
        self.ticket.is_some() && !self.loaded
    }

    pub fn position(&self) -> f64 {
        self.position_secs
    }

    /// Duration from the handle, falling back to track metadata
    pub fn duration(&self) -> Option<f64> {
        self.handle
            .duration()
            .filter(|d| d.is_finite())
            .or(self.duration_secs)
    }

    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn current_ticket(&self) -> Option<&LoadTicket> {
        self.ticket.as_ref()
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    pub(crate) fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }

    // Helper functions

    fn is_ticket_for(&self, queue: &QueueStore) -> bool {
        match (self.ticket.as_ref(), queue.current()) {
            (Some(ticket), Some(track)) => ticket.track_id == track.id,
            _ => false,
        }
    }

    fn is_loaded_for(&self, queue: &QueueStore) -> bool {
        self.loaded && self.is_ticket_for(queue)
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.is_playing != is_playing {
            self.is_playing = is_playing;
            self.emit(PlayerEvent::StateChanged { is_playing });
        }
    }

    fn emit_position(&mut self) {
        self.emit(PlayerEvent::PositionChanged {
            position_secs: self.position_secs,
            duration_secs: self.duration(),
        });
    }

    fn emit_volume_changed(&mut self) {
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }
}
