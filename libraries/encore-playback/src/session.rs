//! Player session
//!
//! One session per UI instance, owned by the application shell and passed
//! by reference to whatever renders it. Commands apply synchronously to the
//! queue and transport; handle notifications come back in through
//! [`PlayerSession::handle_event`]; the UI drains [`PlayerEvent`]s and reads
//! [`PlayerSession::snapshot`] to re-render.

use crate::error::Result;
use crate::events::PlayerEvent;
use crate::handle::{HandleEvent, LoadTicket, PlaybackHandle};
use crate::queue::QueueStore;
use crate::transport::TransportController;
use crate::types::{PlaybackConfig, RepeatMode};
use encore_core::Track;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the session for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub tracks: Vec<Track>,
    pub cursor: Option<usize>,
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub is_loading: bool,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub volume: f32,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// Queue ran off the end with repeat off
    pub ended: bool,
}

/// Queue + transport for one listener
pub struct PlayerSession<H: PlaybackHandle> {
    queue: QueueStore,
    transport: TransportController<H>,
    restart_threshold_secs: f64,
}

impl<H: PlaybackHandle> PlayerSession<H> {
    /// Create an empty session around `handle`
    pub fn new(handle: H, config: &PlaybackConfig) -> Self {
        Self {
            queue: QueueStore::from_config(config),
            transport: TransportController::new(handle, config.volume),
            restart_threshold_secs: config.restart_threshold().as_secs_f64(),
        }
    }

    // ===== Queue =====

    /// Replace the queue; keeps playing if something was playing
    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        let autoplay = self.transport.is_playing();
        self.queue.set_queue(tracks);
        self.emit_queue_changed();
        self.transport.reset_failures();
        self.transport.load_current(&mut self.queue, autoplay);
    }

    /// Replace the queue and start playing at `start`
    ///
    /// An out-of-range `start` begins at the first track.
    pub fn play_tracks(&mut self, tracks: Vec<Track>, start: usize) {
        self.queue.set_queue(tracks);
        self.queue.jump_to(start);
        self.emit_queue_changed();
        self.transport.reset_failures();
        self.transport.load_current(&mut self.queue, true);
    }

    /// Append tracks; starts playback when there was no current track
    pub fn add_tracks(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }

        let start = self.queue.add_tracks(tracks);
        self.emit_queue_changed();

        if start {
            self.transport.reset_failures();
            self.transport.load_current(&mut self.queue, true);
        }
    }

    /// Make `index` current; out-of-range indices are ignored
    pub fn jump_to(&mut self, index: usize) -> bool {
        let before = self.queue.cursor();
        if !self.queue.jump_to(index) {
            return false;
        }

        self.follow_cursor(before);
        true
    }

    /// Skip to the next track; no-op without a current track
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        let Some(before) = self.queue.cursor() else {
            return;
        };

        self.queue.advance();
        self.follow_cursor(Some(before));
    }

    /// Go to previous track
    ///
    /// Past the restart threshold this restarts the current track instead.
    pub fn previous(&mut self) {
        let Some(before) = self.queue.cursor() else {
            return;
        };

        if self.transport.position() > self.restart_threshold_secs {
            self.transport.restart(&mut self.queue);
            return;
        }

        self.queue.retreat();
        self.follow_cursor(Some(before));
    }

    /// Remove a queued track
    ///
    /// Removing the current track loads whichever track takes its place.
    pub fn remove_from_queue(&mut self, index: usize) -> Result<Track> {
        let was_current = self.queue.cursor() == Some(index);
        let removed = self.queue.remove(index)?;
        self.emit_queue_changed();

        if was_current {
            if self.queue.is_empty() {
                self.transport.stop();
            } else {
                let autoplay = self.transport.is_playing();
                self.transport.load_current(&mut self.queue, autoplay);
            }
        }

        Ok(removed)
    }

    /// Move a queued track; the current track keeps playing
    pub fn reorder_queue(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.reorder(from, to)?;
        self.emit_queue_changed();
        Ok(())
    }

    /// Clear the queue and unload the source
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.transport.stop();
        self.emit_queue_changed();
    }

    /// Flip shuffle, returning the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        let shuffle = self.queue.toggle_shuffle();
        self.emit_mode_changed();
        shuffle
    }

    /// Off -> All -> One -> Off, returning the new mode
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        let repeat = self.queue.cycle_repeat_mode();
        self.emit_mode_changed();
        repeat
    }

    // ===== Transport =====

    pub fn play(&mut self) {
        self.transport.play(&mut self.queue);
    }

    pub fn pause(&mut self) {
        self.transport.pause(&self.queue);
    }

    pub fn toggle_play(&mut self) {
        self.transport.toggle_play(&mut self.queue);
    }

    /// Seek to `secs`, clamped to the track
    pub fn seek_to(&mut self, secs: f64) -> Result<()> {
        self.transport.seek_to(&self.queue, secs)
    }

    /// Seek to a fraction (0.0-1.0) of the track
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<()> {
        self.transport.seek_to_fraction(&self.queue, fraction)
    }

    /// Set volume (0.0-1.0)
    pub fn set_volume(&mut self, level: f32) -> Result<()> {
        self.transport.set_volume(level)
    }

    pub fn toggle_mute(&mut self) {
        self.transport.toggle_mute();
    }

    // ===== Handle events =====

    /// Single entry point for playback handle notifications
    pub fn handle_event(&mut self, event: HandleEvent) {
        self.transport.handle_event(&mut self.queue, event);
    }

    // ===== Queries =====

    pub fn queue(&self) -> &QueueStore {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn position(&self) -> f64 {
        self.transport.position()
    }

    pub fn volume(&self) -> f32 {
        self.transport.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.transport.is_muted()
    }

    /// Ticket of the latest load request
    pub fn current_ticket(&self) -> Option<&LoadTicket> {
        self.transport.current_ticket()
    }

    pub fn handle(&self) -> &H {
        self.transport.handle()
    }

    pub fn handle_mut(&mut self) -> &mut H {
        self.transport.handle_mut()
    }

    /// Capture the state the UI renders
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            tracks: self.queue.tracks().to_vec(),
            cursor: self.queue.cursor(),
            current_track: self.queue.current().cloned(),
            is_playing: self.transport.is_playing(),
            is_loading: self.transport.is_loading(),
            position_secs: self.transport.position(),
            duration_secs: self.transport.duration(),
            volume: self.transport.volume(),
            muted: self.transport.is_muted(),
            shuffle: self.queue.shuffle(),
            repeat: self.queue.repeat(),
            ended: self.queue.is_ended(),
        }
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns everything emitted since the last drain. The UI should call
    /// this after each command or handle event to stay in sync.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.transport.drain_events()
    }

    pub fn has_pending_events(&self) -> bool {
        self.transport.has_pending_events()
    }

    // Helper functions

    /// Load or restart after the cursor may have moved from `before`
    fn follow_cursor(&mut self, before: Option<usize>) {
        if self.queue.cursor() == before {
            self.transport.restart(&mut self.queue);
            return;
        }

        let autoplay = self.transport.is_playing();
        self.transport.reset_failures();
        self.transport.load_current(&mut self.queue, autoplay);
    }

    fn emit_queue_changed(&mut self) {
        self.transport.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit_mode_changed(&mut self) {
        self.transport.emit(PlayerEvent::ModeChanged {
            shuffle: self.queue.shuffle(),
            repeat: self.queue.repeat(),
        });
    }
}
