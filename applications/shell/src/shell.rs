//! Interactive shell over one player session
//!
//! Renders session events and snapshots as text. The caller owns the input
//! loop: it parses lines into [`Command`]s, calls [`Shell::execute`], and
//! drives the simulated clock with [`Shell::tick`].

use crate::commands::{Command, HELP};
use crate::error::Result;
use encore_core::{EncoreError, Playlist, PlaylistId, PlaylistStore};
use encore_playback::{
    Intent, PlayerEvent, PlayerSession, PlayerSnapshot, PlaylistLibrary, SimulatedHandle,
};
use std::io::Write;
use std::time::Duration;

/// Whether the input loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<S: PlaylistStore> {
    session: PlayerSession<SimulatedHandle>,
    library: PlaylistLibrary<S>,
}

impl<S: PlaylistStore> Shell<S> {
    pub fn new(session: PlayerSession<SimulatedHandle>, library: PlaylistLibrary<S>) -> Self {
        Self { session, library }
    }

    pub fn session(&self) -> &PlayerSession<SimulatedHandle> {
        &self.session
    }

    pub fn library(&self) -> &PlaylistLibrary<S> {
        &self.library
    }

    /// Run one command, writing its output to `out`
    pub async fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Player(intent) => self.session.dispatch(intent)?,
            Command::PlayPlaylist { playlist_id, start } => {
                let playlist = self.find_playlist(&playlist_id).await?;
                writeln!(out, "Playing {} ({} tracks)", playlist.name, playlist.tracks.len())?;
                self.session.dispatch(Intent::PlayTracks {
                    tracks: playlist.tracks,
                    start,
                })?;
            }
            Command::Enqueue(playlist_id) => {
                let playlist = self.find_playlist(&playlist_id).await?;
                writeln!(out, "Queued {} tracks from {}", playlist.tracks.len(), playlist.name)?;
                self.session.dispatch(Intent::AddTracks {
                    tracks: playlist.tracks,
                })?;
            }
            Command::Keep(playlist_id) => {
                let Some(track) = self.session.current_track().cloned() else {
                    writeln!(out, "Nothing is playing")?;
                    return Ok(Flow::Continue);
                };
                let title = track.title.clone();
                self.library.add_track_to_playlist(&playlist_id, track).await?;
                writeln!(out, "Added {} to {}", title, playlist_id)?;
            }
            Command::Playlists => self.write_playlists(out)?,
            Command::Refresh => {
                self.library.refresh_playlists().await?;
                writeln!(out, "{} playlists", self.library.playlists().len())?;
            }
            Command::Save(playlist_id) => {
                self.library.save_playlist(&playlist_id).await?;
                writeln!(out, "Saved {}", playlist_id)?;
            }
            Command::Unsave(playlist_id) => {
                self.library.unsave_playlist(&playlist_id).await?;
                writeln!(out, "Removed {} from your library", playlist_id)?;
            }
            Command::Queue => self.write_queue(out)?,
            Command::Status => writeln!(out, "{}", status_line(&self.session.snapshot()))?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Advance the simulated clock and feed the handle's notifications back
    pub fn tick(&mut self, elapsed: Duration) {
        for event in self.session.handle_mut().tick(elapsed) {
            self.session.handle_event(event);
        }
    }

    /// Print the events worth showing since the last call
    pub fn write_events(&mut self, out: &mut impl Write) -> Result<()> {
        for event in self.session.drain_events() {
            match event {
                PlayerEvent::TrackChanged { index, .. } => {
                    if let Some(track) = self.session.queue().tracks().get(index) {
                        writeln!(out, "> {}. {} - {}", index + 1, track.title, track.artist_name)?;
                    }
                }
                PlayerEvent::StateChanged { is_playing } => {
                    writeln!(out, "{}", if is_playing { "[playing]" } else { "[paused]" })?;
                }
                PlayerEvent::VolumeChanged { volume, muted } => {
                    let muted = if muted { " (muted)" } else { "" };
                    writeln!(out, "volume {:.0}%{}", volume * 100.0, muted)?;
                }
                PlayerEvent::ModeChanged { shuffle, repeat } => {
                    writeln!(
                        out,
                        "shuffle {} / repeat {}",
                        on_off(shuffle),
                        repeat.as_str()
                    )?;
                }
                PlayerEvent::PlaybackFailed { track_id, reason } => {
                    writeln!(out, "! could not play {}: {}", track_id, reason)?;
                }
                PlayerEvent::PlaybackStalled { failures } => {
                    writeln!(out, "! stopped after {} tracks failed in a row", failures)?;
                }
                PlayerEvent::QueueEnded => writeln!(out, "End of queue")?,
                PlayerEvent::QueueChanged { length } => writeln!(out, "{} tracks queued", length)?,
                PlayerEvent::TrackFinished { .. } | PlayerEvent::PositionChanged { .. } => {}
            }
        }
        Ok(())
    }

    // Helper functions

    /// Cached playlist, refreshing once on a miss
    async fn find_playlist(&mut self, id: &PlaylistId) -> Result<Playlist> {
        if self.library.playlist(id).is_none() {
            self.library.refresh_playlists().await?;
        }
        self.library
            .playlist(id)
            .cloned()
            .ok_or_else(|| EncoreError::PlaylistNotFound(id.clone()).into())
    }

    fn write_playlists(&self, out: &mut impl Write) -> Result<()> {
        let user_id = self.library.user().user_id();
        if self.library.playlists().is_empty() {
            writeln!(out, "No playlists")?;
        }

        for playlist in self.library.playlists() {
            let marker = if user_id.is_some_and(|u| playlist.is_owned_by(u)) {
                "own"
            } else if self.library.is_saved(&playlist.id) {
                "saved"
            } else {
                ""
            };
            writeln!(
                out,
                "{}  {:<24} {:>3} tracks  {:<7} {}",
                playlist.id,
                playlist.name,
                playlist.tracks.len(),
                playlist.visibility.as_str(),
                marker
            )?;
        }
        Ok(())
    }

    fn write_queue(&self, out: &mut impl Write) -> Result<()> {
        let queue = self.session.queue();
        if queue.is_empty() {
            writeln!(out, "Queue is empty")?;
            return Ok(());
        }

        for (index, track) in queue.tracks().iter().enumerate() {
            let marker = if queue.cursor() == Some(index) { ">" } else { " " };
            writeln!(
                out,
                "{} {:>3}. {} - {}",
                marker,
                index + 1,
                track.title,
                track.artist_name
            )?;
        }
        Ok(())
    }
}

/// One-line summary of the session
pub fn status_line(snapshot: &PlayerSnapshot) -> String {
    let state = if snapshot.ended {
        "ended"
    } else if snapshot.is_loading && snapshot.is_playing {
        "loading"
    } else if snapshot.is_playing {
        "playing"
    } else {
        "paused"
    };

    let track = snapshot.current_track.as_ref().map_or_else(
        || "-".to_string(),
        |t| format!("{} - {}", t.title, t.artist_name),
    );
    let duration = snapshot
        .duration_secs
        .map_or_else(|| "--:--".to_string(), clock);
    let volume = if snapshot.muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", snapshot.volume * 100.0)
    };

    format!(
        "[{}] {} {}/{} vol {} shuffle {} repeat {}",
        state,
        track,
        clock(snapshot.position_secs),
        duration,
        volume,
        on_off(snapshot.shuffle),
        snapshot.repeat.as_str()
    )
}

fn clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
