//! Encore - Playback Session
//!
//! Platform-agnostic player state for Encore.
//!
//! This crate provides:
//! - Queue store with shuffle and repeat (Off, All, One)
//! - Transport controller over a single playback handle
//! - Stale-load protection via load tickets
//! - Volume with a mute override that preserves the level
//! - Playlist library with optimistic edits and rollback
//! - Player session object and intent dispatch for the UI
//!
//! # Architecture
//!
//! `encore-playback` does not depend on any audio backend or database:
//! - Audio output is injected through the [`PlaybackHandle`] trait
//! - Persistence is injected through [`encore_core::PlaylistStore`]
//! - [`SimulatedHandle`] drives a session headlessly (shell, tests)
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use encore_core::{Track, TrackId};
//! use encore_playback::{PlaybackConfig, PlayerSession, SimulatedHandle};
//!
//! let mut session = PlayerSession::new(SimulatedHandle::default(), &PlaybackConfig::default());
//!
//! let track = Track::new(
//!     TrackId::new("t1"),
//!     "My Song",
//!     "Artist Name",
//!     "https://cdn.example.com/t1.mp3",
//! );
//! session.play_tracks(vec![track], 0);
//!
//! // The handle reports the load; playback starts
//! if let Some(event) = session.handle_mut().resolve_load() {
//!     session.handle_event(event);
//! }
//! assert!(session.handle().is_playing());
//! ```
//!
//! # Example: Intents
//!
//! ```rust
//! use encore_playback::{Intent, PlaybackConfig, PlayerSession, RepeatMode, SimulatedHandle};
//!
//! let mut session = PlayerSession::new(SimulatedHandle::default(), &PlaybackConfig::default());
//! session.dispatch(Intent::CycleRepeatMode).unwrap();
//! session.dispatch(Intent::SetVolume { level: 0.5 }).unwrap();
//!
//! assert_eq!(session.queue().repeat(), RepeatMode::All);
//! ```

mod error;
mod events;
mod handle;
mod history;
mod intent;
mod library;
mod queue;
mod session;
mod shuffle;
mod transport;
pub mod types;
mod volume;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use handle::{HandleEvent, LoadTicket, PlaybackHandle, SimulatedHandle};
pub use intent::Intent;
pub use library::PlaylistLibrary;
pub use queue::QueueStore;
pub use session::{PlayerSession, PlayerSnapshot};
pub use transport::TransportController;
pub use types::{PlaybackConfig, RepeatMode};
pub use volume::Volume;
