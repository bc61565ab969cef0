//! Encore Core
//!
//! Platform-agnostic domain types, store contracts, and error handling for Encore.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `SaveRelation`, `UserContext`
//! - **Store Contract**: `PlaylistStore`, the relational store behind the playlist library
//! - **Error Handling**: Unified `EncoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use encore_core::types::{CreatePlaylist, Track, TrackId, UserContext, UserId, Visibility};
//!
//! let user = UserContext::authenticated(UserId::new("user-1"));
//! assert!(user.user_id().is_some());
//!
//! let track = Track::new(
//!     TrackId::new("track-1"),
//!     "Night Drive",
//!     "The Midnight",
//!     "https://cdn.example.com/night-drive.mp3",
//! );
//!
//! let request = CreatePlaylist::new("Road Trip")
//!     .with_visibility(Visibility::Public)
//!     .with_tracks(vec![track]);
//! assert_eq!(request.tracks.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{EncoreError, Result, ValidationError};
pub use store::PlaylistStore;

pub use types::{
    CreatePlaylist, Playlist, PlaylistId, SaveRelation, Track, TrackId, UpdatePlaylist,
    UserContext, UserId, Visibility,
};
