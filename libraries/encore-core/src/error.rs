/// Core error types for Encore
use crate::types::{PlaylistId, TrackId};
use thiserror::Error;

/// Result type alias using `EncoreError`
pub type Result<T> = std::result::Result<T, EncoreError>;

/// Named reasons a request is rejected before it reaches the store
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Playlist names must contain at least one non-whitespace character
    #[error("playlist name must not be empty")]
    EmptyPlaylistName,

    /// Owners cannot add their own playlist to their library
    #[error("a playlist cannot be saved by its owner")]
    OwnPlaylist,

    /// Position outside the playlist's track list
    #[error("track position {0} is out of range")]
    PositionOutOfRange(usize),
}

/// Core error type for Encore
#[derive(Error, Debug)]
pub enum EncoreError {
    /// Request rejected before any store call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Operation requires a signed-in user
    #[error("Operation requires an authenticated user")]
    Unauthenticated,

    /// Access policy rejected the operation
    #[error("Permission denied")]
    PermissionDenied,

    /// Playlist not found (or not visible to the caller)
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Track is not part of the playlist
    #[error("Track {track_id} is not in playlist {playlist_id}")]
    TrackNotInPlaylist {
        /// Playlist that was searched
        playlist_id: PlaylistId,
        /// Track that was missing
        track_id: TrackId,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database errors (for store implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl EncoreError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the store refused the operation for policy reasons
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Unauthenticated)
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for EncoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
