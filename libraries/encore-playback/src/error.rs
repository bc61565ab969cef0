//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// Source failures are never reported here; they surface as
/// [`PlayerEvent::PlaybackFailed`](crate::PlayerEvent::PlaybackFailed).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Seek target is not a finite number of seconds
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// Volume is not a finite level
    #[error("Invalid volume: {0}")]
    InvalidVolume(f32),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
