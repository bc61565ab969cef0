/// Track domain type
use super::ids::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Catalog track as it is queued and stored in playlists
///
/// Sourced from the external catalog and never mutated once it is in a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist display name
    pub artist_name: String,

    /// Artist profile reference (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,

    /// Cover image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    /// Audio source URL handed to the playback handle
    pub audio_url: String,

    /// Duration in seconds, when the catalog knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,

    /// Play count reported by the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,
}

impl Track {
    /// Create a track with the fields playback needs
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist_name: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist_name: artist_name.into(),
            artist_id: None,
            cover_url: None,
            audio_url: audio_url.into(),
            duration_secs: None,
            play_count: None,
        }
    }

    /// Set the duration in seconds
    #[must_use]
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Set the cover image reference
    #[must_use]
    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    /// Set the artist profile reference
    #[must_use]
    pub fn with_artist_id(mut self, artist_id: impl Into<String>) -> Self {
        self.artist_id = Some(artist_id.into());
        self
    }

    /// Duration as a `Duration`, when known and finite
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Whether the track carries a playable source
    ///
    /// Sources are opaque; only emptiness is checked.
    pub fn has_source(&self) -> bool {
        !self.audio_url.trim().is_empty()
    }
}
