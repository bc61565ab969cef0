//! Playlist domain types

use super::ids::{PlaylistId, TrackId, UserId};
use super::track::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Who can see a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed for every user, saveable by non-owners
    Public,
    /// Only the owner can see it
    #[default]
    Private,
}

impl Visibility {
    /// Convert visibility to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// Whether non-owners can see the playlist
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

impl From<bool> for Visibility {
    fn from(is_public: bool) -> Self {
        if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility: {other}")),
        }
    }
}

/// Persisted, named, ordered collection of tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub visibility: Visibility,

    /// Tracks in playlist order; index is the position
    #[serde(default)]
    pub tracks: Vec<Track>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Whether `user_id` owns this playlist
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Track ids in playlist order
    pub fn track_ids(&self) -> Vec<&TrackId> {
        self.tracks.iter().map(|t| &t.id).collect()
    }

    /// Whether the playlist contains `track_id` at least once
    pub fn contains_track(&self, track_id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == track_id)
    }

    /// Remove every occurrence of `track_id`, keeping the order of the rest
    ///
    /// Returns the number of removed entries.
    pub fn remove_track(&mut self, track_id: &TrackId) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.id != track_id);
        before - self.tracks.len()
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub tracks: Vec<Track>,
}

impl CreatePlaylist {
    /// Private, empty playlist request
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            visibility: Visibility::Private,
            tracks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_tracks(mut self, tracks: Vec<Track>) -> Self {
        self.tracks = tracks;
        self
    }
}

/// Owner edits to playlist metadata; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub visibility: Option<Visibility>,
}

impl UpdatePlaylist {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.visibility.is_none()
    }

    /// Apply the update to a cached playlist
    pub fn apply_to(&self, playlist: &mut Playlist) {
        if let Some(name) = &self.name {
            playlist.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            playlist.description.clone_from(description);
        }
        if let Some(visibility) = self.visibility {
            playlist.visibility = visibility;
        }
    }
}

/// A user's library entry for someone else's playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRelation {
    pub user_id: UserId,
    pub playlist_id: PlaylistId,
    pub saved_at: DateTime<Utc>,
}

impl SaveRelation {
    pub fn new(user_id: UserId, playlist_id: PlaylistId) -> Self {
        Self {
            user_id,
            playlist_id,
            saved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist_with(ids: &[&str]) -> Playlist {
        Playlist {
            id: PlaylistId::new("p1"),
            name: "Mix".to_string(),
            description: None,
            owner_id: UserId::new("owner"),
            visibility: Visibility::Private,
            tracks: ids
                .iter()
                .map(|id| Track::new(TrackId::new(*id), *id, "Artist", "u"))
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn visibility_string_conversion() {
        assert_eq!(Visibility::Public.as_str(), "public");
        assert_eq!("private".parse::<Visibility>(), Ok(Visibility::Private));
        assert!("hidden".parse::<Visibility>().is_err());
        assert_eq!(Visibility::from(true), Visibility::Public);
    }

    #[test]
    fn remove_track_keeps_relative_order() {
        let mut playlist = playlist_with(&["a", "b", "a", "c"]);
        assert_eq!(playlist.remove_track(&TrackId::new("a")), 2);

        let ids: Vec<&str> = playlist.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn update_applies_only_set_fields() {
        let mut playlist = playlist_with(&[]);
        playlist.description = Some("old".to_string());

        let update = UpdatePlaylist {
            name: Some("Renamed".to_string()),
            description: Some(None),
            visibility: None,
        };
        update.apply_to(&mut playlist);

        assert_eq!(playlist.name, "Renamed");
        assert_eq!(playlist.description, None);
        assert_eq!(playlist.visibility, Visibility::Private);
        assert!(UpdatePlaylist::default().is_empty());
    }

    #[test]
    fn ownership_check() {
        let playlist = playlist_with(&[]);
        assert!(playlist.is_owned_by(&UserId::new("owner")));
        assert!(!playlist.is_owned_by(&UserId::new("someone-else")));
    }
}
