//! Relational store contract behind the playlist library

use crate::error::Result;
use crate::types::{
    CreatePlaylist, Playlist, PlaylistId, SaveRelation, Track, TrackId, UpdatePlaylist, UserId,
};
use async_trait::async_trait;

/// Playlist and save-relation persistence
///
/// Implementations enforce the access policy themselves: mutations on a
/// playlist the caller does not own fail with `EncoreError::PermissionDenied`,
/// and playlists the caller cannot see are reported as not found. Callers
/// pass the acting user explicitly on every call.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    // ========================================================================
    // Playlists
    // ========================================================================

    /// Persist a new playlist owned by `owner`
    async fn insert_playlist(&self, owner: &UserId, playlist: CreatePlaylist) -> Result<Playlist>;

    /// Apply owner edits to playlist metadata
    async fn update_playlist(
        &self,
        user: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Playlist>;

    /// Delete a playlist (owner only); save relations go with it
    async fn delete_playlist(&self, user: &UserId, id: &PlaylistId) -> Result<()>;

    /// Get a playlist with its tracks, if visible to `user`
    async fn get_playlist(&self, user: Option<&UserId>, id: &PlaylistId)
        -> Result<Option<Playlist>>;

    /// Every playlist visible to `user`: owned, public, and saved
    ///
    /// Anonymous callers see public playlists only.
    async fn visible_playlists(&self, user: Option<&UserId>) -> Result<Vec<Playlist>>;

    // ========================================================================
    // Playlist tracks
    // ========================================================================

    /// Append a track at the end of the playlist
    async fn append_track(&self, user: &UserId, playlist_id: &PlaylistId, track: &Track)
        -> Result<()>;

    /// Remove every entry of `track_id`; remaining entries keep their order
    async fn remove_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<()>;

    /// Move the entry at `from` so it ends up at `to`
    async fn move_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        from: usize,
        to: usize,
    ) -> Result<()>;

    // ========================================================================
    // Save relation
    // ========================================================================

    /// Record that `user` saved `playlist_id`; saving twice is not an error
    async fn insert_save(&self, user: &UserId, playlist_id: &PlaylistId) -> Result<()>;

    /// Drop the save relation; removing an absent relation is not an error
    async fn delete_save(&self, user: &UserId, playlist_id: &PlaylistId) -> Result<()>;

    /// Save relations of `user`
    async fn saved_playlists(&self, user: &UserId) -> Result<Vec<SaveRelation>>;
}
