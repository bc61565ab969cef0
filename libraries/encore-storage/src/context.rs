use crate::{playlists, saves};
use async_trait::async_trait;
use encore_core::{error::Result, store::PlaylistStore, types::*};
use sqlx::SqlitePool;

/// Playlist store backed by `SQLite`
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PlaylistStore for SqliteStore {
    // Playlists
    async fn insert_playlist(&self, owner: &UserId, playlist: CreatePlaylist) -> Result<Playlist> {
        playlists::create(&self.pool, owner, playlist).await
    }

    async fn update_playlist(
        &self,
        user: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Playlist> {
        playlists::update(&self.pool, id, update, user).await
    }

    async fn delete_playlist(&self, user: &UserId, id: &PlaylistId) -> Result<()> {
        playlists::delete(&self.pool, id, user).await
    }

    async fn get_playlist(
        &self,
        user: Option<&UserId>,
        id: &PlaylistId,
    ) -> Result<Option<Playlist>> {
        playlists::get_by_id(&self.pool, id, user).await
    }

    async fn visible_playlists(&self, user: Option<&UserId>) -> Result<Vec<Playlist>> {
        playlists::get_visible(&self.pool, user).await
    }

    // Playlist tracks
    async fn append_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        track: &Track,
    ) -> Result<()> {
        playlists::add_track(&self.pool, playlist_id, track, user).await
    }

    async fn remove_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<()> {
        playlists::remove_track(&self.pool, playlist_id, track_id, user).await
    }

    async fn move_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        from: usize,
        to: usize,
    ) -> Result<()> {
        playlists::reorder_tracks(&self.pool, playlist_id, from, to, user).await
    }

    // Saves
    async fn insert_save(&self, user: &UserId, playlist_id: &PlaylistId) -> Result<()> {
        saves::insert(&self.pool, user, playlist_id).await
    }

    async fn delete_save(&self, user: &UserId, playlist_id: &PlaylistId) -> Result<()> {
        saves::delete(&self.pool, user, playlist_id).await
    }

    async fn saved_playlists(&self, user: &UserId) -> Result<Vec<SaveRelation>> {
        saves::get_by_user(&self.pool, user).await
    }
}
