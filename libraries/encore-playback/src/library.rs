//! Playlist library
//!
//! Cached view of the playlists visible to the current user, kept in step
//! with a [`PlaylistStore`]. Edits are applied to the cache first and rolled
//! back if the store rejects them; deletion waits for the store. Nothing is
//! invalidated automatically: [`PlaylistLibrary::refresh_playlists`] is the
//! only synchronization point.

use encore_core::{
    CreatePlaylist, EncoreError, Playlist, PlaylistId, PlaylistStore, Result, Track, TrackId,
    UpdatePlaylist, UserContext, UserId, ValidationError, Visibility,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Playlist repository adapter for one user
pub struct PlaylistLibrary<S: PlaylistStore> {
    store: Arc<S>,
    user: UserContext,

    // Cache
    playlists: Vec<Playlist>,
    saved: HashSet<PlaylistId>,
}

impl<S: PlaylistStore> PlaylistLibrary<S> {
    /// Create a library with an empty cache; call `refresh_playlists` to fill it
    pub fn new(store: Arc<S>, user: UserContext) -> Self {
        Self {
            store,
            user,
            playlists: Vec::new(),
            saved: HashSet::new(),
        }
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    // ===== Sync =====

    /// Re-fetch every visible playlist and the user's saves
    ///
    /// The cache is replaced only if both reads succeed.
    pub async fn refresh_playlists(&mut self) -> Result<()> {
        let user_id = self.user.user_id();

        let playlists = self.store.visible_playlists(user_id).await?;
        let saved = match user_id {
            Some(user_id) => self
                .store
                .saved_playlists(user_id)
                .await?
                .into_iter()
                .map(|relation| relation.playlist_id)
                .collect(),
            None => HashSet::new(),
        };

        tracing::debug!(
            playlists = playlists.len(),
            saved = saved.len(),
            "playlist cache refreshed"
        );

        self.playlists = playlists;
        self.saved = saved;
        Ok(())
    }

    // ===== Playlists =====

    /// Create a playlist owned by the current user
    ///
    /// The name is checked before anything reaches the store. An empty
    /// description is stored as none.
    pub async fn create_playlist(
        &mut self,
        name: &str,
        description: &str,
        initial_tracks: Vec<Track>,
        is_public: bool,
    ) -> Result<PlaylistId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPlaylistName.into());
        }
        let owner = self.require_user()?.clone();

        let mut request = CreatePlaylist::new(name)
            .with_visibility(Visibility::from(is_public))
            .with_tracks(initial_tracks);
        let description = description.trim();
        if !description.is_empty() {
            request = request.with_description(description);
        }

        let playlist = match self.store.insert_playlist(&owner, request).await {
            Ok(playlist) => playlist,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create playlist");
                return Err(err);
            }
        };

        let id = playlist.id.clone();
        tracing::info!(playlist_id = %id, "playlist created");
        self.playlists.insert(0, playlist);
        Ok(id)
    }

    /// Delete a playlist
    ///
    /// The cache only changes once the store confirms; a denial is returned
    /// to the caller.
    pub async fn delete_playlist(&mut self, id: &PlaylistId) -> Result<()> {
        let user = self.require_user()?.clone();

        if let Err(err) = self.store.delete_playlist(&user, id).await {
            if err.is_access_denied() {
                tracing::error!(playlist_id = %id, error = %err, "playlist deletion denied");
            } else {
                tracing::warn!(playlist_id = %id, error = %err, "failed to delete playlist");
            }
            return Err(err);
        }

        self.playlists.retain(|p| &p.id != id);
        self.saved.remove(id);
        Ok(())
    }

    /// Apply metadata edits (name, description, visibility)
    ///
    /// The name is trimmed before it reaches the cache or the store.
    pub async fn update_playlist(&mut self, id: &PlaylistId, mut update: UpdatePlaylist) -> Result<()> {
        if let Some(name) = update.name.take() {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyPlaylistName.into());
            }
            update.name = Some(name.to_string());
        }
        if update.is_empty() {
            return Ok(());
        }
        let user = self.require_user()?.clone();

        let previous = self.apply_tentative(id, |playlist| update.apply_to(playlist));

        match self.store.update_playlist(&user, id, update).await {
            Ok(updated) => {
                if let Some(slot) = self.playlists.iter_mut().find(|p| &p.id == id) {
                    *slot = updated;
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(playlist_id = %id, error = %err, "playlist update failed, rolling back");
                self.rollback(previous);
                Err(err)
            }
        }
    }

    pub async fn rename_playlist(&mut self, id: &PlaylistId, name: &str) -> Result<()> {
        self.update_playlist(
            id,
            UpdatePlaylist {
                name: Some(name.to_string()),
                ..UpdatePlaylist::default()
            },
        )
        .await
    }

    pub async fn set_playlist_visibility(&mut self, id: &PlaylistId, is_public: bool) -> Result<()> {
        self.update_playlist(
            id,
            UpdatePlaylist {
                visibility: Some(Visibility::from(is_public)),
                ..UpdatePlaylist::default()
            },
        )
        .await
    }

    /// Set or clear (`None`) the description
    pub async fn set_playlist_description(
        &mut self,
        id: &PlaylistId,
        description: Option<String>,
    ) -> Result<()> {
        self.update_playlist(
            id,
            UpdatePlaylist {
                description: Some(description),
                ..UpdatePlaylist::default()
            },
        )
        .await
    }

    // ===== Playlist tracks =====

    /// Append a track to the end of a playlist
    pub async fn add_track_to_playlist(&mut self, id: &PlaylistId, track: Track) -> Result<()> {
        let user = self.require_user()?.clone();

        let previous = self.apply_tentative(id, |playlist| playlist.tracks.push(track.clone()));

        if let Err(err) = self.store.append_track(&user, id, &track).await {
            tracing::warn!(playlist_id = %id, track_id = %track.id, error = %err, "add track failed, rolling back");
            self.rollback(previous);
            return Err(err);
        }

        Ok(())
    }

    /// Remove every occurrence of a track; the rest keep their order
    pub async fn remove_track_from_playlist(
        &mut self,
        id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<()> {
        let user = self.require_user()?.clone();

        let previous = self.apply_tentative(id, |playlist| {
            playlist.remove_track(track_id);
        });

        if let Err(err) = self.store.remove_track(&user, id, track_id).await {
            tracing::warn!(playlist_id = %id, track_id = %track_id, error = %err, "remove track failed, rolling back");
            self.rollback(previous);
            return Err(err);
        }

        Ok(())
    }

    /// Move the track at `from` to `to`
    pub async fn move_track(&mut self, id: &PlaylistId, from: usize, to: usize) -> Result<()> {
        let user = self.require_user()?.clone();

        if let Some(playlist) = self.playlist(id) {
            let len = playlist.tracks.len();
            if from >= len {
                return Err(ValidationError::PositionOutOfRange(from).into());
            }
            if to >= len {
                return Err(ValidationError::PositionOutOfRange(to).into());
            }
        }
        if from == to {
            return Ok(());
        }

        let previous = self.apply_tentative(id, |playlist| {
            let track = playlist.tracks.remove(from);
            playlist.tracks.insert(to, track);
        });

        if let Err(err) = self.store.move_track(&user, id, from, to).await {
            tracing::warn!(playlist_id = %id, from, to, error = %err, "move track failed, rolling back");
            self.rollback(previous);
            return Err(err);
        }

        Ok(())
    }

    // ===== Saves =====

    /// Add someone else's playlist to the user's library
    ///
    /// Saving an already-saved playlist succeeds without a store call.
    pub async fn save_playlist(&mut self, id: &PlaylistId) -> Result<()> {
        let user = self.require_user()?.clone();

        if self.playlist(id).is_some_and(|p| p.is_owned_by(&user)) {
            return Err(ValidationError::OwnPlaylist.into());
        }
        if !self.saved.insert(id.clone()) {
            return Ok(());
        }

        if let Err(err) = self.store.insert_save(&user, id).await {
            tracing::warn!(playlist_id = %id, error = %err, "save failed, rolling back");
            self.saved.remove(id);
            return Err(err);
        }

        Ok(())
    }

    /// Drop a playlist from the user's library; unsaving twice is fine
    pub async fn unsave_playlist(&mut self, id: &PlaylistId) -> Result<()> {
        let user = self.require_user()?.clone();

        if !self.saved.remove(id) {
            return Ok(());
        }

        if let Err(err) = self.store.delete_save(&user, id).await {
            tracing::warn!(playlist_id = %id, error = %err, "unsave failed, rolling back");
            self.saved.insert(id.clone());
            return Err(err);
        }

        Ok(())
    }

    // ===== Queries =====

    /// Every cached playlist
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| &p.id == id)
    }

    /// Playlists the current user owns
    pub fn owned_playlists(&self) -> Vec<&Playlist> {
        match self.user.user_id() {
            Some(user_id) => self
                .playlists
                .iter()
                .filter(|p| p.is_owned_by(user_id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Cached playlists the current user saved
    pub fn saved_playlists(&self) -> Vec<&Playlist> {
        self.playlists
            .iter()
            .filter(|p| self.saved.contains(&p.id))
            .collect()
    }

    pub fn is_saved(&self, id: &PlaylistId) -> bool {
        self.saved.contains(id)
    }

    // Helper functions

    fn require_user(&self) -> Result<&UserId> {
        self.user.user_id().ok_or(EncoreError::Unauthenticated)
    }

    /// Apply `change` to the cached playlist, returning its prior state
    fn apply_tentative(
        &mut self,
        id: &PlaylistId,
        change: impl FnOnce(&mut Playlist),
    ) -> Option<Playlist> {
        let playlist = self.playlists.iter_mut().find(|p| &p.id == id)?;
        let previous = playlist.clone();
        change(playlist);
        Some(previous)
    }

    fn rollback(&mut self, previous: Option<Playlist>) {
        let Some(previous) = previous else {
            return;
        };
        if let Some(slot) = self.playlists.iter_mut().find(|p| p.id == previous.id) {
            *slot = previous;
        }
    }
}
