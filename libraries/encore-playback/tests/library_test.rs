//! Playlist library tests against an in-memory store

use async_trait::async_trait;
use chrono::Utc;
use encore_core::{
    CreatePlaylist, EncoreError, Playlist, PlaylistId, PlaylistStore, Result, SaveRelation, Track,
    TrackId, UpdatePlaylist, UserContext, UserId, ValidationError, Visibility,
};
use encore_playback::PlaylistLibrary;
use std::sync::{Arc, Mutex};

// ===== In-memory store =====

#[derive(Default)]
struct MemoryState {
    playlists: Vec<Playlist>,
    saves: Vec<SaveRelation>,
    fail_next: bool,
    calls: usize,
}

#[derive(Default)]
struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    fn fail_next_call(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    fn saves(&self) -> Vec<SaveRelation> {
        self.state.lock().unwrap().saves.clone()
    }

    fn stored(&self, id: &PlaylistId) -> Option<Playlist> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    fn seed(&self, owner: &str, name: &str, visibility: Visibility, tracks: &[&str]) -> PlaylistId {
        let now = Utc::now();
        let playlist = Playlist {
            id: PlaylistId::generate(),
            name: name.to_string(),
            description: None,
            owner_id: UserId::new(owner),
            visibility,
            tracks: tracks.iter().map(|id| test_track(id)).collect(),
            created_at: now,
            updated_at: now,
        };
        let id = playlist.id.clone();
        self.state.lock().unwrap().playlists.push(playlist);
        id
    }

    /// Count the call and honour injected failures
    fn begin(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if std::mem::take(&mut state.fail_next) {
            return Err(EncoreError::storage("connection lost"));
        }
        Ok(state)
    }
}

fn owned_mut<'a>(
    state: &'a mut MemoryState,
    user: &UserId,
    id: &PlaylistId,
) -> Result<&'a mut Playlist> {
    let playlist = state
        .playlists
        .iter_mut()
        .find(|p| &p.id == id)
        .ok_or_else(|| EncoreError::PlaylistNotFound(id.clone()))?;
    if !playlist.is_owned_by(user) {
        return Err(EncoreError::PermissionDenied);
    }
    Ok(playlist)
}

fn visible_to(playlist: &Playlist, user: Option<&UserId>) -> bool {
    playlist.visibility.is_public() || user.is_some_and(|u| playlist.is_owned_by(u))
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn insert_playlist(&self, owner: &UserId, playlist: CreatePlaylist) -> Result<Playlist> {
        let mut state = self.begin()?;
        let now = Utc::now();
        let playlist = Playlist {
            id: PlaylistId::generate(),
            name: playlist.name,
            description: playlist.description,
            owner_id: owner.clone(),
            visibility: playlist.visibility,
            tracks: playlist.tracks,
            created_at: now,
            updated_at: now,
        };
        state.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn update_playlist(
        &self,
        user: &UserId,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Playlist> {
        let mut state = self.begin()?;
        let playlist = owned_mut(&mut state, user, id)?;
        update.apply_to(playlist);
        Ok(playlist.clone())
    }

    async fn delete_playlist(&self, user: &UserId, id: &PlaylistId) -> Result<()> {
        let mut state = self.begin()?;
        owned_mut(&mut state, user, id)?;
        state.playlists.retain(|p| &p.id != id);
        state.saves.retain(|s| &s.playlist_id != id);
        Ok(())
    }

    async fn get_playlist(
        &self,
        user: Option<&UserId>,
        id: &PlaylistId,
    ) -> Result<Option<Playlist>> {
        let state = self.begin()?;
        Ok(state
            .playlists
            .iter()
            .find(|p| &p.id == id && visible_to(p, user))
            .cloned())
    }

    async fn visible_playlists(&self, user: Option<&UserId>) -> Result<Vec<Playlist>> {
        let state = self.begin()?;
        Ok(state
            .playlists
            .iter()
            .filter(|p| visible_to(p, user))
            .cloned()
            .collect())
    }

    async fn append_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        track: &Track,
    ) -> Result<()> {
        let mut state = self.begin()?;
        owned_mut(&mut state, user, playlist_id)?
            .tracks
            .push(track.clone());
        Ok(())
    }

    async fn remove_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<()> {
        let mut state = self.begin()?;
        let playlist = owned_mut(&mut state, user, playlist_id)?;
        if playlist.remove_track(track_id) == 0 {
            return Err(EncoreError::TrackNotInPlaylist {
                playlist_id: playlist_id.clone(),
                track_id: track_id.clone(),
            });
        }
        Ok(())
    }

    async fn move_track(
        &self,
        user: &UserId,
        playlist_id: &PlaylistId,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let mut state = self.begin()?;
        let playlist = owned_mut(&mut state, user, playlist_id)?;
        let len = playlist.tracks.len();
        if from >= len || to >= len {
            return Err(ValidationError::PositionOutOfRange(from.max(to)).into());
        }
        let track = playlist.tracks.remove(from);
        playlist.tracks.insert(to, track);
        Ok(())
    }

    async fn insert_save(&self, user: &UserId, playlist_id: &PlaylistId) -> Result<()> {
        let mut state = self.begin()?;
        let playlist = state
            .playlists
            .iter()
            .find(|p| &p.id == playlist_id && visible_to(p, Some(user)))
            .ok_or_else(|| EncoreError::PlaylistNotFound(playlist_id.clone()))?;
        if playlist.is_owned_by(user) {
            return Err(ValidationError::OwnPlaylist.into());
        }
        let exists = state
            .saves
            .iter()
            .any(|s| &s.user_id == user && &s.playlist_id == playlist_id);
        if !exists {
            state
                .saves
                .push(SaveRelation::new(user.clone(), playlist_id.clone()));
        }
        Ok(())
    }

    async fn delete_save(&self, user: &UserId, playlist_id: &PlaylistId) -> Result<()> {
        let mut state = self.begin()?;
        state
            .saves
            .retain(|s| !(&s.user_id == user && &s.playlist_id == playlist_id));
        Ok(())
    }

    async fn saved_playlists(&self, user: &UserId) -> Result<Vec<SaveRelation>> {
        let state = self.begin()?;
        Ok(state
            .saves
            .iter()
            .filter(|s| &s.user_id == user)
            .cloned()
            .collect())
    }
}

// ===== Helpers =====

fn test_track(id: &str) -> Track {
    Track::new(
        TrackId::new(id),
        format!("Track {}", id),
        "Test Artist",
        format!("https://cdn.example.test/{}.mp3", id),
    )
}

fn signed_in(store: &Arc<MemoryStore>, user: &str) -> PlaylistLibrary<MemoryStore> {
    PlaylistLibrary::new(
        Arc::clone(store),
        UserContext::authenticated(UserId::new(user)),
    )
}

fn ids(playlist: &Playlist) -> Vec<&str> {
    playlist.tracks.iter().map(|t| t.id.as_str()).collect()
}

// ===== Tests =====

#[tokio::test]
async fn refresh_loads_visible_playlists_and_saves() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &[]);
    let theirs = store.seed("bob", "Theirs", Visibility::Public, &["t1"]);
    store.seed("bob", "Hidden", Visibility::Private, &[]);

    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();
    library.save_playlist(&theirs).await.unwrap();
    library.refresh_playlists().await.unwrap();

    assert_eq!(library.playlists().len(), 2);
    assert_eq!(library.owned_playlists().len(), 1);
    assert_eq!(library.owned_playlists()[0].id, mine);
    assert!(library.is_saved(&theirs));
    assert_eq!(library.saved_playlists().len(), 1);
}

#[tokio::test]
async fn anonymous_sees_public_only() {
    let store = Arc::new(MemoryStore::default());
    store.seed("bob", "Public", Visibility::Public, &[]);
    store.seed("bob", "Private", Visibility::Private, &[]);

    let mut library = PlaylistLibrary::new(Arc::clone(&store), UserContext::Anonymous);
    library.refresh_playlists().await.unwrap();

    assert_eq!(library.playlists().len(), 1);
    assert!(library.owned_playlists().is_empty());
}

#[tokio::test]
async fn anonymous_mutations_are_rejected() {
    let store = Arc::new(MemoryStore::default());
    let public = store.seed("bob", "Public", Visibility::Public, &[]);

    let mut library = PlaylistLibrary::new(Arc::clone(&store), UserContext::Anonymous);
    library.refresh_playlists().await.unwrap();
    let calls = store.calls();

    let created = library.create_playlist("Mix", "", vec![], false).await;
    let saved = library.save_playlist(&public).await;

    assert!(matches!(created, Err(EncoreError::Unauthenticated)));
    assert!(matches!(saved, Err(EncoreError::Unauthenticated)));
    assert_eq!(store.calls(), calls);
}

#[tokio::test]
async fn create_then_populate() {
    let store = Arc::new(MemoryStore::default());
    let mut library = signed_in(&store, "alice");

    let id = library
        .create_playlist("Road Trip", "", vec![], false)
        .await
        .unwrap();
    library
        .add_track_to_playlist(&id, test_track("trackX"))
        .await
        .unwrap();

    let cached = library.playlist(&id).unwrap();
    assert_eq!(cached.name, "Road Trip");
    assert_eq!(cached.description, None);
    assert_eq!(cached.visibility, Visibility::Private);
    assert_eq!(ids(cached), vec!["trackX"]);

    let stored = store.stored(&id).unwrap();
    assert_eq!(ids(&stored), vec!["trackX"]);
}

#[tokio::test]
async fn empty_name_never_reaches_store() {
    let store = Arc::new(MemoryStore::default());
    let mut library = signed_in(&store, "alice");

    let result = library.create_playlist("   ", "desc", vec![], true).await;

    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::EmptyPlaylistName))
    ));
    assert_eq!(store.calls(), 0);
    assert!(library.playlists().is_empty());
}

#[tokio::test]
async fn save_is_idempotent() {
    let store = Arc::new(MemoryStore::default());
    let theirs = store.seed("bob", "Theirs", Visibility::Public, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    library.save_playlist(&theirs).await.unwrap();
    library.save_playlist(&theirs).await.unwrap();

    assert_eq!(store.saves().len(), 1);
    assert!(library.is_saved(&theirs));

    library.unsave_playlist(&theirs).await.unwrap();
    library.unsave_playlist(&theirs).await.unwrap();
    assert!(store.saves().is_empty());
    assert!(!library.is_saved(&theirs));
}

#[tokio::test]
async fn saving_own_playlist_is_rejected() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Public, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    let result = library.save_playlist(&mine).await;

    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::OwnPlaylist))
    ));
    assert!(store.saves().is_empty());
}

#[tokio::test]
async fn saving_own_uncached_playlist_is_rejected_by_store() {
    let store = Arc::new(MemoryStore::default());
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    // Created after the last refresh, so the cache does not know the owner
    let mine = store.seed("alice", "Mine", Visibility::Public, &[]);
    let result = library.save_playlist(&mine).await;

    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::OwnPlaylist))
    ));
    assert!(!library.is_saved(&mine));
    assert!(store.saves().is_empty());
}

#[tokio::test]
async fn failed_save_rolls_back() {
    let store = Arc::new(MemoryStore::default());
    let theirs = store.seed("bob", "Theirs", Visibility::Public, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    store.fail_next_call();
    let result = library.save_playlist(&theirs).await;

    assert!(matches!(result, Err(EncoreError::Storage(_))));
    assert!(!library.is_saved(&theirs));
    assert!(store.saves().is_empty());
}

#[tokio::test]
async fn failed_add_and_remove_roll_back() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &["t1", "t2"]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    store.fail_next_call();
    assert!(library
        .add_track_to_playlist(&mine, test_track("t3"))
        .await
        .is_err());
    assert_eq!(ids(library.playlist(&mine).unwrap()), vec!["t1", "t2"]);

    store.fail_next_call();
    assert!(library
        .remove_track_from_playlist(&mine, &TrackId::new("t1"))
        .await
        .is_err());
    assert_eq!(ids(library.playlist(&mine).unwrap()), vec!["t1", "t2"]);

    store.fail_next_call();
    assert!(library.move_track(&mine, 0, 1).await.is_err());
    assert_eq!(ids(library.playlist(&mine).unwrap()), vec!["t1", "t2"]);
}

#[tokio::test]
async fn remove_and_move_update_cache_and_store() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &["t1", "t2", "t1", "t3"]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    library
        .remove_track_from_playlist(&mine, &TrackId::new("t1"))
        .await
        .unwrap();
    library.move_track(&mine, 1, 0).await.unwrap();

    assert_eq!(ids(library.playlist(&mine).unwrap()), vec!["t3", "t2"]);
    assert_eq!(ids(&store.stored(&mine).unwrap()), vec!["t3", "t2"]);
}

#[tokio::test]
async fn move_out_of_range_is_rejected_locally() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &["t1"]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();
    let calls = store.calls();

    let result = library.move_track(&mine, 0, 3).await;

    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::PositionOutOfRange(3)))
    ));
    assert_eq!(store.calls(), calls);
}

#[tokio::test]
async fn denied_delete_keeps_cache() {
    let store = Arc::new(MemoryStore::default());
    let theirs = store.seed("bob", "Theirs", Visibility::Public, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    let result = library.delete_playlist(&theirs).await;

    assert!(matches!(result, Err(EncoreError::PermissionDenied)));
    assert!(library.playlist(&theirs).is_some());
    assert!(store.stored(&theirs).is_some());
}

#[tokio::test]
async fn delete_removes_from_cache() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    library.delete_playlist(&mine).await.unwrap();

    assert!(library.playlist(&mine).is_none());
    assert!(store.stored(&mine).is_none());
}

#[tokio::test]
async fn failed_rename_rolls_back() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    store.fail_next_call();
    assert!(library.rename_playlist(&mine, "Renamed").await.is_err());
    assert_eq!(library.playlist(&mine).unwrap().name, "Mine");

    library.rename_playlist(&mine, "Renamed").await.unwrap();
    library.set_playlist_visibility(&mine, true).await.unwrap();
    let cached = library.playlist(&mine).unwrap();
    assert_eq!(cached.name, "Renamed");
    assert_eq!(cached.visibility, Visibility::Public);
}

#[tokio::test]
async fn update_trims_name_for_cache_and_store() {
    let store = Arc::new(MemoryStore::default());
    let mine = store.seed("alice", "Mine", Visibility::Private, &[]);
    let mut library = signed_in(&store, "alice");
    library.refresh_playlists().await.unwrap();

    library
        .update_playlist(
            &mine,
            UpdatePlaylist {
                name: Some("  Late Night  ".to_string()),
                ..UpdatePlaylist::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(library.playlist(&mine).unwrap().name, "Late Night");
    assert_eq!(store.stored(&mine).unwrap().name, "Late Night");
}
