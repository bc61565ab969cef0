//! Integration tests for the playlists and saves slices
//!
//! Covers:
//! - CRUD with owner-only mutation
//! - Visibility of private and public playlists
//! - Track append, removal of every occurrence, and reordering
//! - Idempotent save relations, never on the owner's own playlist


use encore_core::{EncoreError, PlaylistStore, ValidationError};
use encore_core::types::*;
use test_helpers::*;

#[tokio::test]
async fn test_create_and_get_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist = encore_storage::playlists::create(
        pool,
        &owner,
        CreatePlaylist::new("Road Trip").with_description("Long drives"),
    )
    .await
    .expect("Failed to create playlist");

    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.description.as_deref(), Some("Long drives"));
    assert_eq!(playlist.owner_id, owner);
    assert_eq!(playlist.visibility, Visibility::Private);
    assert!(playlist.tracks.is_empty());

    let retrieved = encore_storage::playlists::get_by_id(pool, &playlist.id, Some(&owner))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(retrieved.id, playlist.id);
    assert_eq!(retrieved.name, "Road Trip");
}

#[tokio::test]
async fn test_create_with_initial_tracks_keeps_order() {
    let test_db = TestDb::new().await;
    let owner = UserId::new("owner");

    let playlist =
        create_test_playlist(test_db.pool(), &owner, "Mix", Visibility::Private, &["c", "a", "b"])
            .await;

    assert_eq!(track_ids(&playlist), vec!["c", "a", "b"]);
    assert_eq!(playlist.tracks[0].duration_secs, Some(180.0));
}

#[tokio::test]
async fn test_create_rejects_blank_name() {
    let test_db = TestDb::new().await;

    let result = encore_storage::playlists::create(
        test_db.pool(),
        &UserId::new("owner"),
        CreatePlaylist::new("   "),
    )
    .await;

    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::EmptyPlaylistName))
    ));
}

#[tokio::test]
async fn test_private_playlist_hidden_from_others() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");
    let other = UserId::new("other");

    let private = create_test_playlist(pool, &owner, "Secret", Visibility::Private, &[]).await;
    let public = create_test_playlist(pool, &owner, "Shared", Visibility::Public, &[]).await;

    let seen = encore_storage::playlists::get_by_id(pool, &private.id, Some(&other))
        .await
        .unwrap();
    assert!(seen.is_none());

    let anonymous = encore_storage::playlists::get_visible(pool, None).await.unwrap();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].id, public.id);

    let own = encore_storage::playlists::get_visible(pool, Some(&owner))
        .await
        .unwrap();
    assert_eq!(own.len(), 2);
}

#[tokio::test]
async fn test_update_playlist_metadata() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist = encore_storage::playlists::create(
        pool,
        &owner,
        CreatePlaylist::new("Draft").with_description("wip"),
    )
    .await
    .unwrap();

    let updated = encore_storage::playlists::update(
        pool,
        &playlist.id,
        UpdatePlaylist {
            name: Some("Final".to_string()),
            description: Some(None),
            visibility: Some(Visibility::Public),
        },
        &owner,
    )
    .await
    .expect("Failed to update playlist");

    assert_eq!(updated.name, "Final");
    assert_eq!(updated.description, None);
    assert!(updated.visibility.is_public());
    assert!(updated.updated_at >= playlist.updated_at);
}

#[tokio::test]
async fn test_non_owner_cannot_mutate() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");
    let other = UserId::new("other");

    let playlist = create_test_playlist(pool, &owner, "Mine", Visibility::Public, &["a"]).await;

    let result = encore_storage::playlists::add_track(pool, &playlist.id, &test_track("b"), &other)
        .await;
    assert!(matches!(result, Err(EncoreError::PermissionDenied)));

    let result = encore_storage::playlists::delete(pool, &playlist.id, &other).await;
    assert!(matches!(result, Err(EncoreError::PermissionDenied)));

    let still_there = encore_storage::playlists::get_by_id(pool, &playlist.id, Some(&owner))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track_ids(&still_there), vec!["a"]);
}

#[tokio::test]
async fn test_mutating_missing_playlist_is_not_found() {
    let test_db = TestDb::new().await;
    let missing = PlaylistId::new("missing");

    let result =
        encore_storage::playlists::delete(test_db.pool(), &missing, &UserId::new("owner")).await;

    assert!(matches!(result, Err(EncoreError::PlaylistNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_add_tracks_appends_in_order() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist = create_test_playlist(pool, &owner, "Queue", Visibility::Private, &[]).await;

    for id in ["one", "two", "three"] {
        encore_storage::playlists::add_track(pool, &playlist.id, &test_track(id), &owner)
            .await
            .expect("Failed to add track");
    }

    let tracks = encore_storage::playlists::get_tracks(pool, &playlist.id)
        .await
        .unwrap();
    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_add_track_refreshes_cached_metadata() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist = create_test_playlist(pool, &owner, "Mix", Visibility::Private, &["a"]).await;

    let mut renamed = test_track("a");
    renamed.title = "Renamed".to_string();
    renamed.play_count = Some(42);
    encore_storage::playlists::add_track(pool, &playlist.id, &renamed, &owner)
        .await
        .unwrap();

    let cached = encore_storage::tracks::get_by_id(pool, &TrackId::new("a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cached.title, "Renamed");
    assert_eq!(cached.play_count, Some(42));
}

#[tokio::test]
async fn test_remove_track_removes_every_occurrence() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist =
        create_test_playlist(pool, &owner, "Dupes", Visibility::Private, &["a", "b", "a", "c"])
            .await;

    encore_storage::playlists::remove_track(pool, &playlist.id, &TrackId::new("a"), &owner)
        .await
        .expect("Failed to remove track");

    let tracks = encore_storage::playlists::get_tracks(pool, &playlist.id)
        .await
        .unwrap();
    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);

    // Appending after a gap still lands at the end
    encore_storage::playlists::add_track(pool, &playlist.id, &test_track("d"), &owner)
        .await
        .unwrap();
    let tracks = encore_storage::playlists::get_tracks(pool, &playlist.id)
        .await
        .unwrap();
    assert_eq!(tracks.last().map(|t| t.id.as_str()), Some("d"));
}

#[tokio::test]
async fn test_remove_absent_track_is_error() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist = create_test_playlist(pool, &owner, "Mix", Visibility::Private, &["a"]).await;

    let result =
        encore_storage::playlists::remove_track(pool, &playlist.id, &TrackId::new("zzz"), &owner)
            .await;

    assert!(matches!(result, Err(EncoreError::TrackNotInPlaylist { .. })));
}

#[tokio::test]
async fn test_reorder_tracks() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let owner = UserId::new("owner");

    let playlist =
        create_test_playlist(pool, &owner, "Order", Visibility::Private, &["a", "b", "c", "d"])
            .await;

    encore_storage::playlists::reorder_tracks(pool, &playlist.id, 0, 2, &owner)
        .await
        .expect("Failed to reorder");

    let reordered = encore_storage::playlists::get_by_id(pool, &playlist.id, Some(&owner))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track_ids(&reordered), vec!["b", "c", "a", "d"]);

    let result = encore_storage::playlists::reorder_tracks(pool, &playlist.id, 1, 4, &owner).await;
    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::PositionOutOfRange(4)))
    ));
}

#[tokio::test]
async fn test_delete_playlist_cascades_saves() {
    let test_db = TestDb::new().await;
    let store = test_db.store();
    let owner = UserId::new("owner");
    let fan = UserId::new("fan");

    let playlist =
        create_test_playlist(test_db.pool(), &owner, "Hits", Visibility::Public, &["a"]).await;

    store.insert_save(&fan, &playlist.id).await.unwrap();
    assert_eq!(store.saved_playlists(&fan).await.unwrap().len(), 1);

    store.delete_playlist(&owner, &playlist.id).await.unwrap();

    assert!(store.get_playlist(Some(&owner), &playlist.id).await.unwrap().is_none());
    assert!(store.saved_playlists(&fan).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_is_idempotent() {
    let test_db = TestDb::new().await;
    let store = test_db.store();
    let owner = UserId::new("owner");
    let fan = UserId::new("fan");

    let playlist =
        create_test_playlist(test_db.pool(), &owner, "Hits", Visibility::Public, &[]).await;

    store.insert_save(&fan, &playlist.id).await.unwrap();
    store.insert_save(&fan, &playlist.id).await.unwrap();

    let saves = store.saved_playlists(&fan).await.unwrap();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].playlist_id, playlist.id);
    assert_eq!(saves[0].user_id, fan);

    store.delete_save(&fan, &playlist.id).await.unwrap();
    store.delete_save(&fan, &playlist.id).await.unwrap();
    assert!(store.saved_playlists(&fan).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cannot_save_invisible_playlist() {
    let test_db = TestDb::new().await;
    let store = test_db.store();
    let owner = UserId::new("owner");

    let playlist =
        create_test_playlist(test_db.pool(), &owner, "Secret", Visibility::Private, &[]).await;

    let result = store.insert_save(&UserId::new("fan"), &playlist.id).await;

    assert!(matches!(result, Err(EncoreError::PlaylistNotFound(_))));
}

#[tokio::test]
async fn test_owner_cannot_save_own_playlist() {
    let test_db = TestDb::new().await;
    let store = test_db.store();
    let owner = UserId::new("owner");

    let playlist =
        create_test_playlist(test_db.pool(), &owner, "Mine", Visibility::Public, &[]).await;

    let result = store.insert_save(&owner, &playlist.id).await;

    assert!(matches!(
        result,
        Err(EncoreError::Validation(ValidationError::OwnPlaylist))
    ));
    assert!(store.saved_playlists(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_hidden_once_playlist_goes_private() {
    let test_db = TestDb::new().await;
    let store = test_db.store();
    let owner = UserId::new("owner");
    let fan = UserId::new("fan");

    let playlist =
        create_test_playlist(test_db.pool(), &owner, "Hits", Visibility::Public, &[]).await;
    store.insert_save(&fan, &playlist.id).await.unwrap();

    store
        .update_playlist(
            &owner,
            &playlist.id,
            UpdatePlaylist {
                visibility: Some(Visibility::Private),
                ..UpdatePlaylist::default()
            },
        )
        .await
        .unwrap();

    assert!(store.saved_playlists(&fan).await.unwrap().is_empty());
}
