use crate::{tracks, StorageError};
use chrono::{DateTime, Utc};
use encore_core::{
    error::{EncoreError, Result, ValidationError},
    types::{CreatePlaylist, Playlist, PlaylistId, Track, TrackId, UpdatePlaylist, UserId, Visibility},
};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

/// Get playlists visible to the user (owned + public), newest first
///
/// Anonymous callers (`None`) see public playlists only.
pub async fn get_visible(pool: &SqlitePool, user_id: Option<&UserId>) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(
        r#"
        SELECT p.id, p.name, p.description, p.owner_id, p.visibility, p.created_at, p.updated_at
        FROM playlists p
        WHERE p.visibility = 'public' OR p.owner_id = ?
        ORDER BY p.updated_at DESC, p.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut playlists = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut playlist = from_row(row)?;
        playlist.tracks = get_tracks(pool, &playlist.id).await?;
        playlists.push(playlist);
    }

    Ok(playlists)
}

/// Get playlist by ID with its tracks (with visibility check)
pub async fn get_by_id(
    pool: &SqlitePool,
    id: &PlaylistId,
    user_id: Option<&UserId>,
) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        r#"
        SELECT p.id, p.name, p.description, p.owner_id, p.visibility, p.created_at, p.updated_at
        FROM playlists p
        WHERE p.id = ? AND (p.visibility = 'public' OR p.owner_id = ?)
        LIMIT 1
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut playlist = from_row(&row)?;
    playlist.tracks = get_tracks(pool, id).await?;

    Ok(Some(playlist))
}

/// Get the tracks of a playlist in position order
pub async fn get_tracks(pool: &SqlitePool, id: &PlaylistId) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id AS track_id, t.title, t.artist_name, t.artist_id, t.cover_url,
               t.audio_url, t.duration_seconds, t.play_count
        FROM playlist_tracks pt
        INNER JOIN tracks t ON pt.track_id = t.id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(tracks::from_row).collect()
}

/// Create new playlist owned by `owner_id`
pub async fn create(
    pool: &SqlitePool,
    owner_id: &UserId,
    playlist: CreatePlaylist,
) -> Result<Playlist> {
    let name = validated_name(&playlist.name)?;
    let id = PlaylistId::generate();
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO playlists (id, name, description, owner_id, visibility, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(&playlist.description)
    .bind(owner_id)
    .bind(playlist.visibility.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for (position, track) in playlist.tracks.iter().enumerate() {
        tracks::upsert(&mut tx, track).await?;
        insert_entry(&mut tx, &id, position as i64, &track.id, now).await?;
    }

    tx.commit().await?;

    tracing::debug!(playlist_id = %id, owner_id = %owner_id, "playlist created");

    get_by_id(pool, &id, Some(owner_id))
        .await?
        .ok_or_else(|| EncoreError::storage("Failed to retrieve created playlist"))
}

/// Update playlist metadata (owner only)
pub async fn update(
    pool: &SqlitePool,
    id: &PlaylistId,
    update: UpdatePlaylist,
    user_id: &UserId,
) -> Result<Playlist> {
    let mut tx = pool.begin().await?;
    require_owner(&mut tx, id, user_id).await?;

    if let Some(name) = &update.name {
        let name = validated_name(name)?;
        sqlx::query("UPDATE playlists SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(description) = &update.description {
        sqlx::query("UPDATE playlists SET description = ? WHERE id = ?")
            .bind(description)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(visibility) = update.visibility {
        sqlx::query("UPDATE playlists SET visibility = ? WHERE id = ?")
            .bind(visibility.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    touch(&mut tx, id).await?;
    tx.commit().await?;

    get_by_id(pool, id, Some(user_id))
        .await?
        .ok_or_else(|| EncoreError::PlaylistNotFound(id.clone()))
}

/// Delete playlist (owner only); entries and save relations cascade
pub async fn delete(pool: &SqlitePool, id: &PlaylistId, user_id: &UserId) -> Result<()> {
    let mut tx = pool.begin().await?;
    require_owner(&mut tx, id, user_id).await?;

    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Append track to the end of the playlist
pub async fn add_track(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    track: &Track,
    user_id: &UserId,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    require_owner(&mut tx, playlist_id, user_id).await?;

    tracks::upsert(&mut tx, track).await?;

    let next_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_tracks WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_one(&mut *tx)
    .await?;

    insert_entry(&mut tx, playlist_id, next_position, &track.id, Utc::now()).await?;
    touch(&mut tx, playlist_id).await?;

    tx.commit().await?;
    Ok(())
}

/// Remove every entry of a track; the remaining entries keep their positions
pub async fn remove_track(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    track_id: &TrackId,
    user_id: &UserId,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    require_owner(&mut tx, playlist_id, user_id).await?;

    let result = sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
        .bind(playlist_id)
        .bind(track_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(EncoreError::TrackNotInPlaylist {
            playlist_id: playlist_id.clone(),
            track_id: track_id.clone(),
        });
    }

    touch(&mut tx, playlist_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Move the entry at index `from` to index `to`
///
/// Positions are compacted to `0..n` as part of the move.
pub async fn reorder_tracks(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    from: usize,
    to: usize,
    user_id: &UserId,
) -> Result<()> {
    let mut tx = pool.begin().await?;
    require_owner(&mut tx, playlist_id, user_id).await?;

    let rows = sqlx::query(
        "SELECT track_id, added_at FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(&mut *tx)
    .await?;

    let mut entries = rows
        .iter()
        .map(|row| -> Result<(TrackId, DateTime<Utc>)> {
            Ok((row.try_get("track_id")?, row.try_get("added_at")?))
        })
        .collect::<Result<Vec<_>>>()?;

    if from >= entries.len() {
        return Err(ValidationError::PositionOutOfRange(from).into());
    }
    if to >= entries.len() {
        return Err(ValidationError::PositionOutOfRange(to).into());
    }
    if from == to {
        return Ok(());
    }

    let entry = entries.remove(from);
    entries.insert(to, entry);

    sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ?")
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    for (position, (track_id, added_at)) in entries.iter().enumerate() {
        insert_entry(&mut tx, playlist_id, position as i64, track_id, *added_at).await?;
    }

    touch(&mut tx, playlist_id).await?;
    tx.commit().await?;
    Ok(())
}

// Helper functions

fn validated_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyPlaylistName.into());
    }
    Ok(name)
}

fn from_row(row: &SqliteRow) -> Result<Playlist> {
    let visibility: String = row.try_get("visibility")?;
    let visibility = visibility
        .parse::<Visibility>()
        .map_err(|reason| StorageError::corrupt("playlists", reason))?;

    Ok(Playlist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        owner_id: row.try_get("owner_id")?,
        visibility,
        tracks: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Fail unless `user_id` owns the playlist
pub(crate) async fn require_owner(
    conn: &mut SqliteConnection,
    id: &PlaylistId,
    user_id: &UserId,
) -> Result<()> {
    let owner: Option<UserId> = sqlx::query_scalar("SELECT owner_id FROM playlists WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match owner {
        Some(owner) if &owner == user_id => Ok(()),
        Some(_) => Err(EncoreError::PermissionDenied),
        None => Err(EncoreError::PlaylistNotFound(id.clone())),
    }
}

async fn insert_entry(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    position: i64,
    track_id: &TrackId,
    added_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO playlist_tracks (playlist_id, position, track_id, added_at) VALUES (?, ?, ?, ?)",
    )
    .bind(playlist_id)
    .bind(position)
    .bind(track_id)
    .bind(added_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn touch(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<()> {
    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
