//! Save relation between a user and someone else's playlist

use chrono::Utc;
use encore_core::{
    error::{EncoreError, Result, ValidationError},
    types::{PlaylistId, SaveRelation, UserId},
};
use sqlx::{Row, SqlitePool};

/// Record a save; saving an already-saved playlist is a no-op
///
/// The playlist must be visible to the user and owned by someone else.
pub async fn insert(pool: &SqlitePool, user_id: &UserId, playlist_id: &PlaylistId) -> Result<()> {
    let mut tx = pool.begin().await?;

    let owner_id: Option<String> = sqlx::query_scalar(
        "SELECT owner_id FROM playlists WHERE id = ? AND (visibility = 'public' OR owner_id = ?)",
    )
    .bind(playlist_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(owner_id) = owner_id else {
        return Err(EncoreError::PlaylistNotFound(playlist_id.clone()));
    };
    if owner_id == user_id.as_str() {
        return Err(ValidationError::OwnPlaylist.into());
    }

    sqlx::query(
        r#"
        INSERT INTO saved_playlists (user_id, playlist_id, saved_at)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id, playlist_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(playlist_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Drop a save; dropping an absent save is a no-op
pub async fn delete(pool: &SqlitePool, user_id: &UserId, playlist_id: &PlaylistId) -> Result<()> {
    sqlx::query("DELETE FROM saved_playlists WHERE user_id = ? AND playlist_id = ?")
        .bind(user_id)
        .bind(playlist_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Saves of a user, most recent first
///
/// Saves pointing at playlists that have since gone private are skipped.
pub async fn get_by_user(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<SaveRelation>> {
    let rows = sqlx::query(
        r#"
        SELECT s.user_id, s.playlist_id, s.saved_at
        FROM saved_playlists s
        INNER JOIN playlists p ON s.playlist_id = p.id
        WHERE s.user_id = ? AND (p.visibility = 'public' OR p.owner_id = s.user_id)
        ORDER BY s.saved_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(SaveRelation {
                user_id: row.try_get("user_id")?,
                playlist_id: row.try_get("playlist_id")?,
                saved_at: row.try_get("saved_at")?,
            })
        })
        .collect()
}
