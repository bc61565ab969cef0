//! Catalog track cache
//!
//! Playlists reference tracks from the external catalog. The store keeps the
//! last copy it was given so playlists can be read back in full.

use encore_core::{
    error::Result,
    types::{Track, TrackId},
};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

/// Insert or refresh a cached catalog track
pub async fn upsert(conn: &mut SqliteConnection, track: &Track) -> Result<()> {
    let play_count = track.play_count.and_then(|c| i64::try_from(c).ok());

    sqlx::query(
        r#"
        INSERT INTO tracks (id, title, artist_name, artist_id, cover_url, audio_url, duration_seconds, play_count)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            artist_name = excluded.artist_name,
            artist_id = excluded.artist_id,
            cover_url = excluded.cover_url,
            audio_url = excluded.audio_url,
            duration_seconds = excluded.duration_seconds,
            play_count = excluded.play_count
        "#,
    )
    .bind(&track.id)
    .bind(&track.title)
    .bind(&track.artist_name)
    .bind(&track.artist_id)
    .bind(&track.cover_url)
    .bind(&track.audio_url)
    .bind(track.duration_secs)
    .bind(play_count)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get a cached track by ID
pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(
        r#"
        SELECT t.id AS track_id, t.title, t.artist_name, t.artist_id, t.cover_url,
               t.audio_url, t.duration_seconds, t.play_count
        FROM tracks t
        WHERE t.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Map a row selecting the track columns (`t.id` aliased as `track_id`)
pub(crate) fn from_row(row: &SqliteRow) -> Result<Track> {
    let play_count: Option<i64> = row.try_get("play_count")?;

    Ok(Track {
        id: row.try_get("track_id")?,
        title: row.try_get("title")?,
        artist_name: row.try_get("artist_name")?,
        artist_id: row.try_get("artist_id")?,
        cover_url: row.try_get("cover_url")?,
        audio_url: row.try_get("audio_url")?,
        duration_secs: row.try_get("duration_seconds")?,
        play_count: play_count.and_then(|c| u64::try_from(c).ok()),
    })
}
