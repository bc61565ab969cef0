//! Encore Storage
//!
//! `SQLite` implementation of the playlist store used by the playlist library.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries (`playlists`, `saves`, `tracks`)
//! - **Access Policy**: owner-only mutation is enforced here, the way a hosted
//!   store's row-level policy would, so callers see `PermissionDenied` rather
//!   than a silent no-op
//! - **Catalog Cache**: tracks handed to the store are upserted so playlists can
//!   be read back with full track data
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_core::{PlaylistStore, UserId};
//! use encore_storage::{create_pool, run_migrations, SqliteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://encore.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteStore::new(pool);
//! let user = UserId::new("user-1");
//! let playlists = store.visible_playlists(Some(&user)).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod playlists;
pub mod saves;
pub mod tracks;

pub use context::SqliteStore;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://encore.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "creating sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    tracing::info!("sqlite pool ready");

    Ok(pool)
}
