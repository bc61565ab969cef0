/// Storage-specific errors
use thiserror::Error;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Stored value could not be mapped back to a domain type
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a corrupt row error
    pub fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for encore_core::EncoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Database(e) => encore_core::EncoreError::Database(e.to_string()),
            other => encore_core::EncoreError::storage(other.to_string()),
        }
    }
}
