use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A record with this patient id already exists
    #[error("Patient already exists: {0}")]
    DuplicateKey(String),

    /// Not found error
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// Database setup error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error from the JSON document backend
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document could not be read or written
    #[error("JSON document error: {0}")]
    Json(#[from] serde_json::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
