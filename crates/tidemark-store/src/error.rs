//! Storage error types

use thiserror::Error;

/// Errors that can occur while opening SQLite sessions
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection string could not be parsed
    #[error("Unparseable connection string: {0}")]
    InvalidUrl(String),

    /// Connection string names a dialect this store cannot open
    #[error("Unsupported SQL dialect: {0} (only sqlite is supported)")]
    UnsupportedDialect(String),
}
