//! Error types for SQLite operations.

use tabula_core::TabulaError;
use thiserror::Error;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The connection was closed.
    #[error("Connection error: connection is closed")]
    Closed,
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<SqliteError> for TabulaError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Sqlite(e) => TabulaError::database(e.to_string()).with_source(e),
            SqliteError::Config(msg) => TabulaError::invalid_configuration(msg),
            SqliteError::Closed => TabulaError::connection("connection is closed"),
        }
    }
}
