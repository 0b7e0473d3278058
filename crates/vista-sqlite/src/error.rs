//! Error types for the SQLite provider

use thiserror::Error;
use vista_query::ProviderError;

/// SQLite provider error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Blocking task failed to complete
    #[error("Pool error: {0}")]
    Pool(String),

    /// The awaiting caller went away before the statement finished
    #[error("query cancelled")]
    Cancelled,

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for ProviderError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Rusqlite(e) => Self::Execute(e.to_string()),
            other => Self::Execute(other.to_string()),
        }
    }
}
