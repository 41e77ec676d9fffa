use thiserror::Error;

use crate::statement::Operation;

#[derive(Debug, Error)]
pub enum SqlReturningError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// A returning marker could not be decoded, or a returning identifier
    /// could not be carried in one.
    #[error("Malformed returning marker: {0}")]
    MarkerFormat(String),

    #[error("Returning emulation for {operation} on {table} ({columns}) failed: {source}")]
    Returning {
        operation: Operation,
        table: String,
        columns: String,
        #[source]
        source: Box<SqlReturningError>,
    },

    #[error("Database still busy after {attempts} attempts")]
    BusyRetriesExhausted { attempts: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlReturningError {
    /// True when the backend reported `SQLITE_BUSY`.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SqlReturningError::SqliteError(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::DatabaseBusy
        )
    }

    /// Strip any emulation context and return the underlying error.
    #[must_use]
    pub fn root_cause(&self) -> &SqlReturningError {
        match self {
            SqlReturningError::Returning { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Build the error SQLite reports when another writer holds the lock.
    #[must_use]
    pub fn busy() -> Self {
        SqlReturningError::SqliteError(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::DatabaseBusy,
                extended_code: rusqlite::ffi::SQLITE_BUSY,
            },
            None,
        ))
    }
}

impl From<serde_json::Error> for SqlReturningError {
    fn from(err: serde_json::Error) -> Self {
        SqlReturningError::ConfigError(err.to_string())
    }
}
