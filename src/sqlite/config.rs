use serde::{Deserialize, Serialize};

use crate::error::SqlReturningError;
use crate::retry::RetryPolicy;

use super::connection::SqliteConnection;

/// Options for opening a `SQLite` connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Policy applied when a statement reports `SQLITE_BUSY`.
    pub busy_retry: RetryPolicy,
    /// `SQLite`'s own busy handler timeout; `None` keeps the driver default.
    pub busy_timeout_ms: Option<u64>,
    pub wal: bool,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            busy_retry: RetryPolicy::default(),
            busy_timeout_ms: None,
            wal: false,
        }
    }
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            ..Self::default()
        }
    }

    /// Parse options from a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `SqlReturningError::ConfigError` if the document is not valid.
    pub fn from_json(json: &str) -> Result<Self, SqlReturningError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn busy_retry(mut self, policy: RetryPolicy) -> Self {
        self.opts.busy_retry = policy;
        self
    }

    #[must_use]
    pub fn busy_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.opts.busy_timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a connection with the configured options.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the database cannot be opened or configured.
    pub async fn build(self) -> Result<SqliteConnection, SqlReturningError> {
        SqliteConnection::open(self.finish()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_defaults() {
        let opts = SqliteOptions::from_json(
            r#"{"db_path": "app.db", "busy_retry": {"mode": "bounded", "max_retries": 5, "backoff_ms": 20}}"#,
        )
        .unwrap();
        assert_eq!(opts.db_path, "app.db");
        assert_eq!(
            opts.busy_retry,
            RetryPolicy::Bounded {
                max_retries: 5,
                backoff_ms: 20
            }
        );
        assert_eq!(opts.busy_timeout_ms, None);
        assert!(!opts.wal);
    }

    #[test]
    fn rejects_unknown_retry_mode() {
        let err = SqliteOptions::from_json(r#"{"busy_retry": {"mode": "sometimes"}}"#).unwrap_err();
        assert!(matches!(err, SqlReturningError::ConfigError(_)));
    }
}
