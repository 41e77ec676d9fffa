use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::SqlReturningError;
use crate::retry::RetryPolicy;
use crate::sqlite::config::{SqliteOptions, SqliteOptionsBuilder};

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// Async handle to a single `SQLite` connection.
///
/// Each call runs on the blocking pool and holds the connection for its whole
/// duration, so the statements of one emulated call are never interleaved
/// with another call on the same connection.
pub struct SqliteConnection {
    pub(crate) conn: SharedSqliteConnection,
    pub(crate) busy_retry: RetryPolicy,
}

impl SqliteConnection {
    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Open a connection and apply the configured pragmas.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the database cannot be opened or configured.
    pub async fn open(opts: SqliteOptions) -> Result<Self, SqlReturningError> {
        let SqliteOptions {
            db_path,
            busy_retry,
            busy_timeout_ms,
            wal,
        } = opts;
        let conn = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(|e| {
                SqlReturningError::ConnectionError(format!("failed to open {db_path}: {e}"))
            })?;
            if let Some(ms) = busy_timeout_ms {
                conn.busy_timeout(Duration::from_millis(ms))?;
            }
            if wal {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            tracing::debug!(db_path = %db_path, wal, "opened sqlite connection");
            Ok::<_, SqlReturningError>(conn)
        })
        .await
        .map_err(|e| SqlReturningError::ConnectionError(format!("sqlite open join error: {e}")))??;

        Ok(Self::from_rusqlite(conn, busy_retry))
    }

    /// Wrap an already-open `rusqlite` connection.
    #[must_use]
    pub fn from_rusqlite(conn: rusqlite::Connection, busy_retry: RetryPolicy) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            busy_retry,
        }
    }

    #[must_use]
    pub fn busy_retry(&self) -> RetryPolicy {
        self.busy_retry
    }

    /// Run a closure against the raw `rusqlite` connection on the blocking pool.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or `ExecutionError` if the task fails to join.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlReturningError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlReturningError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(self.conn_handle(), func).await
    }

    pub(crate) fn conn_handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("busy_retry", &self.busy_retry)
            .finish_non_exhaustive()
    }
}

/// Run `func` on the blocking pool with the connection locked.
///
/// A panic inside `func` is resumed on the calling task unchanged.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlReturningError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlReturningError> + Send + 'static,
    R: Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await;
    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(SqlReturningError::ExecutionError(format!(
            "sqlite spawn_blocking join error: {e}"
        ))),
    }
}
