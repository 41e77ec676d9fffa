use crate::backend::Executor;
use crate::error::SqlReturningError;
use crate::results::ResultSet;
use crate::retry::ExecOptions;
use crate::sqlite::params::normalize_params;
use crate::statement::{Statement, quote_identifier};
use crate::types::RowValues;

use super::connection::{SharedSqliteConnection, SqliteConnection, run_blocking};

/// Caller-level transaction that owns the `SQLite` connection until completion.
///
/// Emulated returning calls made through a `Tx` run inside a savepoint, so a
/// failed call undoes only its own changes and leaves the transaction open.
/// Dropping an unfinished `Tx` rolls it back.
pub struct Tx {
    conn: Option<SqliteConnection>,
}

/// Begin a transaction, consuming the connection until commit/rollback.
///
/// # Errors
/// Returns `SqlReturningError` if `BEGIN` fails.
pub async fn begin_transaction(conn: SqliteConnection) -> Result<Tx, SqlReturningError> {
    let retry = conn.busy_retry;
    run_blocking(conn.conn_handle(), move |guard| {
        Executor::new(guard, retry).exec("BEGIN")
    })
    .await?;
    tracing::debug!("caller transaction started");
    Ok(Tx { conn: Some(conn) })
}

impl SqliteConnection {
    /// Begin a caller-level transaction.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if `BEGIN` fails.
    pub async fn begin(self) -> Result<Tx, SqlReturningError> {
        begin_transaction(self).await
    }
}

impl Tx {
    fn conn_mut(&mut self) -> Result<&mut SqliteConnection, SqlReturningError> {
        self.conn.as_mut().ok_or_else(|| {
            SqlReturningError::ExecutionError("SQLite transaction already completed".into())
        })
    }

    /// Execute SQL text inside the transaction; markers are honored.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the statement fails.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlReturningError> {
        self.conn_mut()?.execute(sql, params).await
    }

    /// # Errors
    /// Returns `SqlReturningError` if the statement fails.
    pub async fn execute_with(
        &mut self,
        sql: &str,
        params: &[RowValues],
        options: ExecOptions,
    ) -> Result<ResultSet, SqlReturningError> {
        self.conn_mut()?.execute_with(sql, params, options).await
    }

    /// # Errors
    /// Returns `SqlReturningError` if the statement fails.
    pub async fn execute_statement(
        &mut self,
        statement: &Statement,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlReturningError> {
        self.conn_mut()?.execute_statement(statement, params).await
    }

    /// # Errors
    /// Returns `SqlReturningError` if the query fails.
    pub async fn select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlReturningError> {
        let conn = self.conn_mut()?;
        let sql_owned = query.to_owned();
        let params_owned = normalize_params(params);
        let retry = conn.busy_retry;
        run_blocking(conn.conn_handle(), move |guard| {
            Executor::new(guard, retry).query(&sql_owned, &params_owned)
        })
        .await
    }

    /// # Errors
    /// Returns `SqlReturningError` if the savepoint cannot be created.
    pub async fn savepoint(&mut self, name: &str) -> Result<(), SqlReturningError> {
        self.control(format!("SAVEPOINT {}", quote_identifier(name))).await
    }

    /// # Errors
    /// Returns `SqlReturningError` if the savepoint does not exist.
    pub async fn rollback_to(&mut self, name: &str) -> Result<(), SqlReturningError> {
        self.control(format!("ROLLBACK TO {}", quote_identifier(name))).await
    }

    /// # Errors
    /// Returns `SqlReturningError` if the savepoint does not exist.
    pub async fn release(&mut self, name: &str) -> Result<(), SqlReturningError> {
        self.control(format!("RELEASE {}", quote_identifier(name))).await
    }

    /// Commit and hand the connection back.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if committing fails; the transaction is
    /// rolled back when the `Tx` is dropped.
    pub async fn commit(mut self) -> Result<SqliteConnection, SqlReturningError> {
        self.control("COMMIT".to_string()).await?;
        tracing::debug!("caller transaction committed");
        self.take_conn()
    }

    /// Roll back and hand the connection back.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if rolling back fails.
    pub async fn rollback(mut self) -> Result<SqliteConnection, SqlReturningError> {
        self.control("ROLLBACK".to_string()).await?;
        tracing::debug!("caller transaction rolled back");
        self.take_conn()
    }

    async fn control(&mut self, sql: String) -> Result<(), SqlReturningError> {
        let conn = self.conn_mut()?;
        let retry = conn.busy_retry;
        run_blocking(conn.conn_handle(), move |guard| {
            Executor::new(guard, retry).exec(&sql)
        })
        .await
    }

    fn take_conn(&mut self) -> Result<SqliteConnection, SqlReturningError> {
        self.conn.take().ok_or_else(|| {
            SqlReturningError::ExecutionError("SQLite transaction already completed".into())
        })
    }
}

fn rollback_abandoned(handle: &SharedSqliteConnection) {
    if let Ok(guard) = handle.try_lock()
        && !guard.is_autocommit()
        && let Err(err) = guard.execute_batch("ROLLBACK")
    {
        tracing::warn!(error = %err, "rollback of abandoned transaction failed");
    }
}

impl Drop for Tx {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let handle = conn.conn_handle();
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            rt.spawn_blocking(move || {
                let guard = handle.blocking_lock();
                if !guard.is_autocommit()
                    && let Err(err) = guard.execute_batch("ROLLBACK")
                {
                    tracing::warn!(error = %err, "rollback of abandoned transaction failed");
                }
                drop(guard);
                drop(conn);
            });
        } else {
            rollback_abandoned(&handle);
        }
    }
}
