//! The raw statement primitives the emulation layer is built on.

use rusqlite::types::Value;

use crate::error::SqlReturningError;
use crate::results::ResultSet;
use crate::retry::RetryPolicy;

/// Minimal statement-execution surface of a database connection.
///
/// Implementations report contention as an error for which
/// [`SqlReturningError::is_busy`] is true; retrying is the caller's job.
pub trait RawConnection {
    /// Run SQL text without parameters or results.
    ///
    /// # Errors
    /// Returns the backend error, busy included.
    fn exec(&mut self, sql: &str) -> Result<(), SqlReturningError>;

    /// Run one statement with positional parameters, materializing any rows.
    ///
    /// # Errors
    /// Returns the backend error, busy included.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, SqlReturningError>;

    /// Whether a transaction is currently open on this connection.
    fn in_transaction(&self) -> bool;
}

/// A connection paired with the busy-retry policy applied to every call.
pub struct Executor<'c, C: RawConnection + ?Sized> {
    conn: &'c mut C,
    retry: RetryPolicy,
}

impl<'c, C: RawConnection + ?Sized> Executor<'c, C> {
    pub fn new(conn: &'c mut C, retry: RetryPolicy) -> Self {
        Self { conn, retry }
    }

    /// # Errors
    /// Returns any non-busy backend error, or busy exhaustion under a bounded policy.
    pub fn exec(&mut self, sql: &str) -> Result<(), SqlReturningError> {
        tracing::trace!(sql, "exec");
        let conn = &mut *self.conn;
        self.retry.run(|| conn.exec(sql))
    }

    /// # Errors
    /// Returns any non-busy backend error, or busy exhaustion under a bounded policy.
    pub fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, SqlReturningError> {
        tracing::trace!(sql, params = params.len(), "query");
        let conn = &mut *self.conn;
        self.retry.run(|| conn.query(sql, params))
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.conn.in_transaction()
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}
