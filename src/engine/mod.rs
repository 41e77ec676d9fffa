//! Entry points that run a statement, emulating `RETURNING` when asked to.
//!
//! A write with returning columns runs as:
//! `BEGIN` → create temp table → create capture trigger → the write →
//! drop trigger → `SELECT` from the temp table → drop temp table → commit.
//! Anything else is executed directly. Every statement goes through the
//! busy-retry policy of the [`Executor`].

pub mod temp;
pub mod transaction;

use rusqlite::types::Value;

use crate::backend::{Executor, RawConnection};
use crate::error::SqlReturningError;
use crate::results::ResultSet;
use crate::retry::{ExecOptions, RetryPolicy};
use crate::sqlite::params::normalize_params;
use crate::statement::{Returning, Statement, marker, quote_identifier};
use crate::types::RowValues;

pub use temp::{with_temp_table, with_temp_trigger};
pub use transaction::Outcome;

/// Execute SQL text that may carry a returning marker.
///
/// # Errors
/// Returns `SqlReturningError::MarkerFormat` for a malformed marker,
/// `SqlReturningError::Returning` wrapping the backend error when an emulated
/// call fails, or the backend error itself on the direct path.
pub fn execute<C>(
    conn: &mut C,
    sql: &str,
    params: &[RowValues],
    options: ExecOptions,
    default_retry: RetryPolicy,
) -> Result<ResultSet, SqlReturningError>
where
    C: RawConnection + ?Sized,
{
    let params = normalize_params(params);
    let mut exec = Executor::new(conn, options.resolve_retry(default_retry));
    if marker::has_marker(sql) {
        let (real_sql, tail) = marker::split(sql)?;
        let returning = marker::parse(tail)?;
        return execute_returning(&mut exec, real_sql, &returning, &params);
    }
    exec.query(sql, &params)
}

/// Execute a builder-produced statement without going through the text marker.
///
/// # Errors
/// Same as [`execute`], minus marker errors.
pub fn execute_statement<C>(
    conn: &mut C,
    statement: &Statement,
    params: &[RowValues],
    options: ExecOptions,
    default_retry: RetryPolicy,
) -> Result<ResultSet, SqlReturningError>
where
    C: RawConnection + ?Sized,
{
    let params = normalize_params(params);
    let mut exec = Executor::new(conn, options.resolve_retry(default_retry));
    match statement.returning() {
        Some(returning) => execute_returning(&mut exec, statement.sql(), returning, &params),
        None => exec.query(statement.sql(), &params),
    }
}

/// Run `sql` and return the requested columns of every row it touched.
///
/// # Errors
/// Returns `SqlReturningError::Returning` carrying the operation, table and
/// columns, with the failing backend error as its source.
pub fn execute_returning<C>(
    exec: &mut Executor<'_, C>,
    sql: &str,
    returning: &Returning,
    params: &[Value],
) -> Result<ResultSet, SqlReturningError>
where
    C: RawConnection + ?Sized,
{
    tracing::debug!(
        operation = %returning.operation(),
        table = returning.table(),
        columns = ?returning.columns(),
        "emulating returning clause"
    );
    transaction::run(exec, |exec| {
        with_temp_table(exec, returning.columns(), |exec, temp_table| {
            with_temp_trigger(exec, returning, temp_table, |exec| exec.query(sql, params))?;
            let fields = returning
                .columns()
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            exec.query(&format!("SELECT {fields} FROM {temp_table}"), &[])
        })
    })
    .map_err(|err| SqlReturningError::Returning {
        operation: returning.operation(),
        table: returning.table().to_owned(),
        columns: returning.columns().join(", "),
        source: Box::new(err),
    })
}
