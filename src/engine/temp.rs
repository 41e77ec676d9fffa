//! Scoped temp table and capture trigger for one emulated call.
//!
//! Both objects are dropped as soon as the body returns, whatever it
//! returned. A panicking body skips the drop; the enclosing transaction's
//! rollback reclaims the objects instead.

use crate::backend::{Executor, RawConnection};
use crate::error::SqlReturningError;
use crate::statement::{Returning, quote_identifier};

/// `prefix` plus a random hex suffix, safe to use unquoted.
pub(crate) fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{:016x}", rand::random::<u64>())
}

/// Create a temp table with `columns`, run `body` with its name, then drop it.
///
/// # Errors
/// Returns the creation error without running `body`, otherwise `body`'s
/// error. If `body` succeeded but the drop fails, the drop error is returned.
pub fn with_temp_table<C, T, F>(
    exec: &mut Executor<'_, C>,
    columns: &[String],
    body: F,
) -> Result<T, SqlReturningError>
where
    C: RawConnection + ?Sized,
    F: FnOnce(&mut Executor<'_, C>, &str) -> Result<T, SqlReturningError>,
{
    let name = unique_name("returning_tmp");
    let cols = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    exec.exec(&format!("CREATE TEMP TABLE {name} ({cols})"))?;
    tracing::debug!(temp_table = %name, "created temp table");

    let result = body(exec, &name);
    let dropped = exec.exec(&format!("DROP TABLE IF EXISTS {name}"));
    finish(result, dropped, "temp table", &name)
}

/// Attach a temp `AFTER <operation>` trigger to the target table that copies
/// the requested columns of each affected row into `temp_table`, run `body`,
/// then drop the trigger.
///
/// # Errors
/// Same contract as [`with_temp_table`].
pub fn with_temp_trigger<C, T, F>(
    exec: &mut Executor<'_, C>,
    returning: &Returning,
    temp_table: &str,
    body: F,
) -> Result<T, SqlReturningError>
where
    C: RawConnection + ?Sized,
    F: FnOnce(&mut Executor<'_, C>) -> Result<T, SqlReturningError>,
{
    let name = unique_name("returning_trg");
    let row_ref = returning.row_reference().keyword();
    let values = returning
        .columns()
        .iter()
        .map(|c| format!("{row_ref}.{}", quote_identifier(c)))
        .collect::<Vec<_>>()
        .join(", ");
    exec.exec(&format!(
        "CREATE TEMP TRIGGER {name} AFTER {} ON main.{} BEGIN INSERT INTO {temp_table} SELECT {values}; END;",
        returning.operation(),
        quote_identifier(returning.table()),
    ))?;
    tracing::debug!(
        trigger = %name,
        table = returning.table(),
        operation = %returning.operation(),
        "created capture trigger"
    );

    let result = body(exec);
    let dropped = exec.exec(&format!("DROP TRIGGER IF EXISTS {name}"));
    finish(result, dropped, "capture trigger", &name)
}

fn finish<T>(
    result: Result<T, SqlReturningError>,
    dropped: Result<(), SqlReturningError>,
    kind: &str,
    name: &str,
) -> Result<T, SqlReturningError> {
    match (result, dropped) {
        (result, Ok(())) => {
            tracing::debug!(object = name, "dropped {kind}");
            result
        }
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Err(drop_err)) => {
            tracing::warn!(object = name, error = %drop_err, "failed to drop {kind}");
            Err(err)
        }
    }
}
