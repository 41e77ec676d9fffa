//! Explicit transaction scope around one unit of work.
//!
//! The scope is chosen before any work runs:
//! - no transaction open on the connection: `BEGIN TRANSACTION`, finished
//!   with `END TRANSACTION` or `ROLLBACK`;
//! - a caller-level transaction already open: `SAVEPOINT`, finished with
//!   `RELEASE` or `ROLLBACK TO` + `RELEASE`, leaving the outer transaction
//!   to decide the final outcome;
//! - the opening verb failed: no control verbs at all.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::backend::{Executor, RawConnection};
use crate::error::SqlReturningError;

use super::temp::unique_name;

/// How a unit of work ended.
pub enum Outcome<T> {
    Completed(T),
    Failed(SqlReturningError),
    /// The work panicked; the payload is re-raised after rollback.
    Raised(Box<dyn Any + Send + 'static>),
}

impl<T> Outcome<T> {
    /// Run `work`, catching a panic instead of unwinding through the caller.
    pub fn capture<F>(work: F) -> Self
    where
        F: FnOnce() -> Result<T, SqlReturningError>,
    {
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(value)) => Outcome::Completed(value),
            Ok(Err(err)) => Outcome::Failed(err),
            Err(payload) => Outcome::Raised(payload),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Convert back into a `Result`, resuming a captured panic.
    ///
    /// # Errors
    /// Returns the error of a `Failed` outcome.
    pub fn into_result(self) -> Result<T, SqlReturningError> {
        match self {
            Outcome::Completed(value) => Ok(value),
            Outcome::Failed(err) => Err(err),
            Outcome::Raised(payload) => panic::resume_unwind(payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Owned,
    Savepoint(String),
    Deferred,
}

/// Run `work` inside a transaction scope opened on `exec`.
///
/// Success commits (or releases the savepoint); an error value or a panic
/// rolls back. A panic is resumed unchanged once rollback has been issued.
///
/// # Errors
/// Returns the error produced by `work`, or the commit error if committing fails.
pub fn run<C, T, F>(exec: &mut Executor<'_, C>, work: F) -> Result<T, SqlReturningError>
where
    C: RawConnection + ?Sized,
    F: FnOnce(&mut Executor<'_, C>) -> Result<T, SqlReturningError>,
{
    let scope = open_scope(exec);
    let outcome = Outcome::capture(|| work(&mut *exec));
    if outcome.is_completed() {
        commit_scope(exec, &scope)?;
    } else {
        rollback_scope(exec, &scope);
    }
    outcome.into_result()
}

fn open_scope<C: RawConnection + ?Sized>(exec: &mut Executor<'_, C>) -> Scope {
    if exec.in_transaction() {
        let name = unique_name("returning_sp");
        return match exec.exec(&format!("SAVEPOINT {name}")) {
            Ok(()) => {
                tracing::debug!(savepoint = %name, "opened savepoint inside caller transaction");
                Scope::Savepoint(name)
            }
            Err(err) => {
                tracing::debug!(error = %err, "savepoint failed; deferring to caller transaction");
                Scope::Deferred
            }
        };
    }
    match exec.exec("BEGIN TRANSACTION") {
        Ok(()) => {
            tracing::debug!("began transaction");
            Scope::Owned
        }
        Err(err) => {
            tracing::debug!(error = %err, "BEGIN failed; deferring to enclosing scope");
            Scope::Deferred
        }
    }
}

fn commit_scope<C: RawConnection + ?Sized>(
    exec: &mut Executor<'_, C>,
    scope: &Scope,
) -> Result<(), SqlReturningError> {
    match scope {
        Scope::Owned => {
            exec.exec("END TRANSACTION")?;
            tracing::debug!("committed transaction");
        }
        Scope::Savepoint(name) => {
            exec.exec(&format!("RELEASE {name}"))?;
            tracing::debug!(savepoint = %name, "released savepoint");
        }
        Scope::Deferred => {}
    }
    Ok(())
}

fn rollback_scope<C: RawConnection + ?Sized>(exec: &mut Executor<'_, C>, scope: &Scope) {
    match scope {
        Scope::Owned => {
            if let Err(err) = exec.exec("ROLLBACK") {
                tracing::warn!(error = %err, "rollback failed");
            } else {
                tracing::debug!("rolled back transaction");
            }
        }
        Scope::Savepoint(name) => {
            if let Err(err) = exec.exec(&format!("ROLLBACK TO {name}")) {
                tracing::warn!(savepoint = %name, error = %err, "rollback to savepoint failed");
            }
            if let Err(err) = exec.exec(&format!("RELEASE {name}")) {
                tracing::warn!(savepoint = %name, error = %err, "release after rollback failed");
            }
        }
        Scope::Deferred => {}
    }
}
