mod common;

use std::panic::{self, AssertUnwindSafe};

use common::{FakeConnection, Script};
use sqlite_returning::SqlReturningError;
use sqlite_returning::backend::Executor;
use sqlite_returning::engine::transaction;
use sqlite_returning::retry::RetryPolicy;

#[test]
fn success_commits_with_end_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = FakeConnection::new();
    let value = transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
        exec.exec("INSERT INTO t VALUES (1)")?;
        Ok(42)
    })?;
    assert_eq!(value, 42);
    assert_eq!(
        conn.log,
        vec!["BEGIN TRANSACTION", "INSERT INTO t VALUES (1)", "END TRANSACTION"]
    );
    Ok(())
}

#[test]
fn error_value_rolls_back_and_is_returned() {
    let mut conn = FakeConnection::new().script("INSERT", Script::Fail);
    let res: Result<(), _> =
        transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
            exec.exec("UPDATE t SET a = 1")?;
            exec.exec("INSERT INTO t VALUES (1)")?;
            exec.exec("DELETE FROM t")
        });
    assert!(matches!(res, Err(SqlReturningError::SqliteError(_))));
    assert_eq!(conn.control_verbs(), vec!["BEGIN TRANSACTION", "ROLLBACK"]);
    assert_eq!(conn.log.last().map(String::as_str), Some("ROLLBACK"));
    assert_eq!(conn.count_starting_with("DELETE"), 0);
}

#[test]
fn failed_begin_issues_no_control_verbs() {
    let mut conn = FakeConnection::new().script("BEGIN", Script::Fail);
    let ok: Result<(), _> =
        transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
            exec.exec("INSERT INTO t VALUES (1)")
        });
    assert!(ok.is_ok());
    assert_eq!(conn.log, vec!["BEGIN TRANSACTION", "INSERT INTO t VALUES (1)"]);

    let mut conn = FakeConnection::new()
        .script("BEGIN", Script::Fail)
        .script("INSERT", Script::Fail);
    let err: Result<(), _> =
        transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
            exec.exec("INSERT INTO t VALUES (1)")
        });
    assert!(err.is_err());
    assert_eq!(conn.control_verbs(), vec!["BEGIN TRANSACTION"]);
}

#[test]
fn panic_rolls_back_then_resumes() {
    let mut conn = FakeConnection::new().script("INSERT", Script::Panic);
    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), _> =
            transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
                exec.exec("INSERT INTO t VALUES (1)")
            });
    }));
    let payload = caught.expect_err("panic must propagate");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"scripted panic"));
    assert_eq!(conn.control_verbs(), vec!["BEGIN TRANSACTION", "ROLLBACK"]);
}

#[test]
fn nested_call_uses_savepoint() {
    let mut conn = FakeConnection::inside_transaction();
    transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
        exec.exec("INSERT INTO t VALUES (1)")
    })
    .unwrap();
    let verbs = conn.control_verbs();
    assert_eq!(verbs.len(), 2);
    assert!(verbs[0].starts_with("SAVEPOINT returning_sp_"));
    assert_eq!(verbs[1], verbs[0].replacen("SAVEPOINT", "RELEASE", 1));
    assert_eq!(conn.count_starting_with("BEGIN"), 0);
    assert_eq!(conn.count_starting_with("END TRANSACTION"), 0);
    assert!(conn.in_tx, "outer transaction must stay open");
}

#[test]
fn nested_failure_rolls_back_to_savepoint_only() {
    let mut conn = FakeConnection::inside_transaction().script("INSERT", Script::Fail);
    let res: Result<(), _> =
        transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |exec| {
            exec.exec("INSERT INTO t VALUES (1)")
        });
    assert!(res.is_err());
    assert_eq!(conn.count_starting_with("ROLLBACK TO returning_sp_"), 1);
    assert_eq!(conn.count_starting_with("RELEASE returning_sp_"), 1);
    assert!(!conn.log.iter().any(|s| s == "ROLLBACK"));
    assert!(conn.in_tx);
}

#[test]
fn busy_begin_is_retried_not_deferred() {
    let mut conn = FakeConnection::new().script("BEGIN", Script::Busy(2));
    transaction::run(&mut Executor::new(&mut conn, RetryPolicy::Unbounded), |_| Ok(())).unwrap();
    assert_eq!(conn.count_starting_with("BEGIN"), 3);
    assert_eq!(conn.log.last().map(String::as_str), Some("END TRANSACTION"));
}
