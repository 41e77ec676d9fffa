#![allow(dead_code)]

use std::collections::VecDeque;

use rusqlite::types::Value;
use sqlite_returning::backend::RawConnection;
use sqlite_returning::results::ResultSet;
use sqlite_returning::SqlReturningError;

/// Scripted reaction to a statement whose text starts with a given prefix.
pub enum Script {
    /// Report busy this many times, then behave normally.
    Busy(u32),
    /// Fail with a non-busy backend error every time.
    Fail,
    /// Panic the first time.
    Panic,
}

/// In-memory stand-in for a database connection that records every statement.
#[derive(Default)]
pub struct FakeConnection {
    pub log: Vec<String>,
    pub in_tx: bool,
    scripts: Vec<(String, Script)>,
    results: VecDeque<ResultSet>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection that reports a caller-level transaction already open.
    pub fn inside_transaction() -> Self {
        Self {
            in_tx: true,
            ..Self::default()
        }
    }

    pub fn script(mut self, prefix: &str, script: Script) -> Self {
        self.scripts.push((prefix.to_string(), script));
        self
    }

    /// Queue a result for the next `query` call that produces rows.
    pub fn with_result(mut self, rs: ResultSet) -> Self {
        self.results.push_back(rs);
        self
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.log.iter().filter(|s| s.starts_with(prefix)).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.log.iter().position(|s| s.starts_with(prefix))
    }

    /// Transaction control verbs in the order they were issued.
    pub fn control_verbs(&self) -> Vec<String> {
        const VERBS: [&str; 6] = [
            "BEGIN",
            "END TRANSACTION",
            "ROLLBACK",
            "SAVEPOINT",
            "RELEASE",
            "COMMIT",
        ];
        self.log
            .iter()
            .filter(|s| VERBS.iter().any(|v| s.starts_with(v)))
            .cloned()
            .collect()
    }

    fn run(&mut self, sql: &str) -> Result<(), SqlReturningError> {
        self.log.push(sql.to_string());
        let mut panic_now = false;
        for (prefix, script) in &mut self.scripts {
            if !sql.starts_with(prefix.as_str()) {
                continue;
            }
            match script {
                Script::Busy(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    return Err(SqlReturningError::busy());
                }
                Script::Busy(_) => {}
                Script::Fail => {
                    return Err(SqlReturningError::SqliteError(
                        rusqlite::Error::SqliteFailure(
                            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
                            Some(format!("scripted failure for {prefix}")),
                        ),
                    ));
                }
                Script::Panic => panic_now = true,
            }
        }
        if panic_now {
            self.scripts
                .retain(|(p, s)| !(sql.starts_with(p.as_str()) && matches!(s, Script::Panic)));
            panic!("scripted panic");
        }
        match sql {
            s if s.starts_with("BEGIN") || s.starts_with("SAVEPOINT") => self.in_tx = true,
            s if s.starts_with("END TRANSACTION")
                || s.starts_with("COMMIT")
                || s == "ROLLBACK" =>
            {
                self.in_tx = false
            }
            _ => {}
        }
        Ok(())
    }
}

impl RawConnection for FakeConnection {
    fn exec(&mut self, sql: &str) -> Result<(), SqlReturningError> {
        self.run(sql)
    }

    fn query(&mut self, sql: &str, _params: &[Value]) -> Result<ResultSet, SqlReturningError> {
        self.run(sql)?;
        if sql.starts_with("SELECT") {
            Ok(self.results.pop_front().unwrap_or_default())
        } else {
            Ok(ResultSet::affected(1))
        }
    }

    fn in_transaction(&self) -> bool {
        self.in_tx
    }
}

/// Names of temp tables and triggers currently on a real connection.
pub fn temp_objects(conn: &rusqlite::Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_temp_master WHERE type IN ('table', 'trigger')")
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}
