//! `RETURNING` for `SQLite` writes, emulated with a temp table and a temp trigger.
//!
//! Build a write with [`statement::insert`], [`statement::update`] or
//! [`statement::delete`], ask for the columns you want back, and run it:
//! ```rust,no_run
//! use sqlite_returning::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlReturningError> {
//! let mut conn = SqliteConnection::builder("app.db".into()).build().await?;
//! let stmt = insert("users", &["name"], &["id"])?;
//! let rs = conn.execute_statement(&stmt, &[RowValues::Text("a".into())]).await?;
//! assert_eq!(rs.results[0].get("id"), Some(&RowValues::Int(1)));
//! # Ok(())
//! # }
//! ```
//!
//! The synchronous core in [`engine`] works against any [`backend::RawConnection`];
//! [`sqlite`] provides it for `rusqlite` plus an async wrapper.

pub mod backend;
pub mod ddl;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod results;
pub mod retry;
pub mod sqlite;
pub mod statement;
pub mod types;

pub use error::SqlReturningError;
