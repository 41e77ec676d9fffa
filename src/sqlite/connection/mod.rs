mod core;
mod dml;
mod select;

pub(crate) use self::core::{SharedSqliteConnection, run_blocking};
pub use self::core::SqliteConnection;
