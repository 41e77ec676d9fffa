//! Convenient imports for common functionality.

pub use crate::backend::{Executor, RawConnection};
pub use crate::ddl::{ColumnDef, CreateTable, DdlCommand, DropTable, RawDdl};
pub use crate::error::SqlReturningError;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::retry::{ExecOptions, RetryPolicy};
pub use crate::sqlite::{SqliteConnection, SqliteOptions, SqliteOptionsBuilder, Tx};
pub use crate::statement::{Operation, Returning, RowReference, Statement, delete, insert, update};
pub use crate::types::RowValues;
