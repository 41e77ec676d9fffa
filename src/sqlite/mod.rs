// SQLite backend: the raw primitives the emulation engine runs on, plus an
// async connection wrapper.
//
// - config: connection options and builder
// - params: normalization of bound values
// - query: result extraction and the `RawConnection` impl for rusqlite
// - connection: async connection handle
// - transaction: caller-level transactions and savepoints

pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use params::normalize_params;
pub use query::build_result_set;
pub use transaction::{Tx, begin_transaction};
