use crate::backend::Executor;
use crate::error::SqlReturningError;
use crate::results::ResultSet;
use crate::sqlite::params::normalize_params;
use crate::types::RowValues;

use super::{SqliteConnection, run_blocking};

impl SqliteConnection {
    /// Run a read query. The SQL is passed through untouched.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if preparing or executing the query fails.
    pub async fn select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlReturningError> {
        let sql_owned = query.to_owned();
        let params_owned = normalize_params(params);
        let retry = self.busy_retry;
        run_blocking(self.conn_handle(), move |guard| {
            Executor::new(guard, retry).query(&sql_owned, &params_owned)
        })
        .await
    }
}
