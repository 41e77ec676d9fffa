use crate::backend::Executor;
use crate::ddl::{self, DdlCommand, RawDdl};
use crate::engine;
use crate::error::SqlReturningError;
use crate::results::ResultSet;
use crate::retry::ExecOptions;
use crate::statement::Statement;
use crate::types::RowValues;

use super::{SqliteConnection, run_blocking};

impl SqliteConnection {
    /// Execute SQL text; a returning marker switches to the emulated path.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the statement fails or the marker is malformed.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlReturningError> {
        self.execute_with(sql, params, ExecOptions::default()).await
    }

    /// [`execute`](Self::execute) with per-call options.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the statement fails or the marker is malformed.
    pub async fn execute_with(
        &mut self,
        sql: &str,
        params: &[RowValues],
        options: ExecOptions,
    ) -> Result<ResultSet, SqlReturningError> {
        let sql_owned = sql.to_owned();
        let params_owned = params.to_vec();
        let default_retry = self.busy_retry;
        run_blocking(self.conn_handle(), move |guard| {
            engine::execute(guard, &sql_owned, &params_owned, options, default_retry)
        })
        .await
    }

    /// Execute a builder-produced statement, returning its requested columns.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the statement fails.
    pub async fn execute_statement(
        &mut self,
        statement: &Statement,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlReturningError> {
        let statement = statement.clone();
        let params_owned = params.to_vec();
        let default_retry = self.busy_retry;
        run_blocking(self.conn_handle(), move |guard| {
            engine::execute_statement(
                guard,
                &statement,
                &params_owned,
                ExecOptions::default(),
                default_retry,
            )
        })
        .await
    }

    /// Execute a batch of statements; wraps in a transaction when not already inside one.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if executing the batch fails.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlReturningError> {
        let sql_owned = sql.to_owned();
        let retry = self.busy_retry;
        run_blocking(self.conn_handle(), move |guard| {
            let mut exec = Executor::new(guard, retry);
            engine::transaction::run(&mut exec, |exec| exec.exec(&sql_owned))
        })
        .await
    }

    /// Apply a schema change.
    ///
    /// # Errors
    /// Returns the first failing statement's error.
    pub async fn execute_ddl(&mut self, command: &dyn DdlCommand) -> Result<(), SqlReturningError> {
        let ddl = RawDdl::capture(command);
        let retry = self.busy_retry;
        run_blocking(self.conn_handle(), move |guard| {
            ddl::execute_ddl(&mut Executor::new(guard, retry), &ddl)
        })
        .await
    }

    /// Check whether the object a schema change describes already exists.
    ///
    /// # Errors
    /// Returns `SqlReturningError` if the existence query fails.
    pub async fn ddl_exists(&mut self, command: &dyn DdlCommand) -> Result<bool, SqlReturningError> {
        let ddl = RawDdl::capture(command);
        let retry = self.busy_retry;
        run_blocking(self.conn_handle(), move |guard| {
            ddl::ddl_exists(&mut Executor::new(guard, retry), &ddl)
        })
        .await
    }
}
