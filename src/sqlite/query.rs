use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Statement, ToSql};

use crate::backend::RawConnection;
use crate::error::SqlReturningError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns `SqlReturningError` if the value cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlReturningError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a prepared statement and collect its rows.
///
/// # Errors
/// Returns `SqlReturningError` if execution or value extraction fails.
pub fn build_result_set(
    stmt: &mut Statement,
    params: &[Value],
) -> Result<ResultSet, SqlReturningError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt.query(&param_refs[..])?;
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

impl RawConnection for rusqlite::Connection {
    fn exec(&mut self, sql: &str) -> Result<(), SqlReturningError> {
        self.execute_batch(sql)?;
        Ok(())
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, SqlReturningError> {
        let mut stmt = self.prepare_cached(sql)?;
        if stmt.column_count() == 0 {
            let refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
            let affected = stmt.execute(&refs[..])?;
            return Ok(ResultSet::affected(affected));
        }
        build_result_set(&mut stmt, params)
    }

    fn in_transaction(&self) -> bool {
        !self.is_autocommit()
    }
}
