//! Text encoding of a [`Returning`] request appended to generated SQL.
//!
//! Wire form: `<sql> ;--RETURNING ON <OPERATION> <table>,<col1>,<col2>,...`.
//! The delimiter opens a SQL line comment, so SQL that still carries a
//! marker is inert past the real statement if it ever reaches `SQLite`.

use super::{Operation, Returning};
use crate::error::SqlReturningError;

pub const MARKER_DELIMITER: &str = " ;--RETURNING ON ";

#[must_use]
pub fn has_marker(sql: &str) -> bool {
    sql.contains(MARKER_DELIMITER)
}

/// Render the marker suffix for `returning`, delimiter included.
#[must_use]
pub fn encode(returning: &Returning) -> String {
    let mut tail = String::from(MARKER_DELIMITER);
    tail.push_str(returning.operation().keyword());
    tail.push(' ');
    tail.push_str(returning.table());
    for column in returning.columns() {
        tail.push(',');
        tail.push_str(column);
    }
    tail
}

/// Split marked SQL into the real statement and the marker tail.
///
/// # Errors
/// Returns `SqlReturningError::MarkerFormat` if the delimiter is missing or
/// occurs more than once.
pub fn split(sql: &str) -> Result<(&str, &str), SqlReturningError> {
    let Some((real_sql, tail)) = sql.split_once(MARKER_DELIMITER) else {
        return Err(SqlReturningError::MarkerFormat(
            "returning marker not found".into(),
        ));
    };
    if tail.contains(MARKER_DELIMITER) {
        return Err(SqlReturningError::MarkerFormat(
            "returning marker appears more than once".into(),
        ));
    }
    Ok((real_sql, tail))
}

/// Decode a marker tail (the text after the delimiter).
///
/// # Errors
/// Returns `SqlReturningError::MarkerFormat` for an unknown operation keyword
/// or a table/column list that is empty or has blank entries.
pub fn parse(tail: &str) -> Result<Returning, SqlReturningError> {
    let Some((keyword, list)) = tail.split_once(' ') else {
        return Err(SqlReturningError::MarkerFormat(format!(
            "expected `<OPERATION> <table>,<columns>`, got {tail:?}"
        )));
    };
    let operation: Operation = keyword.parse()?;
    let mut names = list.split(',');
    let table = names.next().unwrap_or_default();
    Returning::new(operation, table, names)
}
