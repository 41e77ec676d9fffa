//! SQL text for single-table INSERT/UPDATE/DELETE.
//!
//! Values are never inlined: every field and filter becomes a `?N`
//! placeholder, numbered from 1 without gaps in the order the caller listed
//! them (SET columns first, then WHERE columns).
//!
//! Identifiers are quoted but not validated, except returning columns: those
//! also travel in the text marker and are checked by [`Returning::new`].

use super::{Operation, Returning, Statement};
use crate::error::SqlReturningError;

/// Quote an identifier for `SQLite`, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `INSERT INTO t (a, b) VALUES (?1, ?2)`, or `DEFAULT VALUES` when `fields` is empty.
///
/// # Errors
/// Returns `SqlReturningError::MarkerFormat` if a returning identifier is rejected.
pub fn insert<F, R>(
    table: &str,
    fields: &[F],
    returning: &[R],
) -> Result<Statement, SqlReturningError>
where
    F: AsRef<str>,
    R: AsRef<str>,
{
    let sql = if fields.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quote_identifier(table))
    } else {
        let cols = join_quoted(fields);
        let placeholders = (1..=fields.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({cols}) VALUES ({placeholders})",
            quote_identifier(table)
        )
    };
    Ok(Statement::new(sql, returning_for(Operation::Insert, table, returning)?))
}

/// `UPDATE t SET a = ?1 WHERE id = ?2`; filter placeholders continue after the SET ones.
///
/// # Errors
/// Returns `SqlReturningError::MarkerFormat` if a returning identifier is rejected.
pub fn update<F, W, R>(
    table: &str,
    fields: &[F],
    filters: &[W],
    returning: &[R],
) -> Result<Statement, SqlReturningError>
where
    F: AsRef<str>,
    W: AsRef<str>,
    R: AsRef<str>,
{
    let set = fields
        .iter()
        .enumerate()
        .map(|(idx, field)| format!("{} = ?{}", quote_identifier(field.as_ref()), idx + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {set}{}",
        quote_identifier(table),
        where_clause(filters, fields.len() + 1)
    );
    Ok(Statement::new(sql, returning_for(Operation::Update, table, returning)?))
}

/// `DELETE FROM t WHERE id = ?1`.
///
/// # Errors
/// Returns `SqlReturningError::MarkerFormat` if a returning identifier is rejected.
pub fn delete<W, R>(
    table: &str,
    filters: &[W],
    returning: &[R],
) -> Result<Statement, SqlReturningError>
where
    W: AsRef<str>,
    R: AsRef<str>,
{
    let sql = format!(
        "DELETE FROM {}{}",
        quote_identifier(table),
        where_clause(filters, 1)
    );
    Ok(Statement::new(sql, returning_for(Operation::Delete, table, returning)?))
}

fn where_clause<W: AsRef<str>>(filters: &[W], start: usize) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let predicates = filters
        .iter()
        .enumerate()
        .map(|(idx, filter)| format!("{} = ?{}", quote_identifier(filter.as_ref()), start + idx))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(" WHERE {predicates}")
}

fn join_quoted<F: AsRef<str>>(names: &[F]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn returning_for<R: AsRef<str>>(
    operation: Operation,
    table: &str,
    returning: &[R],
) -> Result<Option<Returning>, SqlReturningError> {
    if returning.is_empty() {
        return Ok(None);
    }
    Returning::new(operation, table, returning.iter().map(AsRef::as_ref)).map(Some)
}
