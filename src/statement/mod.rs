//! Write statements and the returning columns requested for them.
//!
//! [`Statement`] is what the builder hands to the engine: plain SQL plus an
//! optional [`Returning`] request. [`Statement::to_sql`] renders the same
//! request as a text marker for callers that only pass SQL strings around;
//! see [`marker`] for that encoding.

pub mod builder;
pub mod marker;

use std::fmt;
use std::str::FromStr;

use crate::error::SqlReturningError;

pub use builder::{delete, insert, quote_identifier, update};

/// The write operation a returning request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }

    /// Row image the capture trigger reads from.
    #[must_use]
    pub fn row_reference(self) -> RowReference {
        match self {
            Operation::Insert | Operation::Update => RowReference::New,
            Operation::Delete => RowReference::Old,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Operation {
    type Err = SqlReturningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(Operation::Insert),
            "UPDATE" => Ok(Operation::Update),
            "DELETE" => Ok(Operation::Delete),
            other => Err(SqlReturningError::MarkerFormat(format!(
                "unknown operation keyword {other:?}"
            ))),
        }
    }
}

/// Trigger-visible row image: `NEW` after insert/update, `OLD` for delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowReference {
    New,
    Old,
}

impl RowReference {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            RowReference::New => "NEW",
            RowReference::Old => "OLD",
        }
    }
}

impl fmt::Display for RowReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Columns to hand back from the rows touched by a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Returning {
    operation: Operation,
    table: String,
    columns: Vec<String>,
}

impl Returning {
    /// # Errors
    /// Returns `SqlReturningError::MarkerFormat` if `columns` is empty or an
    /// identifier cannot be carried by the text marker: blank, padded with
    /// whitespace, or containing a comma or the marker delimiter.
    pub fn new<T, C>(
        operation: Operation,
        table: impl Into<String>,
        columns: T,
    ) -> Result<Self, SqlReturningError>
    where
        T: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let table = table.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_identifier(&table, "table")?;
        if columns.is_empty() {
            return Err(SqlReturningError::MarkerFormat(format!(
                "no returning columns for table {table}"
            )));
        }
        for column in &columns {
            check_identifier(column, "returning column")?;
        }
        Ok(Self {
            operation,
            table,
            columns,
        })
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn row_reference(&self) -> RowReference {
        self.operation.row_reference()
    }
}

fn check_identifier(name: &str, kind: &str) -> Result<(), SqlReturningError> {
    let problem = if name.trim().is_empty() {
        "is blank"
    } else if name.trim() != name {
        "has surrounding whitespace"
    } else if name.contains(',') {
        "contains a comma"
    } else if name.contains(marker::MARKER_DELIMITER.trim()) {
        "contains the returning marker"
    } else {
        return Ok(());
    };
    Err(SqlReturningError::MarkerFormat(format!(
        "{kind} {name:?} {problem}"
    )))
}

/// A generated write statement and, optionally, the columns to return from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    returning: Option<Returning>,
}

impl Statement {
    #[must_use]
    pub fn new(sql: impl Into<String>, returning: Option<Returning>) -> Self {
        Self {
            sql: sql.into(),
            returning,
        }
    }

    /// The statement without any returning marker.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn returning(&self) -> Option<&Returning> {
        self.returning.as_ref()
    }

    /// Render as text, appending the returning marker when columns were requested.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.returning {
            Some(returning) => format!("{}{}", self.sql, marker::encode(returning)),
            None => self.sql.clone(),
        }
    }

    /// Recover a statement from text that may carry a returning marker.
    ///
    /// # Errors
    /// Returns `SqlReturningError::MarkerFormat` if a marker is present but malformed.
    pub fn from_sql(sql: &str) -> Result<Self, SqlReturningError> {
        if !marker::has_marker(sql) {
            return Ok(Self::new(sql, None));
        }
        let (real_sql, tail) = marker::split(sql)?;
        let returning = marker::parse(tail)?;
        Ok(Self::new(real_sql, Some(returning)))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
