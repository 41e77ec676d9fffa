//! Schema changes, described as SQL by a [`DdlCommand`].
//!
//! The emulation core does not interpret DDL; it only runs what a command
//! renders, all-or-nothing, through the same retrying primitives as DML.

use crate::backend::{Executor, RawConnection};
use crate::engine::transaction;
use crate::error::SqlReturningError;
use crate::statement::quote_identifier;
use crate::types::RowValues;

/// A schema change rendered to SQL.
pub trait DdlCommand {
    /// Query whose first column of the first row is non-zero when the object exists.
    fn exists_sql(&self) -> Option<String>;

    /// Statements that apply the change, in order.
    fn statements(&self) -> Vec<String>;
}

/// Pre-rendered DDL. Also used to move any command onto the blocking pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawDdl {
    pub exists: Option<String>,
    pub statements: Vec<String>,
}

impl RawDdl {
    #[must_use]
    pub fn new<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exists: None,
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn capture(command: &dyn DdlCommand) -> Self {
        Self {
            exists: command.exists_sql(),
            statements: command.statements(),
        }
    }
}

impl DdlCommand for RawDdl {
    fn exists_sql(&self) -> Option<String> {
        self.exists.clone()
    }

    fn statements(&self) -> Vec<String> {
        self.statements.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub decl_type: String,
    pub constraints: Option<String>,
}

impl ColumnDef {
    #[must_use]
    pub fn new(name: impl Into<String>, decl_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: decl_type.into(),
            constraints: None,
        }
    }

    /// Trailing column constraints, e.g. `PRIMARY KEY` or `NOT NULL`.
    #[must_use]
    pub fn constraints(mut self, constraints: impl Into<String>) -> Self {
        self.constraints = Some(constraints.into());
        self
    }

    fn render(&self) -> String {
        let mut out = format!("{} {}", quote_identifier(&self.name), self.decl_type);
        if let Some(constraints) = &self.constraints {
            out.push(' ');
            out.push_str(constraints);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub if_not_exists: bool,
}

impl CreateTable {
    #[must_use]
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            table: table.into(),
            columns,
            if_not_exists: false,
        }
    }

    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

impl DdlCommand for CreateTable {
    fn exists_sql(&self) -> Option<String> {
        Some(table_exists_sql(&self.table))
    }

    fn statements(&self) -> Vec<String> {
        let cols = self
            .columns
            .iter()
            .map(ColumnDef::render)
            .collect::<Vec<_>>()
            .join(", ");
        let guard = if self.if_not_exists {
            "IF NOT EXISTS "
        } else {
            ""
        };
        vec![format!(
            "CREATE TABLE {guard}{} ({cols})",
            quote_identifier(&self.table)
        )]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    pub table: String,
}

impl DdlCommand for DropTable {
    fn exists_sql(&self) -> Option<String> {
        Some(table_exists_sql(&self.table))
    }

    fn statements(&self) -> Vec<String> {
        vec![format!("DROP TABLE IF EXISTS {}", quote_identifier(&self.table))]
    }
}

fn table_exists_sql(table: &str) -> String {
    format!(
        "SELECT count(1) FROM sqlite_master WHERE type = 'table' AND name = '{}'",
        table.replace('\'', "''")
    )
}

/// Whether the object a command describes already exists.
///
/// # Errors
/// Returns the backend error from the existence query, or `ExecutionError`
/// if the command has no existence query.
pub fn ddl_exists<C>(
    exec: &mut Executor<'_, C>,
    command: &dyn DdlCommand,
) -> Result<bool, SqlReturningError>
where
    C: RawConnection + ?Sized,
{
    let Some(sql) = command.exists_sql() else {
        return Err(SqlReturningError::ExecutionError(
            "DDL command has no existence check".into(),
        ));
    };
    let rs = exec.query(&sql, &[])?;
    Ok(rs
        .results
        .first()
        .and_then(|row| row.get_by_index(0))
        .is_some_and(|value| match value {
            RowValues::Int(n) => *n != 0,
            RowValues::Null => false,
            _ => true,
        }))
}

/// Apply every statement of a command in one transaction scope.
///
/// # Errors
/// Returns the first failing statement's error; earlier statements are rolled back.
pub fn execute_ddl<C>(
    exec: &mut Executor<'_, C>,
    command: &dyn DdlCommand,
) -> Result<(), SqlReturningError>
where
    C: RawConnection + ?Sized,
{
    let statements = command.statements();
    transaction::run(exec, |exec| {
        for sql in &statements {
            tracing::debug!(sql = %sql, "executing ddl");
            exec.exec(sql)?;
        }
        Ok(())
    })
}
