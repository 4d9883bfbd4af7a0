//! Executor module.
//!
//! Statements run against any store implementing the [`Backend`] trait.
//! [`MemoryBackend`] is the in-memory catalog; [`Engine`] ties the parser and
//! a backend together for callers that start from SQL text.

mod helpers;
mod memory;
mod table;

pub use memory::MemoryBackend;
pub use table::Table;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ast::Statement;
use crate::error::{ParseError, StatementError};
use crate::lexer::{Keyword, Token, TokenKind};
use crate::parser::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Text,
    Boolean,
}

impl ColumnType {
    /// Map a column definition's type token to a supported type.
    pub fn from_token(token: &Token) -> Option<Self> {
        match token.kind {
            TokenKind::Keyword(Keyword::Int) => Some(ColumnType::Int),
            TokenKind::Keyword(Keyword::Text) => Some(ColumnType::Text),
            TokenKind::Keyword(Keyword::Boolean) => Some(ColumnType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Int => "int",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
        })
    }
}

/// One typed, nullable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Text(String),
    Boolean(bool),
    Null,
}

impl Cell {
    /// `None` for `Null`, which fits any column type.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Cell::Int(_) => Some(ColumnType::Int),
            Cell::Text(_) => Some(ColumnType::Text),
            Cell::Boolean(_) => Some(ColumnType::Boolean),
            Cell::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// Renders `Null` as the empty string.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Text(v) => f.write_str(v),
            Cell::Boolean(v) => write!(f, "{}", v),
            Cell::Null => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Created,
    Dropped,
    Inserted(usize),
    Selected(ResultSet),
    Deleted(usize),
    Updated(usize),
}

/// Command tag, e.g. `INSERT 2`.
impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Created => f.write_str("CREATE TABLE"),
            ExecutionOutcome::Dropped => f.write_str("DROP TABLE"),
            ExecutionOutcome::Inserted(n) => write!(f, "INSERT {}", n),
            ExecutionOutcome::Selected(rs) => write!(f, "SELECT {}", rs.rows.len()),
            ExecutionOutcome::Deleted(n) => write!(f, "DELETE {}", n),
            ExecutionOutcome::Updated(n) => write!(f, "UPDATE {}", n),
        }
    }
}

/// Shape of one table, for debugging and the shell's catalog commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub columns: Vec<String>,
    pub column_types: Vec<ColumnType>,
    pub row_count: usize,
}

/// Table name to shape, ordered by name.
pub type CatalogSnapshot = BTreeMap<String, TableSnapshot>;

/// A store that statements can be executed against.
///
/// Implementations must apply a statement completely or not at all.
pub trait Backend {
    fn execute(&mut self, statement: &Statement) -> Result<ExecutionOutcome, StatementError>;

    fn snapshot(&self) -> CatalogSnapshot;
}

/// Outcome of each statement in a batch, in order.
pub type BatchOutcome = Vec<Result<ExecutionOutcome, StatementError>>;

/// Parses SQL text and runs it against a backend.
#[derive(Debug, Default)]
pub struct Engine<B: Backend = MemoryBackend> {
    backend: B,
}

impl<B: Backend> Engine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parse `sql` and execute every statement. A parse error rejects the
    /// whole batch; a statement error does not stop the statements after it.
    pub fn execute(&mut self, sql: &str) -> Result<BatchOutcome, ParseError> {
        let statements = parse(sql)?;
        Ok(statements
            .iter()
            .map(|statement| self.backend.execute(statement))
            .collect())
    }

    pub fn execute_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<ExecutionOutcome, StatementError> {
        self.backend.execute(statement)
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.backend.snapshot()
    }
}
