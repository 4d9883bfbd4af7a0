//! Error types for minisql-core.
//!
//! Lexical and syntactic errors carry the source location they were raised
//! at; statement errors describe why the backend refused a statement.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::executor::ColumnType;

/// Zero-based position in the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// No token could be recognized at `location`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Lex error at {location}: unrecognized input")]
pub struct LexError {
    pub location: Location,
}

/// A required token or grammar element was missing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at {location}: expected {expected}")]
pub struct ParseError {
    pub location: Location,
    pub expected: String,
}

impl ParseError {
    pub fn new(location: Location, expected: impl Into<String>) -> Self {
        Self {
            location,
            expected: expected.into(),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.location, "a keyword, symbol, identifier or literal")
    }
}

/// Reasons the backend refuses to execute a statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("Unsupported column type: {0}")]
    UnsupportedColumnType(String),

    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Table '{0}' does not exist")]
    TableDoesNotExist(String),

    #[error("Column '{0}' does not exist")]
    ColumnDoesNotExist(String),

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("WHERE clause must be a boolean expression")]
    WhereClauseNotBoolean,

    #[error("Not enough values: expected {expected}, found {found}")]
    NotEnoughValues { expected: usize, found: usize },

    #[error("Too many values: expected {expected}, found {found}")]
    TooManyValues { expected: usize, found: usize },

    #[error("Column '{column}' has type {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Column '{0}' does not accept NULL")]
    NullConstraint(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("{0}")]
    Misc(String),
}

/// Any error the pipeline can produce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Statement(#[from] StatementError),
}

impl From<LexError> for SqlError {
    fn from(err: LexError) -> Self {
        SqlError::Parse(err.into())
    }
}

/// Result type for minisql operations
pub type SqlResult<T> = Result<T, SqlError>;

impl Serialize for SqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Serialize for StatementError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
