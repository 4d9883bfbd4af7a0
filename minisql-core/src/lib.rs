//! MiniSQL Core - SQL lexer, parser and in-memory executor.
//!
//! This crate turns SQL text into tokens, tokens into statements, and runs
//! statements against a catalog of typed tables. It has no I/O of its own and
//! can be embedded by the interactive shell or by tests.
//!
//! # Main Components
//!
//! - **Lexer**: Splits source text into located tokens
//! - **Parser**: Builds statement ASTs with precedence climbing for expressions
//! - **Executor**: Runs statements against a [`Backend`]; [`MemoryBackend`] keeps
//!   everything in memory
//!
//! # Example
//!
//! ```rust
//! use minisql_core::{Cell, Engine, ExecutionOutcome};
//!
//! let mut engine: Engine = Engine::default();
//! let outcomes = engine
//!     .execute(
//!         "CREATE TABLE users (id int, name text);
//!          INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');
//!          SELECT name FROM users ORDER BY id DESC",
//!     )
//!     .unwrap();
//!
//! let Ok(ExecutionOutcome::Selected(rs)) = &outcomes[2] else {
//!     panic!("expected rows");
//! };
//! assert_eq!(rs.rows[0], vec![Cell::Text("Bob".to_string())]);
//! ```

pub mod ast;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;

// Re-export main types for convenience
pub use ast::{Expression, Statement};
pub use error::{LexError, Location, ParseError, SqlError, SqlResult, StatementError};
pub use executor::{
    Backend, BatchOutcome, CatalogSnapshot, Cell, Column, ColumnType, Engine, ExecutionOutcome,
    MemoryBackend, ResultSet, Table, TableSnapshot,
};
pub use lexer::{lex, Keyword, Lexer, Symbol, Token, TokenKind};
pub use parser::{parse, Parser};
