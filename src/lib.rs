//! MiniSQL shell library.
//!
//! The SQL engine lives in `minisql-core`; this crate adds what the `minisql`
//! binary needs around it: configuration, result rendering and the batch
//! runner behind both the REPL and script mode.

pub mod config;
pub mod render;
pub mod shell;

pub use config::ShellConfig;
pub use shell::{Command, Flow, Output, Shell, ShellOptions, StatementBuffer};
