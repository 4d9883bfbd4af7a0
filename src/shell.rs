//! Batch runner and dot-commands shared by the REPL and script mode.
//!
//! The shell owns one [`Engine`] for its whole life, so tables created by
//! one batch are visible to the next.

use minisql_core::{parse, Engine, ExecutionOutcome, MemoryBackend, ResultSet, SqlError, StatementError};
use tracing::{debug, warn};

use crate::render::{render_json, render_table};

pub const HELP: &str = "\
Statements end with ';' and may span several lines.

  CREATE TABLE t (a int NOT NULL, b text, c boolean);
  INSERT INTO t VALUES (1, 'x', true), (2, NULL, false);
  SELECT a, b AS label FROM t WHERE c ORDER BY a DESC;
  UPDATE t SET b = 'y' WHERE c;
  DELETE FROM t WHERE NOT c;
  DROP TABLE t;

Commands:
  .help            Show this help
  .tables          List tables
  .schema <table>  Show a table's definition
  .snapshot        Print the catalog as JSON
  .exit, .quit     Leave the shell";

/// One piece of output produced by a batch or a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Rows(ResultSet),
    /// Command tag such as `INSERT 2`.
    Status(String),
    Message(String),
    Error(SqlError),
    /// Misused or unknown dot-command.
    Usage(String),
}

impl Output {
    pub fn is_error(&self) -> bool {
        matches!(self, Output::Error(_) | Output::Usage(_))
    }

    pub fn render(&self, json: bool) -> String {
        match self {
            Output::Rows(rs) if json => {
                render_json(rs).unwrap_or_else(|err| format!("JSON error: {}", err))
            }
            Output::Rows(rs) => {
                let noun = if rs.rows.len() == 1 { "row" } else { "rows" };
                format!("{}({} {})", render_table(rs), rs.rows.len(), noun)
            }
            Output::Status(text) | Output::Message(text) | Output::Usage(text) => text.clone(),
            Output::Error(err) => err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Tables,
    Schema(Option<String>),
    Snapshot,
    Exit,
    Unknown(String),
}

impl Command {
    /// Parse a dot-command line; `None` if the line is not one.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('.') {
            return None;
        }

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or(line);
        let command = match name {
            ".help" | ".h" | ".?" => Command::Help,
            ".tables" => Command::Tables,
            ".schema" => Command::Schema(parts.next().map(str::to_string)),
            ".snapshot" => Command::Snapshot,
            ".exit" | ".quit" | ".q" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue(Output),
    Exit,
}

/// Collects input lines until a statement terminator ends a line.
///
/// Quotes may span lines, so a `;` inside an open string or quoted
/// identifier does not end the batch. Neither does one in a `--` comment.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    text: String,
    /// Delimiter of the string or identifier left open by earlier lines.
    quote: Option<char>,
}

impl StatementBuffer {
    /// Add a line; returns the accumulated batch once it is complete.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if self.text.is_empty() && line.trim().is_empty() {
            return None;
        }
        self.text.push_str(line);
        self.text.push('\n');

        if self.scan(line) {
            Some(self.take())
        } else {
            None
        }
    }

    /// Track quote state across `line`; true if it ends outside any quote
    /// with `;` as its last significant character.
    fn scan(&mut self, line: &str) -> bool {
        let mut last = None;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match self.quote {
                Some(delimiter) => {
                    // a doubled delimiter closes and reopens
                    if ch == delimiter {
                        self.quote = None;
                    }
                    last = Some(ch);
                }
                None => match ch {
                    '\'' | '"' | '`' => {
                        self.quote = Some(ch);
                        last = Some(ch);
                    }
                    '-' if chars.peek() == Some(&'-') => break,
                    c if c.is_whitespace() => {}
                    c => last = Some(c),
                },
            }
        }
        self.quote.is_none() && last == Some(';')
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Drain whatever has been collected, complete or not.
    pub fn take(&mut self) -> String {
        self.quote = None;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.quote = None;
        self.text.clear();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellOptions {
    pub stop_on_error: bool,
}

#[derive(Debug, Default)]
pub struct Shell {
    engine: Engine<MemoryBackend>,
    options: ShellOptions,
}

impl Shell {
    pub fn new(options: ShellOptions) -> Self {
        Self {
            engine: Engine::default(),
            options,
        }
    }

    pub fn engine(&self) -> &Engine<MemoryBackend> {
        &self.engine
    }

    /// Execute a batch of SQL statements.
    ///
    /// A parse error rejects the batch. Otherwise statements run in order and
    /// each one yields an output; with `stop_on_error` the first failure ends
    /// the batch.
    pub fn execute(&mut self, sql: &str) -> Vec<Output> {
        let statements = match parse(sql) {
            Ok(statements) => statements,
            Err(err) => return vec![Output::Error(err.into())],
        };
        debug!(statements = statements.len(), "executing batch");

        let mut outputs = Vec::with_capacity(statements.len());
        for statement in &statements {
            match self.engine.execute_statement(statement) {
                Ok(ExecutionOutcome::Selected(rs)) => outputs.push(Output::Rows(rs)),
                Ok(outcome) => outputs.push(Output::Status(outcome.to_string())),
                Err(err) => {
                    outputs.push(Output::Error(err.into()));
                    if self.options.stop_on_error {
                        warn!(statement = statement.kind(), "stopping batch after failed statement");
                        break;
                    }
                }
            }
        }
        outputs
    }

    pub fn run_command(&self, command: &Command) -> Flow {
        let output = match command {
            Command::Help => Output::Message(HELP.to_string()),
            Command::Tables => {
                let names = self.engine.backend().table_names();
                if names.is_empty() {
                    Output::Message("(no tables)".to_string())
                } else {
                    Output::Message(names.join("\n"))
                }
            }
            Command::Schema(None) => Output::Usage("Usage: .schema <table>".to_string()),
            Command::Schema(Some(name)) => self.schema(name),
            Command::Snapshot => match serde_json::to_string_pretty(&self.engine.snapshot()) {
                Ok(json) => Output::Message(json),
                Err(err) => Output::Error(StatementError::Misc(err.to_string()).into()),
            },
            Command::Exit => return Flow::Exit,
            Command::Unknown(name) => Output::Usage(format!(
                "Unknown command: {} (type .help for help)",
                name
            )),
        };
        Flow::Continue(output)
    }

    fn schema(&self, name: &str) -> Output {
        let Some(table) = self.engine.backend().table(name) else {
            return Output::Error(StatementError::TableDoesNotExist(name.to_string()).into());
        };

        let columns: Vec<String> = table
            .column_names()
            .iter()
            .zip(table.column_types())
            .enumerate()
            .map(|(index, (column, column_type))| {
                let constraint = if table.is_nullable(index) { "" } else { " NOT NULL" };
                format!("  {} {}{}", column, column_type, constraint)
            })
            .collect();
        Output::Message(format!("CREATE TABLE {} (\n{}\n);", name, columns.join(",\n")))
    }

    /// Run a whole script: SQL accumulated up to each terminating `;`, plus
    /// dot-commands on their own lines. A trailing statement without `;` is
    /// still executed. `.exit` ends the script early.
    pub fn run_script(&mut self, source: &str) -> Vec<Output> {
        let mut outputs = Vec::new();
        let mut buffer = StatementBuffer::default();

        for line in source.lines() {
            if buffer.is_empty() {
                if let Some(command) = Command::parse(line) {
                    match self.run_command(&command) {
                        Flow::Continue(output) => {
                            let failed = output.is_error();
                            outputs.push(output);
                            if failed && self.options.stop_on_error {
                                return outputs;
                            }
                        }
                        Flow::Exit => return outputs,
                    }
                    continue;
                }
            }

            if let Some(batch) = buffer.push_line(line) {
                if self.run_batch_into(&batch, &mut outputs) {
                    return outputs;
                }
            }
        }

        let rest = buffer.take();
        if !rest.trim().is_empty() {
            self.run_batch_into(&rest, &mut outputs);
        }
        outputs
    }

    /// Returns true when the script should stop.
    fn run_batch_into(&mut self, batch: &str, outputs: &mut Vec<Output>) -> bool {
        let batch_outputs = self.execute(batch);
        let failed = batch_outputs.iter().any(Output::is_error);
        outputs.extend(batch_outputs);
        failed && self.options.stop_on_error
    }
}
