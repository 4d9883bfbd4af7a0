//! MiniSQL Interactive Shell
//!
//! Usage: minisql [OPTIONS]
//!
//! Options:
//!   -f, --file <PATH>        Run a SQL script and exit
//!   -c, --command <SQL>      Run one batch and exit
//!       --config <PATH>      Config file (default: ./minisql.toml)
//!       --json               Print result sets as JSON
//!       --no-color           Disable colored output
//!       --log-level <LEVEL>  Log filter, overrides RUST_LOG

use anyhow::Context as _;
use clap::Parser;
use colored::Colorize;
use minisql::{Command, Flow, Output, Shell, ShellConfig, ShellOptions, StatementBuffer};
use minisql_core::Keyword;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "minisql")]
#[command(about = "MiniSQL - an in-memory SQL shell", long_about = None)]
struct Args {
    /// SQL script to run
    #[arg(short, long, conflicts_with = "command")]
    file: Option<PathBuf>,

    /// SQL batch to run
    #[arg(short, long)]
    command: Option<String>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print result sets as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log filter (e.g. `debug`, `minisql_core=debug`)
    #[arg(long)]
    log_level: Option<String>,
}

/// Tab completion helper
struct SqlHelper {
    completions: Vec<String>,
}

impl SqlHelper {
    fn new() -> Self {
        let mut completions: Vec<String> = Keyword::ALL
            .iter()
            .map(|k| k.as_str().to_uppercase())
            .collect();
        completions.extend(["TRUE", "FALSE"].map(String::from));
        completions.extend(
            [".help", ".tables", ".schema", ".snapshot", ".exit", ".quit"].map(String::from),
        );
        Self { completions }
    }

    fn word_start(line: &str) -> usize {
        line.rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Candidates for `word`, matched case-insensitively and returned in the
    /// case the user started typing in.
    fn candidates<'a>(&'a self, word: &'a str) -> impl Iterator<Item = String> + 'a {
        let lowercase = word.chars().next().is_some_and(|c| c.is_lowercase());
        self.completions
            .iter()
            .filter(move |c| {
                c.len() > word.len() && c.to_lowercase().starts_with(&word.to_lowercase())
            })
            .map(move |c| if lowercase { c.to_lowercase() } else { c.clone() })
    }
}

impl Completer for SqlHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let start = Self::word_start(&line[..pos]);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((start, Vec::new()));
        }

        let matches: Vec<Pair> = self
            .candidates(word)
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for SqlHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }

        let word = &line[Self::word_start(line)..];
        if word.is_empty() {
            return None;
        }

        self.candidates(word)
            .next()
            .map(|c| c[word.len()..].to_string())
    }
}

impl Highlighter for SqlHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.truecolor(100, 100, 100).to_string())
    }
}

impl Validator for SqlHelper {}

impl Helper for SqlHelper {}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "minisql=warn,minisql_core=warn".into()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_banner() {
    println!(
        "  {} {}",
        "MiniSQL".white().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!(
        "  Type {} for help, {} to quit\n",
        ".help".yellow(),
        ".exit".yellow()
    );
}

/// Print outputs; returns true if any of them was an error.
fn print_outputs(outputs: &[Output], json: bool) -> bool {
    let mut failed = false;
    for output in outputs {
        let text = output.render(json);
        match output {
            Output::Error(_) => {
                failed = true;
                eprintln!("{} {}", "Error:".red().bold(), text);
            }
            Output::Usage(_) => {
                failed = true;
                eprintln!("{}", text.yellow());
            }
            Output::Status(_) => println!("{}", text.dimmed()),
            Output::Rows(_) | Output::Message(_) => println!("{}", text),
        }
    }
    failed
}

fn print_timing(started: Instant, config: &ShellConfig) {
    if config.show_timing {
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
        println!("{}", format!("  ({:.2}ms)", elapsed).dimmed());
    }
}

fn repl(shell: &mut Shell, config: &ShellConfig, json: bool) -> anyhow::Result<()> {
    print_banner();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(SqlHelper::new()));

    let history_file = config.history_path();
    if let Some(path) = &history_file {
        if let Err(err) = rl.load_history(path) {
            tracing::debug!("no history loaded from {}: {}", path.display(), err);
        }
    }

    let mut buffer = StatementBuffer::default();

    loop {
        let prompt = if buffer.is_empty() {
            config.prompt.cyan().to_string()
        } else {
            format!("{} ", "...".dimmed())
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if buffer.is_empty() {
                    if let Some(command) = Command::parse(&line) {
                        let _ = rl.add_history_entry(line.trim());
                        match shell.run_command(&command) {
                            Flow::Continue(output) => {
                                print_outputs(&[output], json);
                            }
                            Flow::Exit => {
                                println!("{}", "Goodbye!".dimmed());
                                break;
                            }
                        }
                        continue;
                    }
                }

                let Some(batch) = buffer.push_line(&line) else {
                    continue;
                };

                let _ = rl.add_history_entry(batch.trim());
                let started = Instant::now();
                let outputs = shell.execute(&batch);
                print_outputs(&outputs, json);
                print_timing(started, config);
            }
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    println!("{}", "Type .exit to quit".dimmed());
                } else {
                    println!("{}", "Cancelled".dimmed());
                    buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".dimmed());
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    if let Some(path) = &history_file {
        if let Err(err) = rl.save_history(path) {
            tracing::warn!("could not save history to {}: {}", path.display(), err);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let config = ShellConfig::load(args.config.as_deref())?;
    if args.no_color || !config.color {
        colored::control::set_override(false);
    }

    let mut shell = Shell::new(ShellOptions {
        stop_on_error: config.stop_on_error,
    });

    let source = match (&args.file, &args.command) {
        (Some(path), _) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        (None, Some(sql)) => Some(sql.clone()),
        (None, None) => None,
    };

    let Some(source) = source else {
        return repl(&mut shell, &config, args.json);
    };

    tracing::debug!(bytes = source.len(), "running script");
    let started = Instant::now();
    let outputs = shell.run_script(&source);
    let failed = print_outputs(&outputs, args.json);
    print_timing(started, &config);

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
