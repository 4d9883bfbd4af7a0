//! Configuration handling for the shell
//!
//! Manages the minisql.toml configuration file.
//!
//! ## Environment Variables
//!
//! The following environment variables can override config file settings:
//!
//! - `MINISQL_HISTORY` - Path of the REPL history file
//! - `MINISQL_COLOR` - Colored output (`true`/`false`, `1`/`0`, `on`/`off`)
//! - `MINISQL_PROMPT` - Primary prompt
//!
//! These can be set in a `.env` file next to the config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "minisql.toml";

/// Environment variable names
pub const ENV_HISTORY: &str = "MINISQL_HISTORY";
pub const ENV_COLOR: &str = "MINISQL_COLOR";
pub const ENV_PROMPT: &str = "MINISQL_PROMPT";

/// History file used when none is configured, relative to `$HOME`
pub const DEFAULT_HISTORY_FILE: &str = ".minisql_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// REPL history file; `$HOME/.minisql_history` when unset
    pub history_file: Option<PathBuf>,
    /// Colored prompts and errors
    pub color: bool,
    /// Print how long each batch took
    pub show_timing: bool,
    /// Stop a batch or script at the first failing statement
    pub stop_on_error: bool,
    /// Primary prompt
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            color: true,
            show_timing: false,
            stop_on_error: false,
            prompt: "minisql> ".to_string(),
        }
    }
}

impl ShellConfig {
    /// Load configuration and apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `minisql.toml` in the
    /// working directory is used if present, otherwise the defaults. A `.env`
    /// file beside the config file is loaded first.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => PathBuf::from(CONFIG_FILE_NAME),
        };

        let dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Read a config file without consulting the environment.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ShellConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded shell config");
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(history) = var(ENV_HISTORY) {
            if !history.is_empty() {
                self.history_file = Some(PathBuf::from(history));
            }
        }

        if let Some(color) = var(ENV_COLOR) {
            match parse_flag(&color) {
                Some(color) => self.color = color,
                None => tracing::warn!("ignoring {}={:?}: not a boolean", ENV_COLOR, color),
            }
        }

        if let Some(prompt) = var(ENV_PROMPT) {
            if !prompt.is_empty() {
                self.prompt = prompt;
            }
        }
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolved history file, if one can be determined.
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) => Some(path.clone()),
            None => std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(DEFAULT_HISTORY_FILE)),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
