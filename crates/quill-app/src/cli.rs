//! CLI argument definitions for the Quill application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quill: hold a key, speak, and the transcript is pasted where you type.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Print every dictation event to stdout as one JSON object per line.
    #[arg(long = "json-events")]
    pub json_events: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq, Default)]
pub enum Command {
    /// Run the dictation controller (the default).
    #[default]
    Run,
    /// Paste a line of text at the cursor through the clipboard injector.
    TestInsert {
        /// Text to paste.
        #[arg(default_value = "Hello from Quill!")]
        text: String,
    },
    /// Write the default configuration to the config path.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > QUILL_CONFIG env var > platform default (~/.quill/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("QUILL_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.pick_log_level(std::env::var("RUST_LOG").ok(), config_level)
    }

    fn pick_log_level(&self, env_level: Option<String>, config_level: &str) -> String {
        self.log_level
            .clone()
            .or(env_level.filter(|level| !level.trim().is_empty()))
            .unwrap_or_else(|| config_level.to_string())
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".quill").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".quill").join("config.toml");
    }
    PathBuf::from("config.toml")
}
