// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::TemplateFormat;

/// Command-line arguments for `denon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "denon",
    version,
    about = "Run a script and restart it whenever watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML, JSON or YAML).
    ///
    /// Default: the first of `denon.{toml,json,yaml,yml}` or
    /// `scripts.{toml,json,yaml,yml}` in the current working directory.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DENON_LOG`, then the `[logger]` config section, decide.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Write a starter config (toml, json or yaml) and exit.
    #[arg(long, value_name = "FORMAT")]
    pub init: Option<TemplateFormat>,

    /// Print the compiled commands of SCRIPT without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Script to run. Without it the available scripts are listed.
    ///
    /// An unknown name is run as a command line together with ARGS, e.g.
    /// `denon app.ts` or `denon run app.ts`.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<String>,

    /// Extra arguments appended to the last command of the script.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl CliArgs {
    /// Script name followed by its extra arguments.
    pub fn positionals(&self) -> Vec<String> {
        self.script
            .iter()
            .chain(self.args.iter())
            .cloned()
            .collect()
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
