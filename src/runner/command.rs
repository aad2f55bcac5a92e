// src/runner/command.rs

use std::fmt;

use crate::config::options::ScriptOptions;
use crate::errors::Result;
use crate::exec::{ProcessHandle, ProcessSpawner};

/// A fully compiled command line plus the options that govern how it is
/// spawned (environment, stdio, `watch`).
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub argv: Vec<String>,
    pub options: ScriptOptions,
}

impl Command {
    pub fn new(argv: Vec<String>, options: ScriptOptions) -> Self {
        Self { argv, options }
    }

    /// Executable name (first element of `argv`).
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// Start this command through the given spawner.
    pub fn run(&self, spawner: &dyn ProcessSpawner) -> Result<Box<dyn ProcessHandle>> {
        spawner.spawn(self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}
