// src/config/validate.rs

use crate::config::model::DenonConfig;
use crate::errors::{DenonError, Result};
use crate::runner::Runner;
use crate::watch::WatchMatcher;

impl DenonConfig {
    /// Check the invariants the rest of the crate relies on:
    ///
    /// - script names are non-empty,
    /// - every script compiles to at least one command,
    /// - the interpreter is set,
    /// - watcher globs compile.
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            return Err(DenonError::config("`interpreter` must not be empty"));
        }

        let runner = Runner::new(self, Vec::new());
        for name in self.scripts.keys() {
            if name.trim().is_empty() {
                return Err(DenonError::config("script names must not be empty"));
            }
            runner.build(name)?;
        }

        WatchMatcher::new(&self.watcher)?;
        Ok(())
    }
}
