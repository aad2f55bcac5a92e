// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The daemon never touches `tokio::process` directly: it goes through a
//! [`ProcessSpawner`] that hands back boxed [`ProcessHandle`]s. Production
//! code uses [`RealSpawner`](super::RealSpawner); tests plug in a fake that
//! records spawn/kill order and lets the test decide when a process exits.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::process::ExitStatus;

use crate::errors::Result;
use crate::runner::Command;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Starts processes for compiled commands.
pub trait ProcessSpawner: Send + Sync {
    /// Spawn `command` without waiting for it.
    ///
    /// Fails with [`DenonError::ProcessSpawn`](crate::errors::DenonError::ProcessSpawn)
    /// when the OS refuses to start it.
    fn spawn(&self, command: &Command) -> Result<Box<dyn ProcessHandle>>;
}

/// A running (or finished) child process.
pub trait ProcessHandle: Send {
    fn pid(&self) -> u32;

    /// Resolve once the process has exited. Cancel-safe: dropping the future
    /// leaves the process untouched.
    fn wait(&mut self) -> BoxFuture<'_, Result<ProcessStatus>>;

    /// Forcefully stop the process and reap it.
    fn terminate(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// Terminal status of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    pub success: bool,
    pub code: Option<i32>,
    /// Signal that terminated the process (unix only).
    pub signal: Option<i32>,
}

impl ProcessStatus {
    pub fn exited(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
            signal: None,
        }
    }

    /// Used when the status could not be read.
    pub fn unknown() -> Self {
        Self {
            success: false,
            code: None,
            signal: None,
        }
    }
}

impl From<ExitStatus> for ProcessStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            success: status.success(),
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => f.write_str("unknown status"),
        }
    }
}
