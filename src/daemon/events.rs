// src/daemon/events.rs

use std::fmt;

use crate::exec::ProcessStatus;
use crate::watch::FileChange;

/// Lifecycle events of a supervision session, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenonEvent {
    /// Always first.
    Start,
    /// A qualifying batch arrived; the current processes are about to be
    /// killed and the script restarted.
    Reload { change: Vec<FileChange> },
    /// The main process exited on its own with a failure.
    Crash { status: ProcessStatus },
    /// The main process exited on its own successfully.
    Success { status: ProcessStatus },
    /// Always last, if reached.
    Exit,
}

impl fmt::Display for DenonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenonEvent::Start => f.write_str("start"),
            DenonEvent::Reload { change } => {
                f.write_str("changes detected:")?;
                for (i, file) in change.iter().enumerate() {
                    let actions: Vec<String> =
                        file.actions.iter().map(|a| a.to_string()).collect();
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{} ({})", file.path.display(), actions.join(","))?;
                }
                Ok(())
            }
            DenonEvent::Crash { status } => write!(f, "crash ({status})"),
            DenonEvent::Success { status } => write!(f, "success ({status})"),
            DenonEvent::Exit => f.write_str("exit"),
        }
    }
}

/// OS signals that end a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Hangup,
    Interrupt,
    Terminate,
    TerminalStop,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShutdownSignal::Hangup => "SIGHUP",
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::TerminalStop => "SIGTSTP",
        };
        f.write_str(s)
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The main command exited on its own with `watch` disabled.
    Completed { success: bool },
    /// The change source has no more batches.
    SourceEnded,
    /// A shutdown signal was received.
    Interrupted { signal: ShutdownSignal },
}

impl SessionEnd {
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionEnd::Completed { success: false } => 1,
            _ => 0,
        }
    }
}

/// Daemon lifecycle, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Idle,
    Starting,
    Running,
    Reloading,
    Exited,
}
