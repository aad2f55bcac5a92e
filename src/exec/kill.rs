// src/exec/kill.rs

use std::io;

use tokio::process::Child;

/// How a child is forcefully stopped on this platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillStrategy {
    /// `SIGKILL` sent straight to the pid.
    Signal,
    /// Let tokio close the process handle (`TerminateProcess` on Windows).
    CloseHandle,
}

impl KillStrategy {
    pub fn for_target() -> Self {
        if cfg!(unix) {
            KillStrategy::Signal
        } else {
            KillStrategy::CloseHandle
        }
    }

    /// Deliver the kill. Does not wait for the child; callers reap it.
    pub fn kill(self, child: &mut Child) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            KillStrategy::Signal => {
                use nix::sys::signal::{kill, Signal};
                use nix::unistd::Pid;

                // Already reaped.
                let Some(pid) = child.id() else {
                    return Ok(());
                };
                kill(Pid::from_raw(pid as i32), Signal::SIGKILL).map_err(io::Error::from)
            }
            #[cfg(not(unix))]
            KillStrategy::Signal => child.start_kill(),
            KillStrategy::CloseHandle => child.start_kill(),
        }
    }
}
