// src/exec/process.rs

//! Real process backend on top of `tokio::process`.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command as TokioCommand};
use tracing::{debug, info, warn};

use crate::config::options::StdioPolicy;
use crate::errors::{DenonError, Result};
use crate::exec::backend::{BoxFuture, ProcessHandle, ProcessSpawner, ProcessStatus};
use crate::exec::kill::KillStrategy;
use crate::runner::Command;

/// Spawns commands as real child processes.
#[derive(Debug, Clone, Copy)]
pub struct RealSpawner {
    kill: KillStrategy,
}

impl RealSpawner {
    pub fn new() -> Self {
        Self {
            kill: KillStrategy::for_target(),
        }
    }
}

impl Default for RealSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSpawner for RealSpawner {
    fn spawn(&self, command: &Command) -> Result<Box<dyn ProcessHandle>> {
        let spawn_error = |source: std::io::Error| DenonError::ProcessSpawn {
            command: command.to_string(),
            source,
        };

        let mut cmd = TokioCommand::new(command.program());
        cmd.args(command.args());
        if let Some(env) = &command.options.env {
            cmd.envs(env);
        }

        let options = &command.options;
        cmd.stdin(to_stdio(options.stdin_policy()).map_err(spawn_error)?)
            .stdout(to_stdio(options.stdout_policy()).map_err(spawn_error)?)
            .stderr(to_stdio(options.stderr_policy()).map_err(spawn_error)?)
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(spawn_error)?;
        let pid = child.id().unwrap_or_default();

        info!(pid, cmd = %command, "spawned process");

        if let Some(stdout) = child.stdout.take() {
            drain_lines(pid, "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            drain_lines(pid, "stderr", stderr);
        }

        Ok(Box::new(RealProcess {
            child,
            pid,
            kill: self.kill,
        }))
    }
}

/// Piped output is consumed so the child never blocks on a full pipe.
fn drain_lines<R>(pid: u32, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(pid, "{stream}: {line}");
        }
    });
}

fn to_stdio(policy: StdioPolicy) -> std::io::Result<Stdio> {
    Ok(match policy {
        StdioPolicy::Inherit => Stdio::inherit(),
        StdioPolicy::Piped => Stdio::piped(),
        StdioPolicy::Null => Stdio::null(),
        StdioPolicy::Fd(fd) => fd_stdio(fd)?,
    })
}

#[cfg(unix)]
fn fd_stdio(fd: i32) -> std::io::Result<Stdio> {
    use std::os::fd::{FromRawFd, OwnedFd};

    use nix::fcntl::{fcntl, FcntlArg};

    let dup = fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(3)).map_err(std::io::Error::from)?;
    // SAFETY: `dup` is a fresh descriptor nothing else owns.
    Ok(Stdio::from(unsafe { OwnedFd::from_raw_fd(dup) }))
}

#[cfg(not(unix))]
fn fd_stdio(fd: i32) -> std::io::Result<Stdio> {
    warn!(fd, "raw file descriptors are not supported on this platform; inheriting");
    Ok(Stdio::inherit())
}

struct RealProcess {
    child: Child,
    pid: u32,
    kill: KillStrategy,
}

impl ProcessHandle for RealProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ProcessStatus>> {
        Box::pin(async move {
            let pid = self.pid;
            let status = self
                .child
                .wait()
                .await
                .map_err(|source| DenonError::StatusQuery { pid, source })?;
            Ok(ProcessStatus::from(status))
        })
    }

    fn terminate(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Err(err) = self.kill.kill(&mut self.child) {
                // ESRCH and friends: the process is already gone.
                warn!(pid = self.pid, error = %err, "failed to kill process");
            }
            match self.child.wait().await {
                Ok(status) => {
                    debug!(pid = self.pid, status = %ProcessStatus::from(status), "reaped killed process")
                }
                Err(err) => warn!(pid = self.pid, error = %err, "failed to reap killed process"),
            }
            Ok(())
        })
    }
}
