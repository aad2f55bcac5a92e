// src/daemon/supervisor.rs

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::loader::load_and_validate;
use crate::config::model::DenonConfig;
use crate::daemon::events::{DaemonState, DenonEvent, SessionEnd, ShutdownSignal};
use crate::errors::{DenonError, Result};
use crate::exec::{ProcessRole, ProcessSpawner, ProcessStatus, ProcessTable};
use crate::runner::Runner;
use crate::watch::{has_modify, BatchStream, ChangeSource, FileChange};

/// How a (re)start went.
enum Started {
    Running,
    /// The main command could not be spawned; reported like a crash.
    MainFailed,
}

enum StartError {
    Interrupted(ShutdownSignal),
    Fatal(DenonError),
}

/// Runs one script under supervision: spawns it, restarts it on qualifying
/// change batches and reports lifecycle events.
///
/// The daemon is the only owner of the process table; signals and batches
/// reach it as messages.
pub struct Daemon<S: ProcessSpawner, W: ChangeSource> {
    script: String,
    config: DenonConfig,
    args: Vec<String>,
    runner: Runner,
    spawner: S,
    source: W,
    processes: ProcessTable,
    events: mpsc::UnboundedSender<DenonEvent>,
    shutdown_rx: mpsc::Receiver<ShutdownSignal>,
    signals_open: bool,
    main_watch: bool,
    state: DaemonState,
}

impl<S: ProcessSpawner, W: ChangeSource> fmt::Debug for Daemon<S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Daemon")
            .field("script", &self.script)
            .field("state", &self.state)
            .field("processes", &self.processes.len())
            .finish_non_exhaustive()
    }
}

impl<S: ProcessSpawner, W: ChangeSource> Daemon<S, W> {
    pub fn new(
        script: impl Into<String>,
        config: DenonConfig,
        args: Vec<String>,
        spawner: S,
        source: W,
        events: mpsc::UnboundedSender<DenonEvent>,
        shutdown_rx: mpsc::Receiver<ShutdownSignal>,
    ) -> Self {
        let runner = Runner::new(&config, args.clone());
        Self {
            script: script.into(),
            config,
            args,
            runner,
            spawner,
            source,
            processes: ProcessTable::new(),
            events,
            shutdown_rx,
            signals_open: true,
            main_watch: true,
            state: DaemonState::Idle,
        }
    }

    /// Main event loop.
    ///
    /// Waits on, in priority order: a shutdown signal, the main process
    /// exiting on its own, the next change batch.
    pub async fn run(mut self) -> Result<SessionEnd> {
        info!(script = %self.script, "denon daemon started");
        self.emit(DenonEvent::Start);

        match self.start().await {
            Ok(Started::Running) => {}
            Ok(Started::MainFailed) => {
                if let Some(end) = self.after_main_exit(ProcessStatus::unknown()).await {
                    return Ok(end);
                }
            }
            Err(StartError::Interrupted(signal)) => return Ok(self.shutdown(signal).await),
            Err(StartError::Fatal(err)) => return Err(self.abort(err).await),
        }

        let mut batches: Option<BatchStream> = None;
        if self.main_watch {
            match self.source.subscribe() {
                Ok(stream) => batches = Some(stream),
                Err(err) => {
                    error!(error = %err, "failed to subscribe to file changes");
                    return Ok(self.finish(SessionEnd::SourceEnded).await);
                }
            }
        }

        loop {
            tokio::select! {
                biased;

                signal = self.shutdown_rx.recv(), if self.signals_open => match signal {
                    Some(signal) => return Ok(self.shutdown(signal).await),
                    None => {
                        debug!("shutdown channel closed");
                        self.signals_open = false;
                    }
                },

                (pid, status) = wait_main(&mut self.processes) => {
                    debug!(pid, %status, "main process exited on its own");
                    self.processes.remove(pid);
                    if let Some(end) = self.after_main_exit(status).await {
                        return Ok(end);
                    }
                }

                batch = next_batch(&mut batches) => {
                    let Some(batch) = batch else {
                        info!("change source ended");
                        return Ok(self.finish(SessionEnd::SourceEnded).await);
                    };
                    if !has_modify(&batch) {
                        debug!(count = batch.len(), "ignoring batch without modifications");
                        continue;
                    }
                    match self.reload(batch).await {
                        Ok(Started::Running) => {}
                        Ok(Started::MainFailed) => {
                            if let Some(end) = self.after_main_exit(ProcessStatus::unknown()).await {
                                return Ok(end);
                            }
                        }
                        Err(StartError::Interrupted(signal)) => return Ok(self.shutdown(signal).await),
                        Err(StartError::Fatal(err)) => return Err(self.abort(err).await),
                    }
                }
            }
        }
    }

    fn emit(&self, event: DenonEvent) {
        debug!(?event, "denon event");
        // The session may have been dropped; the daemon keeps supervising.
        let _ = self.events.send(event);
    }

    fn set_state(&mut self, state: DaemonState) {
        debug!(from = ?self.state, to = ?state, "daemon state");
        self.state = state;
    }

    /// Compile the script, run pre-steps one after another and spawn the
    /// main command without waiting for it.
    async fn start(&mut self) -> std::result::Result<Started, StartError> {
        self.set_state(DaemonState::Starting);

        let commands = self.runner.build(&self.script).map_err(StartError::Fatal)?;
        let Some((main, pre_steps)) = commands.split_last() else {
            return Err(StartError::Fatal(DenonError::config(format!(
                "script `{}` does not contain any command",
                self.script
            ))));
        };

        for command in pre_steps {
            info!(cmd = %command, "starting sequential command");
            let handle = command.run(&self.spawner).map_err(StartError::Fatal)?;
            let pid = self.processes.insert(handle, ProcessRole::PreStep);

            let status = loop {
                tokio::select! {
                    biased;

                    signal = self.shutdown_rx.recv(), if self.signals_open => match signal {
                        Some(signal) => return Err(StartError::Interrupted(signal)),
                        None => self.signals_open = false,
                    },

                    status = wait_pid(&mut self.processes, pid) => break status,
                }
            };

            self.processes.remove(pid);
            debug!(pid, %status, "sequential command finished");
        }

        self.main_watch = main.options.watch_enabled();
        if self.main_watch {
            let watcher = &self.config.watcher;
            if !watcher.match_globs.is_empty() {
                info!("watching path(s): {}", watcher.match_globs.join(" "));
            }
            if !watcher.exts.is_empty() {
                info!("watching extensions: {}", watcher.exts.join(","));
            }
        }

        info!(cmd = %main, "starting");
        match main.run(&self.spawner) {
            Ok(handle) => {
                let pid = self.processes.insert(handle, ProcessRole::Main);
                debug!(pid, "monitoring main process");
                self.set_state(DaemonState::Running);
                Ok(Started::Running)
            }
            Err(err) => {
                error!(error = %err, "failed to start main command");
                self.set_state(DaemonState::Running);
                Ok(Started::MainFailed)
            }
        }
    }

    /// Report a main process that ended without being killed. Returns the
    /// session end when `watch` is disabled.
    async fn after_main_exit(&mut self, status: ProcessStatus) -> Option<SessionEnd> {
        if status.success {
            if self.main_watch {
                info!("clean exit - waiting for changes before restart");
            } else {
                info!("clean exit - denon is exiting ...");
            }
            self.emit(DenonEvent::Success { status });
        } else {
            if self.main_watch {
                error!(%status, "app crashed - waiting for file changes before starting ...");
            } else {
                error!(%status, "app crashed - denon is exiting ...");
            }
            self.emit(DenonEvent::Crash { status });
        }

        if self.main_watch {
            return None;
        }
        Some(
            self.finish(SessionEnd::Completed {
                success: status.success,
            })
            .await,
        )
    }

    async fn reload(&mut self, batch: Vec<FileChange>) -> std::result::Result<Started, StartError> {
        self.set_state(DaemonState::Reloading);
        info!("restarting due to changes...");

        let config_changed = self
            .config
            .config_path
            .as_deref()
            .is_some_and(|config_path| batch.iter().any(|c| same_file(&c.path, config_path)));

        self.emit(DenonEvent::Reload { change: batch });

        if config_changed {
            self.reload_config();
        }

        self.kill_all().await;
        self.start().await
    }

    /// Re-read the config file; keep the current one if it no longer loads.
    fn reload_config(&mut self) {
        let Some(path) = self.config.config_path.clone() else {
            return;
        };

        match load_and_validate(&path) {
            Ok(config) => {
                info!(path = %path.display(), "configuration reloaded");
                if let Err(err) = self.source.reload(&config.watcher) {
                    warn!(error = %err, "failed to apply new watcher settings");
                }
                self.runner = Runner::new(&config, self.args.clone());
                self.config = config;
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to reload configuration; keeping the previous one");
            }
        }
    }

    async fn kill_all(&mut self) {
        let tracked = self.processes.drain();
        debug!("killing {} orphan process[es]", tracked.len());

        for mut process in tracked {
            let pid = process.handle.pid();
            debug!(pid, role = ?process.role, "killing process");
            if let Err(err) = process.handle.terminate().await {
                warn!(pid, error = %err, "failed to kill process");
            }
        }
    }

    async fn finish(&mut self, end: SessionEnd) -> SessionEnd {
        self.kill_all().await;
        self.emit(DenonEvent::Exit);
        self.set_state(DaemonState::Exited);
        info!(?end, "denon daemon finished");
        end
    }

    async fn shutdown(&mut self, signal: ShutdownSignal) -> SessionEnd {
        info!(%signal, "shutdown requested");
        self.finish(SessionEnd::Interrupted { signal }).await
    }

    /// A pre-step could not be spawned: stop everything and hand the error
    /// back to the caller.
    async fn abort(&mut self, err: DenonError) -> DenonError {
        error!(error = %err, "aborting session");
        self.kill_all().await;
        self.emit(DenonEvent::Crash {
            status: ProcessStatus::unknown(),
        });
        self.emit(DenonEvent::Exit);
        self.set_state(DaemonState::Exited);
        err
    }
}

/// Resolve when the tracked main process exits; pending while there is none.
async fn wait_main(processes: &mut ProcessTable) -> (u32, ProcessStatus) {
    let Some(pid) = processes.main_pid() else {
        return std::future::pending().await;
    };
    (pid, wait_pid(processes, pid).await)
}

/// A status that cannot be read is logged and reported as unknown.
async fn wait_pid(processes: &mut ProcessTable, pid: u32) -> ProcessStatus {
    let Some(process) = processes.get_mut(pid) else {
        return std::future::pending().await;
    };
    match process.handle.wait().await {
        Ok(status) => status,
        Err(err) => {
            warn!(pid, error = %err, "error getting process status");
            ProcessStatus::unknown()
        }
    }
}

async fn next_batch(batches: &mut Option<BatchStream>) -> Option<Vec<FileChange>> {
    match batches {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

fn same_file(changed: &Path, config_path: &Path) -> bool {
    if changed == config_path {
        return true;
    }
    changed
        .canonicalize()
        .map(|p: PathBuf| p == config_path)
        .unwrap_or(false)
}
