// src/lib.rs

pub mod cli;
pub mod config;
pub mod daemon;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod runner;
pub mod watch;

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{DenonConfig, TemplateFormat};
use crate::daemon::{spawn_signal_listener, Daemon, DenonEvent, Session};
use crate::errors::{DenonError, Result};
use crate::exec::{ProcessSpawner, RealSpawner};
use crate::fs::FileSystem;
use crate::runner::{Command, Runner};
use crate::watch::{ChangeSource, Watcher};

/// Entry point of the library: a loaded config plus the positional CLI
/// arguments (script name first).
///
/// `S` and `W` are the process and change backends; [`Denon::new`] picks the
/// real ones.
pub struct Denon<S = RealSpawner, W = Watcher> {
    config: DenonConfig,
    args: Vec<String>,
    runner: Runner,
    spawner: S,
    source: W,
    handle_signals: bool,
}

impl Denon {
    pub fn new(config: DenonConfig, args: Vec<String>) -> Self {
        let source =
            Watcher::new(config.watcher.clone()).with_config_file(config.config_path.clone());
        Self::with_backends(config, args, RealSpawner::new(), source)
    }
}

impl<S, W> Denon<S, W>
where
    S: ProcessSpawner + 'static,
    W: ChangeSource + 'static,
{
    pub fn with_backends(config: DenonConfig, args: Vec<String>, spawner: S, source: W) -> Self {
        let runner = Runner::new(&config, args.clone());
        Self {
            config,
            args,
            runner,
            spawner,
            source,
            handle_signals: true,
        }
    }

    /// Do not install OS signal handlers; shut down through
    /// [`Session::shutdown`] instead.
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    pub fn config(&self) -> &DenonConfig {
        &self.config
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Compiled commands of `script`, without running anything.
    pub fn build(&self, script: &str) -> Result<Vec<Command>> {
        self.runner.build(script)
    }

    /// Start supervising `script`. Must be called inside a tokio runtime.
    ///
    /// Configuration errors are returned here, before any process exists.
    pub fn run(self, script: &str) -> Result<Session> {
        self.runner.build(script)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel::<DenonEvent>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(4);

        let signals = self
            .handle_signals
            .then(|| spawn_signal_listener(shutdown_tx.clone()));

        let daemon = Daemon::new(
            script,
            self.config,
            self.args,
            self.spawner,
            self.source,
            event_tx,
            shutdown_rx,
        );
        let task = tokio::spawn(daemon.run());

        Ok(Session::new(event_rx, shutdown_tx, task, signals))
    }
}

/// High-level entry point used by `main.rs`. Returns the process exit code.
pub async fn run(args: CliArgs, config: DenonConfig) -> anyhow::Result<i32> {
    let Some(script) = args.script.clone() else {
        print_scripts(&config);
        return Ok(0);
    };

    let fullscreen = config.logger.fullscreen;
    let denon = Denon::new(config, args.positionals());

    if args.dry_run {
        print_dry_run(&denon, &script)?;
        return Ok(0);
    }

    let mut session = denon.run(&script)?;
    while let Some(event) = session.next().await {
        log_event(&event, fullscreen);
    }

    let end = session.wait().await?;
    debug!(?end, "session ended");
    Ok(end.exit_code())
}

/// Write the starter config for `format` into `dir`. Never overwrites.
pub fn init_config(format: TemplateFormat, dir: &Path, fs: &dyn FileSystem) -> Result<PathBuf> {
    let template = format.template();
    let path = dir.join(template.filename);

    if fs.exists(&path) {
        return Err(DenonError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    fs.write(&path, template.source.as_bytes())?;
    info!(path = %path.display(), %format, "created config file");
    Ok(path)
}

/// Reloads are the user-facing line; crashes and clean exits are already
/// reported by the daemon itself.
fn log_event(event: &DenonEvent, fullscreen: bool) {
    match event {
        DenonEvent::Reload { .. } => {
            if fullscreen {
                clear_terminal();
            }
            info!("{event}");
        }
        other => debug!("denon event: {other}"),
    }
}

fn clear_terminal() {
    let mut stdout = std::io::stdout();
    if let Err(err) = stdout.write_all(b"\x1B[2J\x1B[1;1H").and_then(|_| stdout.flush()) {
        error!(error = %err, "failed to clear terminal");
    }
}

/// Script listing shown when no script is given.
fn print_scripts(config: &DenonConfig) {
    let runner = Runner::new(config, Vec::new());

    if config.scripts.is_empty() {
        println!("no scripts defined; create one with `denon --init toml`");
        return;
    }

    println!("available scripts:");
    for name in runner.script_names() {
        println!("  - {name}");
        if let Some(desc) = runner.script(name).and_then(|s| s.description()) {
            println!("      {desc}");
        }
        match runner.build(name) {
            Ok(commands) => println!("      $ {}", join_commands(&commands)),
            Err(err) => println!("      error: {err}"),
        }
    }
}

fn print_dry_run<S, W>(denon: &Denon<S, W>, script: &str) -> Result<()>
where
    S: ProcessSpawner + 'static,
    W: ChangeSource + 'static,
{
    let commands = denon.build(script)?;

    println!("denon dry-run: {script}");
    for (i, command) in commands.iter().enumerate() {
        let role = if i + 1 == commands.len() { "main" } else { "step" };
        println!("  {role}: {command}");
        if let Some(env) = &command.options.env {
            for (key, value) in env {
                println!("      env {key}={value}");
            }
        }
        println!("      watch: {}", command.options.watch_enabled());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

fn join_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" && ")
}
