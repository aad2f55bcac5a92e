// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::model::WatchConfig;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::change::{ChangeAccumulator, ChangeAction, FileChange};
use crate::watch::path_utils::is_under_any;
use crate::watch::patterns::WatchMatcher;
use crate::watch::poll::spawn_poller;

/// One unfiltered change as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    pub path: PathBuf,
    pub action: ChangeAction,
}

/// Pull-based stream of debounced batches.
#[derive(Debug)]
pub struct BatchStream {
    rx: mpsc::UnboundedReceiver<Vec<FileChange>>,
}

impl BatchStream {
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<Vec<FileChange>>) -> Self {
        Self { rx }
    }

    /// Next batch, or `None` once the source has ended.
    pub async fn next(&mut self) -> Option<Vec<FileChange>> {
        self.rx.recv().await
    }
}

/// Where the daemon gets its change batches from.
///
/// The production implementation is [`Watcher`]; tests use a channel-backed
/// fake.
pub trait ChangeSource: Send {
    /// Start delivering batches. Every call is a fresh subscription.
    fn subscribe(&mut self) -> Result<BatchStream>;

    /// Swap the filters of the running subscription without restarting it.
    fn reload(&mut self, config: &WatchConfig) -> Result<()>;
}

/// Filesystem watcher with debouncing and glob/extension filters.
#[derive(Debug)]
pub struct Watcher {
    config: WatchConfig,
    /// Always reported, even outside the roots or filters.
    config_file: Option<PathBuf>,
    fs: Arc<dyn FileSystem>,
    matcher_tx: Option<watch::Sender<Arc<WatchMatcher>>>,
}

impl Watcher {
    pub fn new(config: WatchConfig) -> Self {
        Self::with_fs(config, Arc::new(RealFileSystem))
    }

    /// Use a custom filesystem for the polling backend.
    pub fn with_fs(config: WatchConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config,
            config_file: None,
            fs,
            matcher_tx: None,
        }
    }

    /// Also report edits of the config file the daemon was loaded from.
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    fn matcher(&self, config: &WatchConfig) -> Result<WatchMatcher> {
        let matcher = WatchMatcher::new(config)?;
        Ok(match &self.config_file {
            Some(path) => matcher.always_accept(path.clone()),
            None => matcher,
        })
    }

    /// Roots to observe plus the config file when no root covers it.
    fn observed_paths(&self, matcher: &WatchMatcher) -> Vec<PathBuf> {
        let mut paths = matcher.roots().to_vec();
        if let Some(file) = &self.config_file {
            if !is_under_any(&paths, file) {
                paths.push(file.clone());
            }
        }
        paths
    }
}

impl ChangeSource for Watcher {
    fn subscribe(&mut self) -> Result<BatchStream> {
        let matcher = Arc::new(self.matcher(&self.config)?);
        let roots = self.observed_paths(&matcher);
        let interval = self.config.interval();

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<RawChange>();
        let (batch_tx, batch_rx) = mpsc::unbounded_channel::<Vec<FileChange>>();
        let (matcher_tx, matcher_rx) = watch::channel(matcher);

        let backend = if self.config.legacy {
            spawn_poller(Arc::clone(&self.fs), roots.clone(), interval, raw_tx);
            info!(?roots, ?interval, "polling watcher started");
            None
        } else {
            let watcher = spawn_native(&roots, raw_tx)?;
            info!(?roots, "file watcher started");
            Some(watcher)
        };

        tokio::spawn(debounce_loop(raw_rx, matcher_rx, batch_tx, interval, backend));

        self.matcher_tx = Some(matcher_tx);
        Ok(BatchStream::from_receiver(batch_rx))
    }

    fn reload(&mut self, config: &WatchConfig) -> Result<()> {
        let matcher = Arc::new(self.matcher(config)?);
        self.config = config.clone();

        if let Some(tx) = &self.matcher_tx {
            if tx.send(matcher).is_err() {
                debug!("watcher reloaded after its subscription ended");
            }
        }
        Ok(())
    }
}

/// Native watch on every root, recursive for directories. The returned
/// watcher must stay alive for events to keep flowing.
fn spawn_native(
    roots: &[PathBuf],
    raw_tx: mpsc::UnboundedSender<RawChange>,
) -> Result<RecommendedWatcher> {
    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let action = ChangeAction::from(&event.kind);
                for path in event.paths {
                    // Receiver gone: the subscription is over.
                    let _ = raw_tx.send(RawChange { path, action });
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )?;

    for root in roots {
        let mode = if root.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(root, mode)?;
    }

    Ok(watcher)
}

/// Run the filter + debounce stage over an arbitrary raw change feed.
///
/// Returns the batch stream and the sender used to swap filters.
pub fn debounce(
    raw_rx: mpsc::UnboundedReceiver<RawChange>,
    matcher: WatchMatcher,
    interval: Duration,
) -> (BatchStream, watch::Sender<Arc<WatchMatcher>>) {
    let (batch_tx, batch_rx) = mpsc::unbounded_channel::<Vec<FileChange>>();
    let (matcher_tx, matcher_rx) = watch::channel(Arc::new(matcher));
    tokio::spawn(debounce_loop(raw_rx, matcher_rx, batch_tx, interval, None));
    (BatchStream::from_receiver(batch_rx), matcher_tx)
}

/// Filter raw changes, coalesce them and emit a batch once `interval` has
/// passed without a new accepted change.
async fn debounce_loop(
    mut raw_rx: mpsc::UnboundedReceiver<RawChange>,
    mut matcher_rx: watch::Receiver<Arc<WatchMatcher>>,
    batch_tx: mpsc::UnboundedSender<Vec<FileChange>>,
    interval: Duration,
    _backend: Option<RecommendedWatcher>,
) {
    let mut matcher = matcher_rx.borrow_and_update().clone();
    let mut reloads_open = true;
    let mut pending = ChangeAccumulator::new();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            raw = raw_rx.recv() => {
                let Some(RawChange { path, action }) = raw else {
                    break;
                };
                if matcher.is_watched(&path) {
                    debug!(path = %path.display(), %action, "accepted change");
                    pending.push(path, action);
                    deadline = Some(Instant::now() + interval);
                }
            }

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                let batch = pending.drain();
                debug!(count = batch.len(), "flushing change batch");
                if batch_tx.send(batch).is_err() {
                    break;
                }
            }

            changed = matcher_rx.changed(), if reloads_open => {
                if changed.is_ok() {
                    matcher = matcher_rx.borrow_and_update().clone();
                    debug!(?matcher, "watch filters reloaded");
                } else {
                    reloads_open = false;
                }
            }

            _ = batch_tx.closed() => break,
        }
    }

    if !pending.is_empty() {
        let _ = batch_tx.send(pending.drain());
    }
    debug!("watcher event loop finished");
}
