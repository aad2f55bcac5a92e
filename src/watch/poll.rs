// src/watch/poll.rs

//! Legacy polling backend: walk the tree, diff modification times.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::watch::change::ChangeAction;
use crate::watch::watcher::RawChange;

/// `path -> mtime` for every regular file under the roots.
pub type Snapshot = BTreeMap<PathBuf, SystemTime>;

/// Walk all roots, skipping symlinks. A root may itself be a file. Unreadable
/// entries are ignored.
pub fn snapshot(fs: &dyn FileSystem, roots: &[PathBuf]) -> Snapshot {
    let mut files = Snapshot::new();
    let mut stack: Vec<PathBuf> = Vec::new();

    for root in roots {
        if fs.is_symlink(root) {
            continue;
        }
        if fs.is_file(root) {
            if let Ok(mtime) = fs.modified(root) {
                files.insert(root.clone(), mtime);
            }
        } else {
            stack.push(root.clone());
        }
    }

    while let Some(dir) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                continue;
            }
        };

        for path in entries {
            if fs.is_symlink(&path) {
                continue;
            }
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(mtime) = fs.modified(&path) {
                    files.insert(path, mtime);
                }
            }
        }
    }

    files
}

/// Changes between two snapshots: removals first, then modifications and
/// creations in path order.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<(PathBuf, ChangeAction)> {
    let mut changes = Vec::new();

    for path in previous.keys() {
        if !current.contains_key(path) {
            changes.push((path.clone(), ChangeAction::Remove));
        }
    }

    for (path, mtime) in current {
        match previous.get(path) {
            None => changes.push((path.clone(), ChangeAction::Create)),
            Some(old) if old != mtime => changes.push((path.clone(), ChangeAction::Modify)),
            Some(_) => {}
        }
    }

    changes
}

/// Poll every `interval` until the receiving side goes away.
///
/// The first walk is the baseline and reports nothing.
pub fn spawn_poller(
    fs: Arc<dyn FileSystem>,
    roots: Vec<PathBuf>,
    interval: Duration,
    raw_tx: mpsc::UnboundedSender<RawChange>,
) {
    tokio::spawn(async move {
        let mut previous: Option<Snapshot> = None;
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            if raw_tx.is_closed() {
                break;
            }

            let walk_fs = Arc::clone(&fs);
            let walk_roots = roots.clone();
            let current =
                match tokio::task::spawn_blocking(move || snapshot(walk_fs.as_ref(), &walk_roots))
                    .await
                {
                    Ok(current) => current,
                    Err(err) => {
                        warn!(error = %err, "polling walk failed");
                        continue;
                    }
                };

            if let Some(previous) = &previous {
                for (path, action) in diff(previous, &current) {
                    if raw_tx.send(RawChange { path, action }).is_err() {
                        return;
                    }
                }
            }
            previous = Some(current);
        }

        debug!("polling watcher finished");
    });
}
