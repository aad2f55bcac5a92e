// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::WatchConfig;
use crate::errors::{DenonError, Result};
use crate::watch::path_utils::match_key;

/// Compiled `exts` / `match` / `skip` filters for one watcher configuration.
///
/// Each filter is independent and disabled when its list is empty. Paths
/// registered with [`always_accept`](Self::always_accept) bypass all of them.
#[derive(Clone)]
pub struct WatchMatcher {
    roots: Vec<PathBuf>,
    always: Vec<PathBuf>,
    /// Stored with the leading dot, e.g. `".ts"`.
    exts: Vec<String>,
    match_set: Option<GlobSet>,
    skip_set: Option<GlobSet>,
}

impl fmt::Debug for WatchMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchMatcher")
            .field("roots", &self.roots)
            .field("exts", &self.exts)
            .field("always", &self.always)
            .finish_non_exhaustive()
    }
}

impl WatchMatcher {
    pub fn new(config: &WatchConfig) -> Result<Self> {
        Ok(Self {
            roots: watch_roots(config),
            always: Vec::new(),
            exts: config
                .exts
                .iter()
                .map(|e| e.trim_start_matches('.'))
                .filter(|e| !e.is_empty())
                .map(|e| format!(".{e}"))
                .collect(),
            match_set: build_globset(&config.match_globs, "match")?,
            skip_set: build_globset(&config.skip_globs, "skip")?,
        })
    }

    /// Report changes on exactly `path` whatever the filters say. Used for
    /// the config file, which rarely has a watched extension.
    pub fn always_accept(mut self, path: impl Into<PathBuf>) -> Self {
        self.always.push(path.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns true if a change on `path` should be reported.
    pub fn is_watched(&self, path: &Path) -> bool {
        if self.always.iter().any(|p| p == path) {
            return true;
        }
        self.is_watched_rel(&match_key(&self.roots, path))
    }

    /// Same as [`is_watched`](Self::is_watched) for an already relative,
    /// `/`-separated path.
    pub fn is_watched_rel(&self, rel: &str) -> bool {
        if !self.exts.is_empty() && !self.exts.iter().any(|ext| rel.ends_with(ext.as_str())) {
            return false;
        }
        if let Some(skip) = &self.skip_set {
            if skip.is_match(rel) {
                return false;
            }
        }
        if let Some(matches) = &self.match_set {
            if !matches.is_match(rel) {
                return false;
            }
        }
        true
    }
}

/// Absolute roots to observe; the working directory when none are configured.
pub fn watch_roots(config: &WatchConfig) -> Vec<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if config.paths.is_empty() {
        return vec![cwd];
    }
    config
        .paths
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
        .collect()
}

/// Build a GlobSet from simple string patterns. `None` for an empty list.
fn build_globset(patterns: &[String], what: &str) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| {
            DenonError::config(format!("invalid {what} glob pattern `{pat}`: {e}"))
        })?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| DenonError::config(format!("building {what} globset: {e}")))?;
    Ok(Some(set))
}
