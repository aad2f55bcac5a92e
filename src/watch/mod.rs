// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling `exts` / `match` / `skip` filters (`patterns.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`), or the legacy
//!   mtime poller (`poll.rs`).
//! - Debouncing accepted changes into batches (`watcher.rs`).
//!
//! It knows nothing about processes; the daemon decides what a batch means.

pub mod change;
pub mod path_utils;
pub mod patterns;
pub mod poll;
pub mod watcher;

pub use change::{has_modify, ChangeAccumulator, ChangeAction, FileChange};
pub use patterns::WatchMatcher;
pub use watcher::{debounce, BatchStream, ChangeSource, RawChange, Watcher};
