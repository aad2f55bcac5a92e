// src/config/mod.rs

//! Configuration loading and validation for denon.
//!
//! Responsibilities:
//! - Define the serde data model (`model.rs`, `options.rs`).
//! - Layer script options (`merge.rs`).
//! - Discover and load a config file from disk (`loader.rs`).
//! - Validate scripts and watcher globs (`validate.rs`).
//! - Starter files for `--init` (`templates.rs`).

pub mod loader;
pub mod merge;
pub mod model;
pub mod options;
pub mod templates;
pub mod validate;

pub use loader::{find_config_file, load_and_validate, load_from_path, load_or_default};
pub use model::{DenonConfig, LoggerConfig, Script, ScriptObject, ScriptStep, WatchConfig};
pub use options::{AllowFlags, AllowValue, ScriptOptions, StdioPolicy};
pub use templates::{Template, TemplateFormat};
