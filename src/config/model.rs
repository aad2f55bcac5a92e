// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::config::options::ScriptOptions;

/// Top-level configuration as read from `denon.toml` (or JSON / YAML).
///
/// ```toml
/// allow = ["read"]
///
/// [scripts]
/// start = "app.ts"
/// check = "deno fmt --check && deno lint"
///
/// [scripts.test]
/// cmd = "deno test"
/// desc = "run the test suite"
/// watch = false
///
/// [watcher]
/// interval = 350
/// exts = ["ts", "json"]
/// skip = ["**/.git/**"]
/// ```
///
/// Everything is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct DenonConfig {
    /// All declared scripts, keyed by name.
    #[serde(default)]
    pub scripts: BTreeMap<String, Script>,

    #[serde(default)]
    pub watcher: WatchConfig,

    #[serde(default)]
    pub logger: LoggerConfig,

    /// Executable used for runnable files and `<interpreter> <action>` lines.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Options applied to every script.
    #[serde(flatten)]
    pub options: ScriptOptions,

    /// File this config was loaded from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_interpreter() -> String {
    "deno".to_string()
}

impl Default for DenonConfig {
    fn default() -> Self {
        Self {
            scripts: BTreeMap::new(),
            watcher: WatchConfig::default(),
            logger: LoggerConfig::default(),
            interpreter: default_interpreter(),
            options: ScriptOptions::default(),
            config_path: None,
        }
    }
}

/// A runnable script: a bare command string, an object with options, or a
/// sequence of either that runs strictly one after the other.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Script {
    Command(String),
    Object(ScriptObject),
    Sequence(Vec<ScriptStep>),
}

/// One element of a [`Script::Sequence`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Command(String),
    Object(ScriptObject),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptObject {
    pub cmd: String,

    /// Shown next to the script name when listing scripts.
    #[serde(default)]
    pub desc: Option<String>,

    #[serde(flatten)]
    pub options: ScriptOptions,
}

impl Script {
    /// Human readable description, only available for object scripts.
    pub fn description(&self) -> Option<&str> {
        match self {
            Script::Object(obj) => obj.desc.as_deref(),
            _ => None,
        }
    }
}

/// `[watcher]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Roots to observe. Empty means the current working directory.
    pub paths: Vec<PathBuf>,

    /// Debounce window (and poll period in legacy mode), in milliseconds.
    pub interval: u64,

    /// Bare extensions, e.g. `"ts"`. Empty disables extension filtering.
    pub exts: Vec<String>,

    /// Paths must match at least one of these globs (if any are given).
    #[serde(rename = "match")]
    pub match_globs: Vec<String>,

    /// Paths matching any of these globs are ignored.
    #[serde(rename = "skip")]
    pub skip_globs: Vec<String>,

    /// Walk the tree and diff modification times instead of using native
    /// notifications.
    pub legacy: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            interval: 350,
            exts: ["ts", "tsx", "js", "jsx", "json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            match_globs: vec!["**/*.*".to_string()],
            skip_globs: vec!["**/.git/**".to_string()],
            legacy: false,
        }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    /// Strip the leading `.` from extensions and `./` from globs.
    pub fn normalized(mut self) -> Self {
        self.exts = self
            .exts
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self.match_globs = self.match_globs.iter().map(|g| strip_dot_slash(g)).collect();
        self.skip_globs = self.skip_globs.iter().map(|g| strip_dot_slash(g)).collect();
        self
    }
}

fn strip_dot_slash(glob: &str) -> String {
    glob.strip_prefix("./").unwrap_or(glob).to_string()
}

/// `[logger]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Only log errors.
    pub quiet: bool,
    /// Log at debug level.
    pub debug: bool,
    /// Clear the terminal on every reload.
    pub fullscreen: bool,
}
