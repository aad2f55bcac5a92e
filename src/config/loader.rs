// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::DenonConfig;
use crate::errors::{DenonError, Result};

/// Config file names looked up in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "denon.toml",
    "denon.json",
    "denon.yaml",
    "denon.yml",
    "scripts.toml",
    "scripts.json",
    "scripts.yaml",
    "scripts.yml",
];

/// Load a configuration file and normalize it.
///
/// The format is picked from the extension (`.toml`, `.json`, `.yaml` /
/// `.yml`). Any other extension is tried as JSON, then YAML, then TOML.
///
/// This does **not** validate scripts; use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<DenonConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        DenonError::config(format!("cannot read config file {}: {e}", path.display()))
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let mut config = parse_config(&contents, &ext)?;
    config.watcher = config.watcher.normalized();
    config.config_path = Some(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));

    debug!(path = %path.display(), scripts = config.scripts.len(), "loaded config");
    Ok(config)
}

fn parse_config(contents: &str, ext: &str) -> Result<DenonConfig> {
    match ext {
        "toml" => Ok(toml::from_str(contents)?),
        "json" => Ok(serde_json::from_str(contents)?),
        "yaml" | "yml" => Ok(serde_yaml_ng::from_str(contents)?),
        _ => serde_json::from_str(contents)
            .map_err(DenonError::from)
            .or_else(|_| serde_yaml_ng::from_str(contents).map_err(DenonError::from))
            .or_else(|_| toml::from_str(contents).map_err(DenonError::from)),
    }
}

/// Load a configuration file and check that every script compiles and every
/// glob is valid.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<DenonConfig> {
    let config = load_from_path(path)?;
    config.validate()?;
    Ok(config)
}

/// Find the first known config file in `dir`.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Load the given config file, or discover one in the working directory.
///
/// Without an explicit path and with no file found, the defaults are used.
pub fn load_or_default(explicit: Option<&Path>) -> Result<DenonConfig> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let cwd = std::env::current_dir()?;
    match find_config_file(&cwd) {
        Some(path) => load_and_validate(path),
        None => {
            debug!(dir = %cwd.display(), "no config file found; using defaults");
            let config = DenonConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}
