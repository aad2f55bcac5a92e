// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DenonError {
    /// The script cannot be compiled or the config is malformed. Always
    /// raised before any child process exists.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("failed to spawn `{command}`: {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read exit status of process {pid}: {source}")]
    StatusQuery {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("file watcher error: {0}")]
    WatcherSource(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DenonError {
    pub fn config(msg: impl Into<String>) -> Self {
        DenonError::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DenonError>;
