// src/logging.rs

//! Logging setup for `denon` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `DENON_LOG` environment variable (e.g. "info", "debug")
//! 3. `[logger]` config section: `debug = true` → debug, `quiet = true` → error
//! 4. default to `info`
//!
//! Logs are sent to STDERR so that the supervised process owns stdout.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::config::LoggerConfig;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, logger: &LoggerConfig) -> Result<()> {
    let level = resolve_level(cli_level, std::env::var("DENON_LOG").ok().as_deref(), logger);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}

/// Pick the effective level from the flag, the env value and the config.
pub fn resolve_level(
    cli_level: Option<LogLevel>,
    env_value: Option<&str>,
    logger: &LoggerConfig,
) -> tracing::Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }
    if let Some(lvl) = env_value.and_then(parse_level_str) {
        return lvl;
    }
    if logger.debug {
        tracing::Level::DEBUG
    } else if logger.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
