// tests/cli_and_logging.rs

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use denon::cli::{CliArgs, LogLevel};
use denon::config::{LoggerConfig, TemplateFormat};
use denon::logging::resolve_level;

#[test]
fn cli_flag_beats_everything() {
    let logger = LoggerConfig {
        quiet: true,
        debug: true,
        fullscreen: false,
    };
    assert_eq!(
        resolve_level(Some(LogLevel::Warn), Some("trace"), &logger),
        Level::WARN
    );
}

#[test]
fn env_value_beats_config() {
    let logger = LoggerConfig {
        quiet: true,
        ..Default::default()
    };
    assert_eq!(resolve_level(None, Some(" Debug "), &logger), Level::DEBUG);
    // Unknown values fall through.
    assert_eq!(resolve_level(None, Some("loud"), &logger), Level::ERROR);
}

#[test]
fn config_debug_wins_over_quiet_and_info_is_default() {
    let both = LoggerConfig {
        quiet: true,
        debug: true,
        fullscreen: false,
    };
    assert_eq!(resolve_level(None, None, &both), Level::DEBUG);
    assert_eq!(resolve_level(None, None, &LoggerConfig::default()), Level::INFO);
}

#[test]
fn script_and_trailing_args_are_collected() {
    let args = CliArgs::parse_from(["denon", "-c", "conf/denon.yml", "start", "--port", "8080"]);

    assert_eq!(args.config, Some(PathBuf::from("conf/denon.yml")));
    assert_eq!(args.script.as_deref(), Some("start"));
    assert_eq!(args.args, vec!["--port".to_string(), "8080".to_string()]);
    assert_eq!(
        args.positionals(),
        vec!["start".to_string(), "--port".to_string(), "8080".to_string()]
    );
}

#[test]
fn flags_before_the_script_are_parsed() {
    let args = CliArgs::parse_from(["denon", "--log-level", "debug", "--dry-run", "run", "app.ts"]);

    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
    assert_eq!(args.positionals(), vec!["run".to_string(), "app.ts".to_string()]);
}

#[test]
fn init_takes_a_format() {
    let args = CliArgs::parse_from(["denon", "--init", "yml"]);
    assert_eq!(args.init, Some(TemplateFormat::Yaml));
    assert!(args.script.is_none());

    assert!(CliArgs::try_parse_from(["denon", "--init", "xml"]).is_err());
}

#[test]
fn no_arguments_lists_scripts() {
    let args = CliArgs::parse_from(["denon"]);
    assert!(args.script.is_none());
    assert!(args.positionals().is_empty());
}
