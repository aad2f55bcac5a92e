// tests/watch_filters.rs

mod common;
use crate::common::write_config;

use std::error::Error;
use std::path::PathBuf;

use proptest::prelude::*;
use tempfile::TempDir;

use denon::config::{load_and_validate, WatchConfig};
use denon::watch::WatchMatcher;
use denon_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn config(exts: &[&str], match_globs: &[&str], skip_globs: &[&str]) -> WatchConfig {
    WatchConfig {
        paths: vec![PathBuf::from("/proj")],
        exts: exts.iter().map(|s| s.to_string()).collect(),
        match_globs: match_globs.iter().map(|s| s.to_string()).collect(),
        skip_globs: skip_globs.iter().map(|s| s.to_string()).collect(),
        ..WatchConfig::default()
    }
    .normalized()
}

#[test]
fn default_filters_accept_sources_and_reject_git() -> TestResult {
    init_tracing();
    let matcher = WatchMatcher::new(&WatchConfig {
        paths: vec![PathBuf::from("/proj")],
        ..WatchConfig::default()
    })?;

    assert!(matcher.is_watched(&PathBuf::from("/proj/app.ts")));
    assert!(matcher.is_watched(&PathBuf::from("/proj/src/deep/mod.tsx")));
    assert!(matcher.is_watched(&PathBuf::from("/proj/deno.json")));
    assert!(!matcher.is_watched(&PathBuf::from("/proj/README.md")));
    assert!(!matcher.is_watched(&PathBuf::from("/proj/.git/hooks/pre-commit.js")));
    Ok(())
}

#[test]
fn extensions_are_normalized_and_matched_by_suffix() -> TestResult {
    let matcher = WatchMatcher::new(&config(&[".ts", "json"], &[], &[]))?;

    assert!(matcher.is_watched_rel("src/a.ts"));
    assert!(matcher.is_watched_rel("deno.json"));
    assert!(!matcher.is_watched_rel("src/a.js"));
    Ok(())
}

#[test]
fn skip_wins_over_match() -> TestResult {
    let matcher = WatchMatcher::new(&config(&[], &["src/**"], &["src/gen/**"]))?;

    assert!(matcher.is_watched_rel("src/app.ts"));
    assert!(!matcher.is_watched_rel("src/gen/types.ts"));
    assert!(!matcher.is_watched_rel("test/app.ts"));
    Ok(())
}

#[test]
fn empty_filters_accept_everything() -> TestResult {
    let matcher = WatchMatcher::new(&config(&[], &[], &[]))?;

    assert!(matcher.is_watched_rel("anything"));
    assert!(matcher.is_watched_rel("a/b/c.d"));
    Ok(())
}

#[test]
fn dot_slash_globs_are_normalized() -> TestResult {
    let matcher = WatchMatcher::new(&config(&[], &["./src/*.ts"], &[]))?;

    assert!(matcher.is_watched_rel("src/app.ts"));
    // `*` may cross `/`.
    assert!(matcher.is_watched_rel("src/nested/app.ts"));
    Ok(())
}

#[test]
fn paths_outside_every_root_are_matched_as_is() -> TestResult {
    let matcher = WatchMatcher::new(&config(&["ts"], &["**/*.ts"], &[]))?;

    assert!(matcher.is_watched(&PathBuf::from("elsewhere/app.ts")));
    assert!(!matcher.is_watched(&PathBuf::from("elsewhere/app.rs")));
    Ok(())
}

#[test]
fn loaded_config_file_bypasses_the_default_filters() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write_config(dir.path(), "denon.toml", "[scripts]\nstart = \"app.ts\"\n")?;
    let cfg = load_and_validate(&path)?;
    let config_path = cfg.config_path.clone().ok_or("config path not recorded")?;
    let root = dir.path().canonicalize()?;
    let watcher = WatchConfig {
        paths: vec![root.clone()],
        ..cfg.watcher.clone()
    };

    let plain = WatchMatcher::new(&watcher)?;
    assert!(!plain.is_watched(&config_path));

    let matcher = WatchMatcher::new(&watcher)?.always_accept(config_path.clone());
    assert!(matcher.is_watched(&config_path));
    assert!(!matcher.is_watched(&root.join("other.toml")));
    assert!(matcher.is_watched(&root.join("app.ts")));
    Ok(())
}

#[test]
fn first_containing_root_decides_the_relative_path() -> TestResult {
    let matcher = WatchMatcher::new(
        &WatchConfig {
            paths: vec![PathBuf::from("/proj"), PathBuf::from("/proj/src")],
            exts: Vec::new(),
            match_globs: vec!["src/*.ts".to_string()],
            skip_globs: Vec::new(),
            ..WatchConfig::default()
        }
        .normalized(),
    )?;

    assert!(matcher.is_watched(&PathBuf::from("/proj/src/a.ts")));
    assert!(!matcher.is_watched(&PathBuf::from("/elsewhere/a.ts")));
    Ok(())
}

#[test]
fn invalid_glob_is_reported() {
    assert!(WatchMatcher::new(&config(&[], &["src/{a,b"], &[])).is_err());
}

fn rel_path() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-z]{1,5}", 0..3),
        "[a-z]{1,6}",
        prop_oneof![Just("ts"), Just("js"), Just("md"), Just("json")],
    )
        .prop_map(|(dirs, stem, ext)| {
            let mut parts = dirs;
            parts.push(format!("{stem}.{ext}"));
            parts.join("/")
        })
}

proptest! {
    #[test]
    fn extension_outside_the_list_is_never_watched(path in rel_path()) {
        let matcher = WatchMatcher::new(&config(&["ts"], &["**/*"], &[])).unwrap();
        if !path.ends_with(".ts") {
            prop_assert!(!matcher.is_watched_rel(&path));
        }
    }

    #[test]
    fn any_skip_match_rejects_regardless_of_match_globs(path in rel_path()) {
        let matcher = WatchMatcher::new(&config(&[], &["**/*"], &["**/*"])).unwrap();
        prop_assert!(!matcher.is_watched_rel(&path));
    }

    #[test]
    fn no_filters_accepts_every_path(path in rel_path()) {
        let matcher = WatchMatcher::new(&config(&[], &[], &[])).unwrap();
        prop_assert!(matcher.is_watched_rel(&path));
    }
}
