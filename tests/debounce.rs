// tests/debounce.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use denon::config::WatchConfig;
use denon::watch::{debounce, ChangeAction, FileChange, RawChange, WatchMatcher};
use denon_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

const INTERVAL: Duration = Duration::from_millis(350);

fn matcher(exts: &[&str]) -> Result<WatchMatcher, denon::errors::DenonError> {
    WatchMatcher::new(&WatchConfig {
        paths: vec![PathBuf::from("/proj")],
        exts: exts.iter().map(|s| s.to_string()).collect(),
        match_globs: Vec::new(),
        skip_globs: vec!["**/.git/**".to_string()],
        ..WatchConfig::default()
    })
}

fn raw(path: &str, action: ChangeAction) -> RawChange {
    RawChange {
        path: PathBuf::from(path),
        action,
    }
}

#[tokio::test(start_paused = true)]
async fn actions_on_one_path_are_coalesced_in_order() -> TestResult {
    init_tracing();
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (mut batches, _matcher_tx) = debounce(raw_rx, matcher(&["ts"])?, INTERVAL);

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Create))?;
    raw_tx.send(raw("/proj/notes.md", ChangeAction::Modify))?;
    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    raw_tx.send(raw("/proj/.git/x.ts", ChangeAction::Modify))?;
    raw_tx.send(raw("/proj/c.ts", ChangeAction::Remove))?;
    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;

    let batch = batches.next().await.ok_or("stream ended")?;
    assert_eq!(
        batch,
        vec![
            FileChange {
                path: PathBuf::from("/proj/a.ts"),
                actions: vec![ChangeAction::Create, ChangeAction::Modify, ChangeAction::Modify],
            },
            FileChange {
                path: PathBuf::from("/proj/c.ts"),
                actions: vec![ChangeAction::Remove],
            },
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn every_accepted_change_restarts_the_window() -> TestResult {
    init_tracing();
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (mut batches, _matcher_tx) = debounce(raw_rx, matcher(&["ts"])?, INTERVAL);
    let started = Instant::now();

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    sleep(Duration::from_millis(200)).await;
    raw_tx.send(raw("/proj/b.ts", ChangeAction::Modify))?;

    let batch = batches.next().await.ok_or("stream ended")?;
    assert_eq!(batch.len(), 2);
    assert!(started.elapsed() >= Duration::from_millis(550));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rejected_changes_do_not_extend_the_window() -> TestResult {
    init_tracing();
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (mut batches, _matcher_tx) = debounce(raw_rx, matcher(&["ts"])?, INTERVAL);
    let started = Instant::now();

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    sleep(Duration::from_millis(200)).await;
    raw_tx.send(raw("/proj/readme.md", ChangeAction::Modify))?;

    let batch = batches.next().await.ok_or("stream ended")?;
    assert_eq!(batch.len(), 1);
    assert!(started.elapsed() < Duration::from_millis(550));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_become_separate_batches() -> TestResult {
    init_tracing();
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (mut batches, _matcher_tx) = debounce(raw_rx, matcher(&["ts"])?, INTERVAL);

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    let first = batches.next().await.ok_or("stream ended")?;

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    let second = batches.next().await.ok_or("stream ended")?;

    assert_eq!(first, second);
    assert_eq!(first[0].actions, vec![ChangeAction::Modify]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn swapped_filters_apply_to_later_changes() -> TestResult {
    init_tracing();
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (mut batches, matcher_tx) = debounce(raw_rx, matcher(&["ts"])?, INTERVAL);

    matcher_tx.send(Arc::new(matcher(&["md"])?))?;
    sleep(Duration::from_millis(1)).await;

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    raw_tx.send(raw("/proj/readme.md", ChangeAction::Modify))?;

    let batch = batches.next().await.ok_or("stream ended")?;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].path, PathBuf::from("/proj/readme.md"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn pending_changes_are_flushed_when_the_feed_ends() -> TestResult {
    init_tracing();
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (mut batches, _matcher_tx) = debounce(raw_rx, matcher(&["ts"])?, INTERVAL);
    let started = Instant::now();

    raw_tx.send(raw("/proj/a.ts", ChangeAction::Modify))?;
    drop(raw_tx);

    let batch = batches.next().await.ok_or("stream ended early")?;
    assert_eq!(batch.len(), 1);
    assert!(started.elapsed() < INTERVAL);
    assert_eq!(batches.next().await, None);
    Ok(())
}
