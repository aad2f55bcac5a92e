use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use denon::config::WatchConfig;
use denon::errors::Result;
use denon::watch::{BatchStream, ChangeAction, ChangeSource, FileChange};

#[derive(Default)]
struct SourceState {
    subscriptions: usize,
    current: Option<mpsc::UnboundedSender<Vec<FileChange>>>,
    /// Batches sent before anyone subscribed.
    queued: Vec<Vec<FileChange>>,
    closed: bool,
    reloads: Vec<WatchConfig>,
}

/// `ChangeSource` fed by the test instead of the filesystem.
#[derive(Clone, Default)]
pub struct ChannelSource {
    state: Arc<Mutex<SourceState>>,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap()
    }

    /// Deliver a batch to the current subscriber (or the next one).
    pub fn send(&self, batch: Vec<FileChange>) {
        let mut state = self.lock();
        match &state.current {
            Some(tx) if !tx.is_closed() => {
                let _ = tx.send(batch);
            }
            _ => state.queued.push(batch),
        }
    }

    /// End every stream, current and future.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.current = None;
    }

    pub fn subscriptions(&self) -> usize {
        self.lock().subscriptions
    }

    pub fn reloads(&self) -> Vec<WatchConfig> {
        self.lock().reloads.clone()
    }
}

impl ChangeSource for ChannelSource {
    fn subscribe(&mut self) -> Result<BatchStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        state.subscriptions += 1;

        for batch in std::mem::take(&mut state.queued) {
            let _ = tx.send(batch);
        }
        if !state.closed {
            state.current = Some(tx);
        }
        Ok(BatchStream::from_receiver(rx))
    }

    fn reload(&mut self, config: &WatchConfig) -> Result<()> {
        self.lock().reloads.push(config.clone());
        Ok(())
    }
}

/// One-path change with the given actions.
pub fn change(path: &str, actions: &[ChangeAction]) -> FileChange {
    FileChange {
        path: path.into(),
        actions: actions.to_vec(),
    }
}

/// A batch holding a single modification of `path`.
pub fn modified(path: &str) -> Vec<FileChange> {
    vec![change(path, &[ChangeAction::Modify])]
}
