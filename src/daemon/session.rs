// src/daemon/session.rs

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::daemon::events::{DenonEvent, SessionEnd, ShutdownSignal};
use crate::daemon::signals::SignalListener;
use crate::errors::{DenonError, Result};

/// Handle to a running supervision session.
///
/// Events are buffered, so a caller that only wants the outcome can go
/// straight to [`wait`](Session::wait).
#[derive(Debug)]
pub struct Session {
    events: mpsc::UnboundedReceiver<DenonEvent>,
    shutdown_tx: mpsc::Sender<ShutdownSignal>,
    task: JoinHandle<Result<SessionEnd>>,
    _signals: Option<SignalListener>,
}

impl Session {
    pub(crate) fn new(
        events: mpsc::UnboundedReceiver<DenonEvent>,
        shutdown_tx: mpsc::Sender<ShutdownSignal>,
        task: JoinHandle<Result<SessionEnd>>,
        signals: Option<SignalListener>,
    ) -> Self {
        Self {
            events,
            shutdown_tx,
            task,
            _signals: signals,
        }
    }

    /// Next lifecycle event; `None` once the session is over and every event
    /// has been read.
    pub async fn next(&mut self) -> Option<DenonEvent> {
        self.events.recv().await
    }

    /// Ask the daemon to stop as if `signal` had been delivered.
    pub async fn shutdown(&self, signal: ShutdownSignal) {
        // Fails only when the daemon already ended.
        let _ = self.shutdown_tx.send(signal).await;
    }

    /// Wait for the session to end.
    pub async fn wait(self) -> Result<SessionEnd> {
        self.task
            .await
            .map_err(|err| DenonError::Other(anyhow!("daemon task failed: {err}")))?
    }
}
