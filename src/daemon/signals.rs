// src/daemon/signals.rs

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::daemon::events::ShutdownSignal;

/// Keeps the signal listeners running; dropping it stops them.
#[derive(Debug)]
pub struct SignalListener {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Forward SIGHUP, SIGINT, SIGTERM and SIGTSTP (Ctrl-C elsewhere) into the
/// daemon loop as messages.
pub fn spawn_signal_listener(tx: mpsc::Sender<ShutdownSignal>) -> SignalListener {
    let mut tasks = Vec::new();

    #[cfg(unix)]
    {
        use nix::sys::signal::Signal;
        use tokio::signal::unix::{signal, SignalKind};

        let kinds = [
            (SignalKind::hangup(), ShutdownSignal::Hangup),
            (SignalKind::interrupt(), ShutdownSignal::Interrupt),
            (SignalKind::terminate(), ShutdownSignal::Terminate),
            (
                SignalKind::from_raw(Signal::SIGTSTP as i32),
                ShutdownSignal::TerminalStop,
            ),
        ];

        for (kind, which) in kinds {
            let mut stream = match signal(kind) {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(signal = %which, error = %err, "failed to listen for signal");
                    continue;
                }
            };
            let tx = tx.clone();
            tasks.push(tokio::spawn(async move {
                if stream.recv().await.is_some() {
                    debug!(signal = %which, "signal received");
                    let _ = tx.send(which).await;
                }
            }));
        }
    }

    #[cfg(not(unix))]
    {
        tasks.push(tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(ShutdownSignal::Interrupt).await;
        }));
    }

    SignalListener { tasks }
}
