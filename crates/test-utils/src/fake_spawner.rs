use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;

use denon::errors::{DenonError, Result};
use denon::exec::{BoxFuture, ProcessHandle, ProcessSpawner, ProcessStatus};
use denon::runner::Command;

/// What happened to a fake process, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRecord {
    Spawned { pid: u32, argv: Vec<String> },
    Exited { pid: u32, status: ProcessStatus },
    Killed { pid: u32 },
}

/// How a spawned command behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Runs until the test calls [`FakeSpawner::finish`] or the daemon kills it.
    RunForever,
    /// Exits right away with this code.
    ExitWith(i32),
    /// The spawn itself fails.
    FailSpawn,
    /// `wait` fails, as if the exit status could not be read.
    StatusError,
}

#[derive(Default)]
struct FakeState {
    next_pid: u32,
    records: Vec<ProcessRecord>,
    rules: Vec<(String, Behaviour)>,
    exits: HashMap<u32, watch::Sender<Option<ProcessStatus>>>,
}

/// Scripted `ProcessSpawner` that never touches the OS.
///
/// Clones share state: keep one in the test, hand the other to the daemon.
#[derive(Clone, Default)]
pub struct FakeSpawner {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands whose text contains `pattern` behave as given. First matching
    /// rule wins; unmatched commands run forever.
    pub fn on(self, pattern: &str, behaviour: Behaviour) -> Self {
        self.lock().rules.push((pattern.to_string(), behaviour));
        self
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Make a running process exit on its own.
    pub fn finish(&self, pid: u32, code: i32) {
        let state = self.lock();
        if let Some(tx) = state.exits.get(&pid) {
            tx.send_replace(Some(ProcessStatus::exited(code)));
        }
    }

    pub fn records(&self) -> Vec<ProcessRecord> {
        self.lock().records.clone()
    }

    /// argv of every spawned process, in spawn order.
    pub fn spawned(&self) -> Vec<Vec<String>> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                ProcessRecord::Spawned { argv, .. } => Some(argv),
                _ => None,
            })
            .collect()
    }

    pub fn spawned_pids(&self) -> Vec<u32> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                ProcessRecord::Spawned { pid, .. } => Some(pid),
                _ => None,
            })
            .collect()
    }

    pub fn killed(&self) -> Vec<u32> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                ProcessRecord::Killed { pid } => Some(pid),
                _ => None,
            })
            .collect()
    }

    /// Poll until `pred` holds for the records.
    pub async fn wait_until<F>(&self, pred: F)
    where
        F: Fn(&[ProcessRecord]) -> bool,
    {
        loop {
            if pred(&self.lock().records) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Poll until at least `n` processes have been spawned.
    pub async fn wait_for_spawns(&self, n: usize) {
        self.wait_until(|records| {
            records
                .iter()
                .filter(|r| matches!(r, ProcessRecord::Spawned { .. }))
                .count()
                >= n
        })
        .await
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, command: &Command) -> Result<Box<dyn ProcessHandle>> {
        let line = command.to_string();
        let mut state = self.lock();

        let behaviour = state
            .rules
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, b)| *b)
            .unwrap_or(Behaviour::RunForever);

        if behaviour == Behaviour::FailSpawn {
            return Err(DenonError::ProcessSpawn {
                command: line,
                source: io::Error::new(io::ErrorKind::NotFound, "fake spawn failure"),
            });
        }

        state.next_pid += 1;
        let pid = 1000 + state.next_pid;

        let initial = match behaviour {
            Behaviour::ExitWith(code) => Some(ProcessStatus::exited(code)),
            _ => None,
        };
        let (tx, rx) = watch::channel(initial);
        state.exits.insert(pid, tx);
        state.records.push(ProcessRecord::Spawned {
            pid,
            argv: command.argv.clone(),
        });

        Ok(Box::new(FakeProcess {
            pid,
            exit_rx: rx,
            status_error: behaviour == Behaviour::StatusError,
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeProcess {
    pid: u32,
    exit_rx: watch::Receiver<Option<ProcessStatus>>,
    status_error: bool,
    state: Arc<Mutex<FakeState>>,
}

impl ProcessHandle for FakeProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ProcessStatus>> {
        Box::pin(async move {
            if self.status_error {
                return Err(DenonError::StatusQuery {
                    pid: self.pid,
                    source: io::Error::other("fake status failure"),
                });
            }
            loop {
                let current = *self.exit_rx.borrow_and_update();
                if let Some(status) = current {
                    self.state.lock().unwrap().records.push(ProcessRecord::Exited {
                        pid: self.pid,
                        status,
                    });
                    return Ok(status);
                }
                if self.exit_rx.changed().await.is_err() {
                    return std::future::pending().await;
                }
            }
        })
    }

    fn terminate(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.records.push(ProcessRecord::Killed { pid: self.pid });
            if let Some(tx) = state.exits.remove(&self.pid) {
                tx.send_replace(Some(ProcessStatus {
                    success: false,
                    code: None,
                    signal: Some(9),
                }));
            }
            Ok(())
        })
    }
}
