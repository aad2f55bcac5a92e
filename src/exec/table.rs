// src/exec/table.rs

use std::collections::HashMap;

use crate::exec::backend::ProcessHandle;

/// What a tracked process is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    /// A command that runs to completion before the next one starts.
    PreStep,
    /// The last, long-lived command of a script.
    Main,
}

pub struct TrackedProcess {
    pub handle: Box<dyn ProcessHandle>,
    pub role: ProcessRole,
}

/// Live processes owned by the daemon, keyed by pid.
///
/// At most one `Main` entry exists at a time.
#[derive(Default)]
pub struct ProcessTable {
    entries: HashMap<u32, TrackedProcess>,
    main: Option<u32>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: Box<dyn ProcessHandle>, role: ProcessRole) -> u32 {
        let pid = handle.pid();
        if role == ProcessRole::Main {
            self.main = Some(pid);
        }
        self.entries.insert(pid, TrackedProcess { handle, role });
        pid
    }

    pub fn remove(&mut self, pid: u32) -> Option<TrackedProcess> {
        if self.main == Some(pid) {
            self.main = None;
        }
        self.entries.remove(&pid)
    }

    pub fn get_mut(&mut self, pid: u32) -> Option<&mut TrackedProcess> {
        self.entries.get_mut(&pid)
    }

    pub fn main_pid(&self) -> Option<u32> {
        self.main
    }

    /// Remove every entry, handing them to the caller (usually to kill them).
    pub fn drain(&mut self) -> Vec<TrackedProcess> {
        self.main = None;
        self.entries.drain().map(|(_, tracked)| tracked).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
