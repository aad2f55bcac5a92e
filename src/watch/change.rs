// src/watch/change.rs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use notify::EventKind;

/// Kind of filesystem activity seen on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Any,
    Access,
    Create,
    Modify,
    Remove,
    Other,
}

impl From<&EventKind> for ChangeAction {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Any => ChangeAction::Any,
            EventKind::Access(_) => ChangeAction::Access,
            EventKind::Create(_) => ChangeAction::Create,
            EventKind::Modify(_) => ChangeAction::Modify,
            EventKind::Remove(_) => ChangeAction::Remove,
            EventKind::Other => ChangeAction::Other,
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeAction::Any => "any",
            ChangeAction::Access => "access",
            ChangeAction::Create => "create",
            ChangeAction::Modify => "modify",
            ChangeAction::Remove => "remove",
            ChangeAction::Other => "other",
        };
        f.write_str(s)
    }
}

/// Everything that happened to one path within a debounce window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    /// In arrival order, duplicates kept.
    pub actions: Vec<ChangeAction>,
}

impl FileChange {
    pub fn has(&self, action: ChangeAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Does this batch warrant a restart?
pub fn has_modify(batch: &[FileChange]) -> bool {
    batch.iter().any(|change| change.has(ChangeAction::Modify))
}

/// Collects changes until the debounce window closes.
#[derive(Debug, Default)]
pub struct ChangeAccumulator {
    changes: Vec<FileChange>,
    index: HashMap<PathBuf, usize>,
}

impl ChangeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf, action: ChangeAction) {
        if let Some(&i) = self.index.get(&path) {
            self.changes[i].actions.push(action);
            return;
        }
        self.index.insert(path.clone(), self.changes.len());
        self.changes.push(FileChange {
            path,
            actions: vec![action],
        });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Take the batch, first-seen path order preserved.
    pub fn drain(&mut self) -> Vec<FileChange> {
        self.index.clear();
        std::mem::take(&mut self.changes)
    }
}
