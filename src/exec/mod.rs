// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] defines the `ProcessSpawner` / `ProcessHandle` seam the
//!   daemon talks to, plus `ProcessStatus`.
//! - [`process`] is the real `tokio::process` implementation.
//! - [`kill`] picks the platform kill method once.
//! - [`table`] tracks live processes by pid.

pub mod backend;
pub mod kill;
pub mod process;
pub mod table;

pub use backend::{BoxFuture, ProcessHandle, ProcessSpawner, ProcessStatus};
pub use kill::KillStrategy;
pub use process::RealSpawner;
pub use table::{ProcessRole, ProcessTable, TrackedProcess};
