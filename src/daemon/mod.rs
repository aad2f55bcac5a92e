// src/daemon/mod.rs

//! Supervision daemon.
//!
//! - [`supervisor`] owns the process table and the restart policy.
//! - [`session`] is the caller's handle: pull events, wait for the end.
//! - [`signals`] turns OS signals into shutdown messages.
//! - [`events`] holds the public event and outcome types.

pub mod events;
pub mod session;
pub mod signals;
pub mod supervisor;

pub use events::{DaemonState, DenonEvent, SessionEnd, ShutdownSignal};
pub use session::Session;
pub use signals::{spawn_signal_listener, SignalListener};
pub use supervisor::Daemon;
