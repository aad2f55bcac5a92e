// src/runner/mod.rs

//! Script compilation: config scripts in, argv vectors out.

pub mod builder;
pub mod command;
pub mod flags;

pub use builder::Runner;
pub use command::Command;
pub use flags::build_flags;
