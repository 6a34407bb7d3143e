// src/exec/mod.rs

//! What a task actually runs.
//!
//! - [`executable`] defines [`Executable`], the zero-argument unit bound to
//!   each task, and the [`Outcome`] it produces.
//! - [`command`] builds executables that run shell commands via
//!   `tokio::process::Command`, used by the task-file harness.

pub mod command;
pub mod executable;

pub use command::{command, command_with, CommandSpec};
pub use executable::{Executable, Outcome};
