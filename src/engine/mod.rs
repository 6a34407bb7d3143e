// src/engine/mod.rs

//! Execution engine.
//!
//! - [`pool`] holds [`Engine`], which drains a registry through a pool of at
//!   most `worker_limit` concurrent workers and records every outcome.
//! - [`worker`] runs one task: waits for a free slot, executes, and converts
//!   panics into failures.

pub mod pool;
mod worker;

pub use pool::Engine;
