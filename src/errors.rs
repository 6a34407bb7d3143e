// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only *synchronous* problems surface here (bad registrations, bad worker
//! limits, unreadable config files). Failures of individual tasks never do:
//! the engine turns them into `Failed` statuses in the registry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskPoolError {
    #[error("Task ID {0} already exists")]
    DuplicateTask(String),

    #[error("worker limit must be a positive integer (got {0})")]
    InvalidWorkerLimit(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskPoolError>;
