// src/registry/status.rs

//! Task status types.

use std::fmt;

use crate::exec::Outcome;

/// Stored status of a registered task.
///
/// There is no `Running` variant: a task is `Pending` until
/// its executable returns, then it becomes terminal and stays that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Registered; not finished yet.
    Pending,
    /// The executable returned normally, with a description of its value.
    Completed(String),
    /// The executable returned an error or panicked.
    Failed(String),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Pending)
    }
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Ok(value) => Status::Completed(value),
            Err(error) => Status::Failed(error),
        }
    }
}

/// Public answer to "what is the status of task X?".
///
/// Same as [`Status`] plus `NotFound` for identifiers that were never
/// registered, so lookups never need an error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    NotFound,
    Pending,
    Completed(String),
    Failed(String),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed(_) | TaskStatus::Failed(_))
    }
}

impl From<Status> for TaskStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => TaskStatus::Pending,
            Status::Completed(value) => TaskStatus::Completed(value),
            Status::Failed(error) => TaskStatus::Failed(error),
        }
    }
}

impl From<Option<Status>> for TaskStatus {
    fn from(status: Option<Status>) -> Self {
        status.map(TaskStatus::from).unwrap_or(TaskStatus::NotFound)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::NotFound => f.write_str("Task not found"),
            TaskStatus::Pending => f.write_str("PENDING"),
            TaskStatus::Completed(value) => write!(f, "COMPLETED: {value}"),
            TaskStatus::Failed(error) => write!(f, "FAILED: {error}"),
        }
    }
}
