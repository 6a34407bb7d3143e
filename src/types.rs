use std::fmt;
use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::errors::TaskPoolError;

/// Caller-supplied unique task identifier.
pub type TaskId = String;

/// Number of workers allowed to execute tasks at the same time.
///
/// Always at least 1; building one from `0` fails with
/// [`TaskPoolError::InvalidWorkerLimit`]. The default of 3 matches the
/// `workers` default of the task file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "usize")]
pub struct WorkerLimit(NonZeroUsize);

impl WorkerLimit {
    pub const DEFAULT: usize = 3;

    pub fn new(limit: usize) -> Result<Self, TaskPoolError> {
        NonZeroUsize::new(limit)
            .map(WorkerLimit)
            .ok_or(TaskPoolError::InvalidWorkerLimit(limit))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for WorkerLimit {
    fn default() -> Self {
        // 3 is non-zero.
        WorkerLimit(NonZeroUsize::MIN.saturating_add(Self::DEFAULT - 1))
    }
}

impl TryFrom<usize> for WorkerLimit {
    type Error = TaskPoolError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        WorkerLimit::new(value)
    }
}

impl fmt::Display for WorkerLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
