// src/runner.rs

//! Caller-facing facade: register tasks, run them, read their statuses.
//!
//! ```no_run
//! # async fn demo() -> taskpool::errors::Result<()> {
//! use taskpool::{TaskRunner, TaskStatus};
//!
//! let runner = TaskRunner::new(2)?;
//! runner.register("A", || Ok::<_, String>("ok"))?;
//! runner.register("B", || Err::<String, _>("boom"))?;
//!
//! runner.run().await;
//!
//! assert_eq!(runner.get_status("A"), TaskStatus::Completed("ok".into()));
//! assert_eq!(runner.get_status("B"), TaskStatus::Failed("boom".into()));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;

use crate::engine::Engine;
use crate::errors::Result;
use crate::exec::Executable;
use crate::registry::{Registry, TaskStatus};
use crate::types::{TaskId, WorkerLimit};

/// A registry paired with the engine that drains it.
///
/// `TaskRunner` is `Sync`, so it can be shared (e.g. behind an `Arc`) with
/// observers that poll statuses while [`TaskRunner::run`] is in progress.
#[derive(Debug)]
pub struct TaskRunner {
    registry: Registry,
    engine: Engine,
}

/// Status counts over every registered task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.pending + self.completed + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks: {} completed, {} failed, {} pending",
            self.total(),
            self.completed,
            self.failed,
            self.pending
        )
    }
}

impl TaskRunner {
    /// Fails with `InvalidWorkerLimit` if `worker_limit` is 0.
    pub fn new(worker_limit: usize) -> Result<Self> {
        Ok(Self::with_limit(WorkerLimit::new(worker_limit)?))
    }

    pub fn with_limit(worker_limit: WorkerLimit) -> Self {
        Self {
            registry: Registry::new(),
            engine: Engine::with_limit(worker_limit),
        }
    }

    pub fn worker_limit(&self) -> usize {
        self.engine.worker_limit()
    }

    /// Register a blocking closure under `id`.
    pub fn register<F, T, E>(&self, id: impl Into<TaskId>, f: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        T: fmt::Display,
        E: fmt::Display,
    {
        self.registry.register(id, Executable::blocking(f))
    }

    /// Register a future under `id`; it is polled once a worker is free.
    pub fn register_async<Fut, T, E>(&self, id: impl Into<TaskId>, fut: Fut) -> Result<()>
    where
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: fmt::Display,
        E: fmt::Display,
    {
        self.registry.register(id, Executable::from_future(fut))
    }

    pub fn register_executable(&self, id: impl Into<TaskId>, executable: Executable) -> Result<()> {
        self.registry.register(id, executable)
    }

    /// Run every task registered since the previous pass; returns when all
    /// of them are terminal.
    pub async fn run(&self) {
        self.engine.run(&self.registry).await;
    }

    pub fn get_status(&self, id: &str) -> TaskStatus {
        self.registry.get_status(id)
    }

    pub fn statuses(&self) -> Vec<(TaskId, TaskStatus)> {
        self.registry.statuses()
    }

    pub fn summary(&self) -> RunSummary {
        self.statuses()
            .into_iter()
            .fold(RunSummary::default(), |mut acc, (_, status)| {
                match status {
                    TaskStatus::Pending => acc.pending += 1,
                    TaskStatus::Completed(_) => acc.completed += 1,
                    TaskStatus::Failed(_) => acc.failed += 1,
                    TaskStatus::NotFound => {}
                }
                acc
            })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
