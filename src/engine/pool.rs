// src/engine/pool.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::engine::worker::{describe_join_error, run_task};
use crate::errors::Result;
use crate::registry::{Registry, Status};
use crate::types::{TaskId, WorkerLimit};

/// Fixed-size worker pool that drains a [`Registry`].
///
/// The worker limit is chosen at construction and never changes. Each call
/// to [`Engine::run`] builds its own pool (a semaphore with `worker_limit`
/// permits plus a `JoinSet` of task futures) and tears it down before
/// returning.
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    worker_limit: WorkerLimit,
}

impl Engine {
    /// Build an engine allowing `worker_limit` concurrent executions.
    ///
    /// Fails with `InvalidWorkerLimit` for `0`.
    pub fn new(worker_limit: usize) -> Result<Self> {
        Ok(Self::with_limit(WorkerLimit::new(worker_limit)?))
    }

    pub fn with_limit(worker_limit: WorkerLimit) -> Self {
        Self { worker_limit }
    }

    pub fn worker_limit(&self) -> usize {
        self.worker_limit.get()
    }

    /// Execute every task currently queued in `registry`, exactly once each.
    ///
    /// - At most `worker_limit` executables run at any instant.
    /// - Each outcome is written to the registry as soon as its task ends:
    ///   `Completed` on success, `Failed` on error or panic.
    /// - One task failing never affects the others.
    ///
    /// Returns once every dispatched task is terminal. Tasks registered while
    /// the pass is running are left for the next call.
    pub async fn run(&self, registry: &Registry) {
        let tasks = registry.take_pending();
        if tasks.is_empty() {
            debug!("no queued tasks; nothing to run");
            return;
        }

        let total = tasks.len();
        let limit = self.worker_limit.get();
        info!(tasks = total, workers = limit, "starting execution pass");
        let started = Instant::now();

        let slots = Arc::new(Semaphore::new(limit));
        let mut workers = JoinSet::new();
        let mut ids: HashMap<tokio::task::Id, TaskId> = HashMap::with_capacity(total);

        for task in tasks {
            let id = task.id.clone();
            let handle = workers.spawn(run_task(task, Arc::clone(&slots)));
            ids.insert(handle.id(), id);
        }

        let mut completed = 0usize;
        let mut failed = 0usize;

        while let Some(joined) = workers.join_next_with_id().await {
            let (worker_id, status) = match joined {
                Ok((worker_id, outcome)) => (worker_id, Status::from(outcome)),
                Err(err) => (err.id(), Status::Failed(describe_join_error(err))),
            };

            let Some(task_id) = ids.remove(&worker_id) else {
                error!(?worker_id, "finished worker has no task id; dropping outcome");
                continue;
            };

            match status {
                Status::Completed(_) => completed += 1,
                _ => failed += 1,
            }
            registry.set_status(&task_id, status);
        }

        info!(
            tasks = total,
            completed,
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "execution pass finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TaskPoolError;
    use crate::exec::{Executable, Outcome};
    use crate::registry::TaskStatus;

    async fn explode() -> Outcome {
        panic!("async kaboom")
    }

    #[test]
    fn zero_workers_fail_to_construct() {
        assert!(matches!(
            Engine::new(0),
            Err(TaskPoolError::InvalidWorkerLimit(0))
        ));
        assert_eq!(Engine::new(2).unwrap().worker_limit(), 2);
    }

    #[tokio::test]
    async fn empty_registry_is_a_noop() {
        let registry = Registry::new();
        Engine::new(3).unwrap().run(&registry).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn async_panic_is_isolated() {
        let registry = Registry::new();
        registry
            .register("bad", Executable::Async(Box::pin(explode())))
            .unwrap();
        registry
            .register("good", Executable::from_future(async { Ok::<_, String>("fine") }))
            .unwrap();

        Engine::new(1).unwrap().run(&registry).await;

        assert_eq!(
            registry.get_status("bad"),
            TaskStatus::Failed("task panicked: async kaboom".into())
        );
        assert_eq!(registry.get_status("good"), TaskStatus::Completed("fine".into()));
    }

    #[tokio::test]
    async fn second_pass_only_runs_new_tasks() {
        let registry = Registry::new();
        let engine = Engine::new(2).unwrap();

        registry
            .register("first", Executable::blocking(|| Ok::<_, String>(1)))
            .unwrap();
        engine.run(&registry).await;

        registry
            .register("second", Executable::blocking(|| Err::<u8, _>("no")))
            .unwrap();
        engine.run(&registry).await;

        assert_eq!(registry.get_status("first"), TaskStatus::Completed("1".into()));
        assert_eq!(registry.get_status("second"), TaskStatus::Failed("no".into()));
    }
}
