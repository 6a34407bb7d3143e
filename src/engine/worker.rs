// src/engine/worker.rs

//! Running a single task inside the pool.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::exec::{Executable, Outcome};
use crate::registry::PendingTask;

/// Wait for a worker slot, then run the task's executable to completion.
///
/// The permit is held for exactly as long as the executable runs, which is
/// what bounds concurrency. Blocking executables are moved to the blocking
/// thread pool; a panic there comes back as a failed outcome. A panic in an
/// async executable unwinds this future instead and is reported by the
/// engine through the `JoinSet`.
pub(crate) async fn run_task(task: PendingTask, slots: Arc<Semaphore>) -> Outcome {
    let PendingTask { id, executable } = task;

    let _permit = match slots.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            warn!(task = %id, "worker pool closed before task could start");
            return Err("worker pool closed before task could start".to_string());
        }
    };

    debug!(task = %id, kind = executable.kind(), "worker picked up task");
    let started = Instant::now();

    let outcome = match executable {
        Executable::Blocking(f) => match tokio::task::spawn_blocking(f).await {
            Ok(outcome) => outcome,
            Err(err) => Err(describe_join_error(err)),
        },
        Executable::Async(fut) => fut.await,
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        Ok(_) => info!(task = %id, elapsed_ms, "task completed"),
        Err(error) => warn!(task = %id, elapsed_ms, %error, "task failed"),
    }

    outcome
}

/// Turn a join failure into the text stored in a `Failed` status.
pub(crate) fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        format!("task panicked: {}", panic_message(err.into_panic()))
    } else {
        // Tasks are never aborted, so this only happens during runtime
        // shutdown.
        format!("task did not finish: {err}")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
