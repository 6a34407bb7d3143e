// src/registry/mod.rs

//! Task registry: the only shared mutable state of a run.
//!
//! - Statuses live in a sharded concurrent map, so a status read or write
//!   locks one shard for one entry and never the whole table.
//! - Tasks that have not run yet sit in a separate list that is touched at
//!   registration and once per pass, when the engine takes them.
//!
//! Status transitions are monotonic: `Pending` → `Completed`/`Failed`,
//! then nothing.

pub mod status;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use crate::errors::{Result, TaskPoolError};
use crate::exec::Executable;
use crate::types::TaskId;

pub use status::{Status, TaskStatus};

/// A registered task that has not been handed to the engine yet.
#[derive(Debug)]
pub struct PendingTask {
    pub id: TaskId,
    pub executable: Executable,
}

/// Status of one task plus its position in registration order.
#[derive(Debug)]
struct Slot {
    seq: u64,
    status: Status,
}

/// Identifier → status map plus the queue of tasks waiting for a pass.
#[derive(Debug, Default)]
pub struct Registry {
    statuses: DashMap<TaskId, Slot>,
    pending: Mutex<Vec<PendingTask>>,
    next_seq: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under `id` with status `Pending`.
    ///
    /// Fails with [`TaskPoolError::DuplicateTask`] if `id` was registered
    /// before, whatever its current status; the existing entry is left as is.
    pub fn register(&self, id: impl Into<TaskId>, executable: Executable) -> Result<()> {
        let id = id.into();

        match self.statuses.entry(id.clone()) {
            Entry::Occupied(_) => {
                debug!(task = %id, "rejecting duplicate registration");
                Err(TaskPoolError::DuplicateTask(id))
            }
            Entry::Vacant(slot) => {
                // Queue the task while the shard is still held, so no reader
                // can see a Pending status without a task behind it.
                debug!(task = %id, kind = executable.kind(), "registered task");
                self.pending_tasks().push(PendingTask {
                    id,
                    executable,
                });
                slot.insert(Slot {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    status: Status::Pending,
                });
                Ok(())
            }
        }
    }

    /// Record a new status for `id`.
    ///
    /// Unknown identifiers are ignored. Writes that would change a terminal
    /// status, or move a task back to `Pending`, are ignored and logged.
    pub fn set_status(&self, id: &str, status: Status) {
        let Some(mut current) = self.statuses.get_mut(id) else {
            debug!(task = %id, "set_status on unknown task; ignoring");
            return;
        };

        if current.status.is_terminal() {
            warn!(
                task = %id,
                current = ?current.status,
                rejected = ?status,
                "task already terminal; ignoring status update"
            );
            return;
        }

        if !status.is_terminal() {
            debug!(task = %id, "task is already Pending; nothing to update");
            return;
        }

        current.status = status;
    }

    /// Current status of `id`, or [`TaskStatus::NotFound`].
    pub fn get_status(&self, id: &str) -> TaskStatus {
        self.statuses
            .get(id)
            .map(|entry| entry.status.clone())
            .into()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Snapshot of every task's status, in registration order.
    ///
    /// Each entry is read atomically; the snapshot as a whole is not, so
    /// during a run it may mix statuses observed at slightly different times.
    pub fn statuses(&self) -> Vec<(TaskId, TaskStatus)> {
        let mut all: Vec<(u64, TaskId, TaskStatus)> = self
            .statuses
            .iter()
            .map(|entry| (entry.seq, entry.key().clone(), entry.status.clone().into()))
            .collect();
        all.sort_unstable_by_key(|(seq, _, _)| *seq);
        all.into_iter().map(|(_, id, status)| (id, status)).collect()
    }

    /// Number of tasks registered but not yet taken by a pass.
    pub fn queued(&self) -> usize {
        self.pending_tasks().len()
    }

    /// Move every not-yet-run task out of the registry, in registration order.
    ///
    /// Their statuses stay `Pending` until the engine records an outcome.
    pub(crate) fn take_pending(&self) -> Vec<PendingTask> {
        std::mem::take(&mut *self.pending_tasks())
    }

    fn pending_tasks(&self) -> MutexGuard<'_, Vec<PendingTask>> {
        // The list is only ever pushed to or swapped out, so a panic while
        // holding the lock cannot leave it half-updated.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
