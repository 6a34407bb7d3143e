// src/demo.rs

//! Simulated workload for trying the runner without a task file.
//!
//! Each demo task sleeps for a random 0.5–2.0 s and fails up front with
//! probability 0.3.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::errors::Result;
use crate::exec::Executable;
use crate::runner::TaskRunner;

pub const FAILURE_RATE: f64 = 0.3;
const MIN_DURATION_SECS: f64 = 0.5;
const MAX_DURATION_SECS: f64 = 2.0;

/// A blocking task that sleeps for `duration`, or fails immediately with
/// probability `failure_rate` (clamped to `0.0..=1.0`; NaN counts as 0).
pub fn simulated_task(id: &str, duration: Duration, failure_rate: f64) -> Executable {
    let id = id.to_string();
    let failure_rate = if failure_rate.is_nan() {
        0.0
    } else {
        failure_rate.clamp(0.0, 1.0)
    };

    Executable::blocking(move || {
        if rand::rng().random_bool(failure_rate) {
            return Err(format!("Task {id} failed due to a simulated error."));
        }
        std::thread::sleep(duration);
        Ok(format!(
            "Task {id} completed in {:.2} seconds.",
            duration.as_secs_f64()
        ))
    })
}

/// Register `Task_1..=Task_<count>` with random durations.
pub fn register_demo(runner: &TaskRunner, count: usize) -> Result<()> {
    let mut rng = rand::rng();
    for i in 1..=count {
        let id = format!("Task_{i}");
        let secs = rng.random_range(MIN_DURATION_SECS..MAX_DURATION_SECS);
        debug!(task = %id, secs, "registering simulated task");
        runner.register_executable(
            id.clone(),
            simulated_task(&id, Duration::from_secs_f64(secs), FAILURE_RATE),
        )?;
    }
    Ok(())
}
