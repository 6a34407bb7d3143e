// tests/runner_scenarios.rs

use std::time::{Duration, Instant};

use taskpool::errors::TaskPoolError;
use taskpool::{TaskRunner, TaskStatus};
use taskpool_test_utils::probe::ConcurrencyProbe;
use taskpool_test_utils::{init_tracing, with_timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ok_and_boom_with_two_workers() {
    init_tracing();

    let runner = TaskRunner::new(2).unwrap();
    runner.register("A", || Ok::<_, String>("ok")).unwrap();
    runner
        .register("B", || -> anyhow::Result<String> { Err(anyhow::anyhow!("boom")) })
        .unwrap();

    with_timeout(runner.run()).await;

    assert_eq!(runner.get_status("A"), TaskStatus::Completed("ok".into()));
    assert_eq!(runner.get_status("B"), TaskStatus::Failed("boom".into()));
}

#[tokio::test]
async fn zero_tasks_is_a_noop() {
    init_tracing();

    let runner = TaskRunner::new(3).unwrap();
    let started = Instant::now();

    runner.run().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(runner.statuses().is_empty());
    assert_eq!(runner.summary().total(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_worker_serializes_execution() {
    init_tracing();

    let hold = Duration::from_millis(60);
    let probe = ConcurrencyProbe::new();
    let runner = TaskRunner::new(1).unwrap();
    for i in 0..5 {
        runner
            .register_executable(format!("t{i}"), probe.task(hold, false))
            .unwrap();
    }

    let started = Instant::now();
    with_timeout(runner.run()).await;
    let elapsed = started.elapsed();

    assert_eq!(probe.peak(), 1);
    assert!(
        elapsed >= hold * 5,
        "five serialized tasks finished in {elapsed:?}, expected at least {:?}",
        hold * 5
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_id_is_not_found_before_and_after_run() {
    init_tracing();

    let runner = TaskRunner::new(2).unwrap();
    runner.register("known", || Ok::<_, String>(1)).unwrap();

    assert_eq!(runner.get_status("unknown"), TaskStatus::NotFound);
    with_timeout(runner.run()).await;
    assert_eq!(runner.get_status("unknown"), TaskStatus::NotFound);
    assert_eq!(runner.get_status("known"), TaskStatus::Completed("1".into()));
}

#[tokio::test]
async fn duplicate_registration_keeps_first_task() {
    init_tracing();

    let runner = TaskRunner::new(1).unwrap();
    runner.register("dup", || Ok::<_, String>("first")).unwrap();

    match runner.register("dup", || Ok::<_, String>("second")) {
        Err(TaskPoolError::DuplicateTask(id)) => assert_eq!(id, "dup"),
        other => panic!("expected DuplicateTask, got {other:?}"),
    }

    with_timeout(runner.run()).await;
    assert_eq!(runner.get_status("dup"), TaskStatus::Completed("first".into()));
}

#[test]
fn zero_worker_limit_fails_to_construct() {
    assert!(matches!(
        TaskRunner::new(0),
        Err(TaskPoolError::InvalidWorkerLimit(0))
    ));
}
