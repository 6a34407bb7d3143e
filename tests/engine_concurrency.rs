// tests/engine_concurrency.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use taskpool::{Engine, Executable, Registry, TaskRunner, TaskStatus};
use taskpool_test_utils::probe::ConcurrencyProbe;
use taskpool_test_utils::{init_tracing, with_timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn peak_concurrency_never_exceeds_limit() {
    init_tracing();

    for limit in [1usize, 2, 3, 5] {
        let probe = ConcurrencyProbe::new();
        let registry = Registry::new();
        for i in 0..12 {
            registry
                .register(format!("t{i}"), probe.task(Duration::from_millis(20), false))
                .unwrap();
        }

        with_timeout(Engine::new(limit).unwrap().run(&registry)).await;

        assert_eq!(probe.entered(), 12, "every task runs exactly once");
        assert!(
            probe.peak() <= limit,
            "peak {} exceeded limit {limit}",
            probe.peak()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn workers_actually_run_in_parallel() {
    init_tracing();

    let probe = ConcurrencyProbe::new();
    let registry = Registry::new();
    for i in 0..4 {
        registry
            .register(format!("t{i}"), probe.task(Duration::from_millis(200), false))
            .unwrap();
    }

    with_timeout(Engine::new(4).unwrap().run(&registry)).await;

    // Four 200ms sleeps with four slots overlap at least pairwise.
    assert!(probe.peak() >= 2, "peak was {}", probe.peak());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_executables_share_the_same_bound() {
    init_tracing();

    let probe = ConcurrencyProbe::new();
    let registry = Registry::new();
    for i in 0..8 {
        registry
            .register(format!("a{i}"), probe.async_task(Duration::from_millis(20)))
            .unwrap();
    }

    with_timeout(Engine::new(3).unwrap().run(&registry)).await;

    assert_eq!(probe.entered(), 8);
    assert!(probe.peak() <= 3);
    assert!(registry
        .statuses()
        .iter()
        .all(|(_, s)| *s == TaskStatus::Completed("done".into())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failures_and_panics_are_isolated() {
    init_tracing();

    let registry = Registry::new();
    registry
        .register("ok-1", Executable::blocking(|| Ok::<_, String>("fine")))
        .unwrap();
    registry
        .register("err", Executable::blocking(|| Err::<String, _>("bad input")))
        .unwrap();
    registry
        .register(
            "panic",
            Executable::blocking(|| -> Result<String, String> { panic!("exploded") }),
        )
        .unwrap();
    registry
        .register("ok-2", Executable::from_future(async { Ok::<_, String>(2) }))
        .unwrap();

    with_timeout(Engine::new(2).unwrap().run(&registry)).await;

    assert_eq!(registry.get_status("ok-1"), TaskStatus::Completed("fine".into()));
    assert_eq!(registry.get_status("ok-2"), TaskStatus::Completed("2".into()));
    assert_eq!(registry.get_status("err"), TaskStatus::Failed("bad input".into()));
    assert_eq!(
        registry.get_status("panic"),
        TaskStatus::Failed("task panicked: exploded".into())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn observed_terminal_statuses_never_change_during_run() {
    init_tracing();

    async fn explode() -> Result<String, String> {
        panic!("mid-run panic")
    }

    let runner = Arc::new(TaskRunner::new(2).unwrap());
    let probe = ConcurrencyProbe::new();
    for i in 0..20 {
        let id = format!("t{i}");
        let executable = match i % 4 {
            0 => probe.task(Duration::from_millis(30), false),
            1 => probe.task(Duration::from_millis(30), true),
            2 => probe.async_task(Duration::from_millis(30)),
            _ => Executable::from_future(explode()),
        };
        runner.register_executable(id, executable).unwrap();
    }

    let observer = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            let mut history: HashMap<String, Vec<TaskStatus>> = HashMap::new();
            for _ in 0..200 {
                for (id, status) in runner.statuses() {
                    history.entry(id).or_default().push(status);
                }
                if runner.statuses().iter().all(|(_, s)| s.is_terminal()) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            history
        })
    };

    with_timeout(runner.run()).await;

    // Barrier: nothing is left pending once run() returns.
    assert!(runner.statuses().iter().all(|(_, s)| s.is_terminal()));
    assert!(probe.peak() <= 2);

    let history = with_timeout(observer).await.unwrap();
    assert!(
        history.values().flatten().any(|s| *s == TaskStatus::Pending),
        "no Pending status was observed mid-run"
    );

    for (id, seen) in &history {
        let Some(first_terminal) = seen.iter().position(TaskStatus::is_terminal) else {
            continue;
        };
        let settled = &seen[first_terminal];
        assert!(
            seen[first_terminal..].iter().all(|s| s == settled),
            "{id} changed after becoming terminal: {seen:?}"
        );
        assert_eq!(&runner.get_status(id), settled, "{id} final status differs");
    }
}
