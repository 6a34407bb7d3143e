// src/lib.rs

pub mod cli;
pub mod config;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod registry;
pub mod runner;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::types::WorkerLimit;

pub use crate::engine::Engine;
pub use crate::errors::TaskPoolError;
pub use crate::exec::{Executable, Outcome};
pub use crate::registry::{Registry, Status, TaskStatus};
pub use crate::runner::{RunSummary, TaskRunner};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task file loading (or the simulated demo workload)
/// - the runner with its worker limit
/// - one execution pass
/// - the final status report on stdout
///
/// Task failures are part of the report, not errors of this function.
pub async fn run(args: CliArgs) -> Result<()> {
    let workers = args
        .workers
        .map(WorkerLimit::new)
        .transpose()
        .context("invalid --workers")?;

    let runner = match args.demo {
        Some(count) => {
            let runner = TaskRunner::with_limit(workers.unwrap_or_default());
            demo::register_demo(&runner, count)?;
            runner
        }
        None => {
            let config_path = args.config;
            let cfg = load_and_validate(&config_path)
                .with_context(|| format!("loading task file {}", config_path.display()))?;

            if args.dry_run {
                print_dry_run(&cfg, workers);
                return Ok(());
            }

            cfg.to_runner(&config_root_dir(&config_path), workers)?
        }
    };

    if args.dry_run {
        println!("taskpool dry-run");
        println!("  workers = {}", runner.worker_limit());
        println!("  {} simulated tasks", runner.registry().len());
        return Ok(());
    }

    info!(
        tasks = runner.registry().len(),
        workers = runner.worker_limit(),
        "running tasks"
    );
    runner.run().await;

    print_report(&runner);
    Ok(())
}

/// Directory task `cwd`s are resolved against.
///
/// - If the task file path has a non-empty parent (e.g. "ci/Taskpool.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Taskpool.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// One `<id>: <status>` line per task, then the summary.
fn print_report(runner: &TaskRunner) {
    for (id, status) in runner.statuses() {
        println!("{id}: {status}");
    }
    println!();
    println!("{}", runner.summary());
}

/// Simple dry-run output: print tasks and their commands.
fn print_dry_run(cfg: &ConfigFile, workers: Option<WorkerLimit>) {
    println!("taskpool dry-run");
    println!("  workers = {}", workers.unwrap_or(cfg.workers));
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if let Some(ref cwd) = task.cwd {
            println!("      cwd: {}", cwd.display());
        }
        if !task.env.is_empty() {
            println!("      env: {:?}", task.env);
        }
    }

    debug!("dry-run complete (no execution)");
}
