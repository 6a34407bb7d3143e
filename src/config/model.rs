// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;
use crate::exec::{command_with, CommandSpec};
use crate::runner::TaskRunner;
use crate::types::WorkerLimit;

/// Task file exactly as read from TOML.
///
/// ```toml
/// [config]
/// workers = 3
///
/// [task.build]
/// cmd = "cargo build"
///
/// [task.lint]
/// cmd = "cargo clippy"
/// cwd = "crates/core"
/// env = { RUSTFLAGS = "-Dwarnings" }
/// ```
///
/// All sections are optional. Turn it into a [`ConfigFile`] with
/// `ConfigFile::try_from`, which validates it.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Global runner settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task identifier.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Maximum number of tasks executing at once. A zero is rejected
    /// while deserializing.
    #[serde(default)]
    pub workers: WorkerLimit,
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            workers: WorkerLimit::default(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Shell command to execute.
    pub cmd: String,

    /// Working directory, relative to the task file's directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variables for the command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Validated task file.
///
/// Only constructed through validation (`TryFrom<RawConfigFile>`), so every
/// task has a usable name and command.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub workers: WorkerLimit,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(workers: WorkerLimit, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { workers, task }
    }

    /// Command spec for one task, with `cwd` resolved against `root_dir`.
    pub fn command_spec(task: &TaskConfig, root_dir: &Path) -> CommandSpec {
        CommandSpec {
            cmd: task.cmd.clone(),
            cwd: Some(match &task.cwd {
                Some(cwd) => root_dir.join(cwd),
                None => root_dir.to_path_buf(),
            }),
            env: task.env.clone(),
        }
    }

    /// Build a runner with one shell-command task per `[task.<name>]`.
    ///
    /// `workers` overrides `[config].workers` when given.
    pub fn to_runner(&self, root_dir: &Path, workers: Option<WorkerLimit>) -> Result<TaskRunner> {
        let runner = TaskRunner::with_limit(workers.unwrap_or(self.workers));
        for (name, task) in &self.task {
            runner.register_executable(name.clone(), command_with(Self::command_spec(task, root_dir)))?;
        }
        Ok(runner)
    }
}
