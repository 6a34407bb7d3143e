#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use taskpool::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use taskpool::types::WorkerLimit;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    /// Panics on `0`: a task file with zero workers never deserializes.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.config.workers = WorkerLimit::new(workers).expect("worker limit must be >= 1");
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    /// The unvalidated config, for tests that expect validation to fail.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                cwd: None,
                env: BTreeMap::new(),
            },
        }
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.task.cwd = Some(PathBuf::from(dir));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.task.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
