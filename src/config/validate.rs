// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskPoolError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskPoolError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config.workers, raw.task))
    }
}

/// Check the task rules serde cannot express.
///
/// The worker limit needs no check here: `WorkerLimit` refuses zero while
/// the file is deserialized.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if name.trim().is_empty() {
            return Err(TaskPoolError::ConfigError(
                "task names must not be empty".to_string(),
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(TaskPoolError::ConfigError(format!(
                "task name '{}' must not contain whitespace",
                name
            )));
        }
        if task.cmd.trim().is_empty() {
            return Err(TaskPoolError::ConfigError(format!(
                "task '{}' has an empty `cmd`",
                name
            )));
        }
    }
    Ok(())
}
