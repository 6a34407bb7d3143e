// src/exec/command.rs

//! Shell-command executables.
//!
//! A command task runs `sh -c <cmd>` (or `cmd /C <cmd>` on Windows) and
//! reports:
//! - exit status 0 → `Ok(<trimmed stdout>)`, or `"exit status 0"` when the
//!   command printed nothing;
//! - non-zero exit → `Err("exit code N: <last stderr line>")`;
//! - spawn/wait errors → `Err(<error chain>)`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::exec::{Executable, Outcome};

/// Everything needed to launch one command task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub cmd: String,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            ..Self::default()
        }
    }
}

/// Executable running `cmd` through the platform shell.
pub fn command(cmd: impl Into<String>) -> Executable {
    command_with(CommandSpec::new(cmd))
}

/// Executable running the given command spec through the platform shell.
pub fn command_with(spec: CommandSpec) -> Executable {
    Executable::Async(Box::pin(run_command(spec)))
}

async fn run_command(spec: CommandSpec) -> Outcome {
    match run_command_inner(&spec).await {
        Ok(outcome) => outcome,
        Err(err) => Err(format!("{err:#}")),
    }
}

async fn run_command_inner(spec: &CommandSpec) -> Result<Outcome> {
    info!(cmd = %spec.cmd, "starting task process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&spec.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&spec.cmd);
        c
    };

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for command '{}'", spec.cmd))?;

    // Drain both pipes concurrently so neither buffer fills up.
    let stdout_reader = child.stdout.take().map(|mut stdout| {
        tokio::spawn(async move {
            let mut buf = String::new();
            stdout.read_to_string(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        })
    });

    let stderr_reader = child.stderr.take().map(|stderr| {
        let cmd_text = spec.cmd.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut last = None;
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd_text, "stderr: {}", line);
                if !line.trim().is_empty() {
                    last = Some(line);
                }
            }
            last
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of command '{}'", spec.cmd))?;

    let stdout = match stdout_reader {
        Some(handle) => handle
            .await
            .context("joining stdout reader")?
            .context("reading stdout")?,
        None => String::new(),
    };
    let last_stderr = match stderr_reader {
        Some(handle) => handle.await.context("joining stderr reader")?,
        None => None,
    };

    let code = status.code().unwrap_or(-1);
    info!(
        cmd = %spec.cmd,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    if status.success() {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            Ok(Ok("exit status 0".to_string()))
        } else {
            Ok(Ok(trimmed.to_string()))
        }
    } else {
        match last_stderr {
            Some(line) => Ok(Err(format!("exit code {code}: {}", line.trim()))),
            None => Ok(Err(format!("exit code {code}"))),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    async fn outcome_of(exec: Executable) -> Outcome {
        match exec {
            Executable::Async(fut) => fut.await,
            Executable::Blocking(_) => panic!("command executables are async"),
        }
    }

    #[tokio::test]
    async fn successful_command_reports_stdout() {
        let outcome = outcome_of(command("echo hello")).await;
        assert_eq!(outcome, Ok("hello".to_string()));
    }

    #[tokio::test]
    async fn silent_command_reports_exit_status() {
        let outcome = outcome_of(command("true")).await;
        assert_eq!(outcome, Ok("exit status 0".to_string()));
    }

    #[tokio::test]
    async fn failing_command_reports_code_and_stderr() {
        let outcome = outcome_of(command("echo oops >&2; exit 3")).await;
        assert_eq!(outcome, Err("exit code 3: oops".to_string()));
    }

    #[tokio::test]
    async fn env_and_cwd_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = CommandSpec::new("echo \"$GREETING\" && pwd");
        spec.cwd = Some(dir.path().to_path_buf());
        spec.env.insert("GREETING".to_string(), "hi".to_string());

        let stdout = outcome_of(command_with(spec)).await.unwrap();
        let mut lines = stdout.lines();
        assert_eq!(lines.next(), Some("hi"));
        let reported = PathBuf::from(lines.next().unwrap());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
