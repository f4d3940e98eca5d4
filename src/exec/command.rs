// src/exec/command.rs

use std::fmt;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::{error, info};

use crate::errors::{Result, WatchrunError};
use crate::exec::result::{RunOutcome, RunRequest, RunResult};

/// Host shell used to interpret command lines: `sh -c` on Unix, `cmd /C`
/// on Windows, unless overridden by `[config].shell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: String,
    args: Vec<String>,
}

impl Default for Shell {
    fn default() -> Self {
        if cfg!(windows) {
            Self::new("cmd", ["/C"])
        } else {
            Self::new("sh", ["-c"])
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl Shell {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from the `[config].shell` list (program first). Falls back to
    /// the platform default when absent or empty.
    pub fn from_config(custom: Option<&[String]>) -> Self {
        match custom {
            Some([program, args @ ..]) => Self::new(program.clone(), args.iter().cloned()),
            _ => Self::default(),
        }
    }

    /// Exit status the shell uses for "command not found": 9009 for
    /// `cmd`, the POSIX 127 for everything else.
    pub fn not_found_code(&self) -> i32 {
        let name = std::path::Path::new(&self.program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if name.eq_ignore_ascii_case("cmd") {
            9009
        } else {
            127
        }
    }

    /// The `Command` that runs `cmd_line` through this shell.
    pub fn command(&self, cmd_line: &str) -> Command {
        let mut c = Command::new(&self.program);
        c.args(&self.args).arg(cmd_line);
        c
    }
}

/// Run one command to completion with inherited stdio.
///
/// Never fails: a command that cannot be spawned is reported as
/// [`RunOutcome::SpawnFailed`] so the caller keeps watching.
pub async fn run_command(shell: &Shell, request: RunRequest) -> RunResult {
    let started = Instant::now();

    let outcome = match spawn_and_wait(shell, &request).await {
        Ok(outcome) => outcome,
        Err(err @ WatchrunError::SpawnError { .. }) => {
            error!(run_id = request.run_id, error = %err, "spawn error");
            RunOutcome::SpawnFailed(err.to_string())
        }
        Err(err) => {
            error!(run_id = request.run_id, error = %err, "error while waiting for command");
            RunOutcome::Failed(-1)
        }
    };

    RunResult {
        run_id: request.run_id,
        cmd: request.cmd,
        outcome,
        elapsed: started.elapsed(),
    }
}

async fn spawn_and_wait(shell: &Shell, request: &RunRequest) -> Result<RunOutcome> {
    info!(run_id = request.run_id, cmd = %request.cmd, "starting command");

    let mut cmd = shell.command(&request.cmd);
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| WatchrunError::SpawnError {
        cmd: request.cmd.clone(),
        source,
    })?;

    let status = child.wait().await?;

    let code = status.code().unwrap_or(-1);
    if code == shell.not_found_code() {
        return Err(WatchrunError::SpawnError {
            cmd: request.cmd.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{shell} exited with {code}: command not found"),
            ),
        });
    }

    info!(
        run_id = request.run_id,
        exit_code = code,
        success = status.success(),
        "command process exited"
    );

    Ok(if status.success() {
        RunOutcome::Success
    } else {
        RunOutcome::Failed(code)
    })
}
