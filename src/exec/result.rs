// src/exec/result.rs

use std::time::Duration;

/// One run handed from the core to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub run_id: u64,
    pub cmd: String,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Non-zero exit. `-1` when the process was killed by a signal or could
    /// not be waited on.
    Failed(i32),
    /// The shell could not be started at all.
    SpawnFailed(String),
}

/// Record of a single command execution. Output is streamed to the
/// terminal, so only the outcome and timing are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub run_id: u64,
    pub cmd: String,
    pub outcome: RunOutcome,
    pub elapsed: Duration,
}
