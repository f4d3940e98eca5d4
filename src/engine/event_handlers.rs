// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{error, info, warn};

use crate::engine::core::RunSlot;
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TriggerReason};
use crate::exec::{RunOutcome, RunRequest, RunResult};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Hand this run to the executor.
    StartRun(RunRequest),
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a trigger.
///
/// - `Idle`: start a run right away.
/// - `Running`: hand the trigger to the queue, which drops it or folds it
///   into the single follow-up run depending on the configured behaviour.
pub fn handle_trigger(
    slot: &mut RunSlot,
    queue: &mut TriggerQueue,
    reason: TriggerReason,
    path: Option<String>,
) -> CoreStep {
    if slot.is_idle() {
        info!(?reason, path = path.as_deref().unwrap_or("-"), "change detected; running command");
        let request = slot.begin();
        return CoreStep::continue_with(vec![CoreCommand::StartRun(request)]);
    }

    queue.record_trigger(path.as_deref());
    CoreStep::continue_with(Vec::new())
}

/// Handle the end of a run (any exit status, or a spawn failure).
pub fn handle_run_finished(
    slot: &mut RunSlot,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    result: RunResult,
) -> CoreStep {
    if !slot.finish(result.run_id) {
        warn!(
            run_id = result.run_id,
            state = ?slot.state(),
            "completion for a run that is not in flight; ignoring"
        );
        return CoreStep::continue_with(Vec::new());
    }

    report(&result);

    let mut commands = Vec::new();

    if let Some(pending) = queue.take_pending() {
        info!(
            merged = pending.merged,
            path = pending.last_path.as_deref().unwrap_or("-"),
            "starting queued follow-up run"
        );
        commands.push(CoreCommand::StartRun(slot.begin()));
    }

    // In `--once` mode, stop as soon as nothing is in flight or queued.
    let mut keep_running = true;
    if options.exit_when_idle && slot.is_idle() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

fn report(result: &RunResult) {
    let elapsed_ms = result.elapsed.as_millis() as u64;
    match &result.outcome {
        RunOutcome::Success => info!(
            run_id = result.run_id,
            elapsed_ms,
            "command finished successfully"
        ),
        RunOutcome::Failed(code) => warn!(
            run_id = result.run_id,
            exit_code = code,
            elapsed_ms,
            "command failed"
        ),
        RunOutcome::SpawnFailed(reason) => error!(
            run_id = result.run_id,
            cmd = %result.cmd,
            error = %reason,
            "command could not be started; still watching"
        ),
    }
}
