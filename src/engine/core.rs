// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing run requests to the executor
//! - handling Ctrl+C / shutdown
//!
//! The core has no Tokio types, channels, filesystem or processes, so it is
//! unit tested directly.

use tracing::debug;

use crate::engine::event_handlers::{handle_run_finished, handle_trigger, CoreStep};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::exec::RunRequest;
use crate::types::TriggerWhileRunningBehaviour;

/// Whether the command is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { run_id: u64 },
}

/// The single run slot: the command line plus its `Idle`/`Running` state.
#[derive(Debug)]
pub struct RunSlot {
    cmd: String,
    state: RunState,
    next_run_id: u64,
}

impl RunSlot {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            state: RunState::Idle,
            next_run_id: 1,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RunState::Idle
    }

    /// Move `Idle -> Running` and build the request for the executor.
    ///
    /// Callers must check [`RunSlot::is_idle`] first.
    pub fn begin(&mut self) -> RunRequest {
        debug_assert!(self.is_idle(), "begin() called while a run is in flight");
        let run_id = self.next_run_id;
        self.next_run_id += 1;
        self.state = RunState::Running { run_id };
        debug!(run_id, "run slot: Idle -> Running");
        RunRequest {
            run_id,
            cmd: self.cmd.clone(),
        }
    }

    /// Move `Running -> Idle` if `run_id` is the run in flight.
    ///
    /// Returns false (and leaves the state alone) for unknown or stale ids.
    pub fn finish(&mut self, run_id: u64) -> bool {
        match self.state {
            RunState::Running { run_id: current } if current == run_id => {
                self.state = RunState::Idle;
                debug!(run_id, "run slot: Running -> Idle");
                true
            }
            _ => false,
        }
    }
}

/// Pure core runtime state.
///
/// This owns:
/// - the run slot
/// - the trigger queue
/// - runtime options (e.g. `exit_when_idle`)
#[derive(Debug)]
pub struct CoreRuntime {
    slot: RunSlot,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(
        cmd: impl Into<String>,
        behaviour: TriggerWhileRunningBehaviour,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            slot: RunSlot::new(cmd),
            queue: TriggerQueue::new(behaviour),
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.slot.is_idle()
    }

    pub fn state(&self) -> RunState {
        self.slot.state()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Triggers dropped because the command was busy.
    pub fn skipped(&self) -> u64 {
        self.queue.skipped()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Triggered { reason, path } => {
                handle_trigger(&mut self.slot, &mut self.queue, reason, path)
            }
            RuntimeEvent::RunFinished(result) => handle_run_finished(
                &mut self.slot,
                &mut self.queue,
                &self.options,
                result,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
