// src/engine/mod.rs

//! Orchestration engine for watchrun.
//!
//! This module ties together:
//! - the run slot (`Idle` / `Running`), which enforces at most one command
//!   in flight
//! - the trigger queue (what happens to triggers that arrive while the
//!   command is running)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - run completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::exec::RunResult;

/// Why a run was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// A watched file was created, modified or removed.
    FileWatch,
    /// Requested directly (`--once`).
    Manual,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once the command is idle and nothing is
    /// queued (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, executor and signal
/// handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A run should be started (subject to the busy policy).
    Triggered {
        reason: TriggerReason,
        /// Root-relative path that caused the trigger, if any.
        path: Option<String>,
    },
    /// The command finished, failed, or could not be spawned.
    RunFinished(RunResult),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

impl RuntimeEvent {
    /// Convenience constructor for a file-watch trigger.
    pub fn file_changed(path: impl Into<String>) -> Self {
        RuntimeEvent::Triggered {
            reason: TriggerReason::FileWatch,
            path: Some(path.into()),
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::{CoreRuntime, RunState};
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::{PendingTrigger, TriggerQueue};
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
