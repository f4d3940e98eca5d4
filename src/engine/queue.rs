// src/engine/queue.rs

use tracing::{debug, info};

use crate::types::TriggerWhileRunningBehaviour;

/// A follow-up run remembered while the command was busy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrigger {
    /// How many triggers were folded into this one follow-up.
    pub merged: usize,
    /// Path of the most recent trigger, if it came from a file event.
    pub last_path: Option<String>,
}

/// Holds triggers that arrive while a run is in progress.
///
/// Semantics:
/// - `Drop`: nothing is kept; each trigger is counted as skipped.
/// - `Queue`: at most one follow-up run is kept. Every further trigger while
///   busy is merged into it, so a burst during a long run yields exactly one
///   extra run.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    pending: Option<PendingTrigger>,
    skipped: u64,
}

impl TriggerQueue {
    pub fn new(behaviour: TriggerWhileRunningBehaviour) -> Self {
        Self {
            behaviour,
            pending: None,
            skipped: 0,
        }
    }

    /// Returns true if no follow-up run is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Number of triggers dropped so far (`Drop` mode only).
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Record a trigger that arrived while the command is running.
    ///
    /// Returns true if the trigger will lead to a run later.
    pub fn record_trigger(&mut self, path: Option<&str>) -> bool {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Drop => {
                self.skipped += 1;
                info!(
                    path = path.unwrap_or("-"),
                    skipped_total = self.skipped,
                    "command still running; trigger skipped"
                );
                false
            }
            TriggerWhileRunningBehaviour::Queue => {
                let pending = self.pending.get_or_insert(PendingTrigger {
                    merged: 0,
                    last_path: None,
                });
                pending.merged += 1;
                if let Some(p) = path {
                    pending.last_path = Some(p.to_string());
                }
                debug!(
                    path = path.unwrap_or("-"),
                    merged = pending.merged,
                    "command still running; trigger queued for one follow-up run"
                );
                true
            }
        }
    }

    /// Take the pending follow-up, leaving the queue empty.
    pub fn take_pending(&mut self) -> Option<PendingTrigger> {
        self.pending.take()
    }
}
