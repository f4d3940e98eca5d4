// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning processes
//! itself, so tests can swap in a fake that records run requests and
//! reports completions on its own schedule.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::exec::command::Shell;
use crate::exec::executor_loop::spawn_executor;
use crate::exec::result::RunRequest;

/// Trait abstracting how a run is executed.
///
/// Implementations must eventually send exactly one
/// `RuntimeEvent::RunFinished` per accepted request, including when the
/// command cannot be spawned.
pub trait ExecutorBackend: Send {
    fn start_run(
        &mut self,
        request: RunRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
///
/// Wraps the loop from [`spawn_executor`]; `start_run` just forwards the
/// request over its channel.
pub struct RealExecutorBackend {
    tx: mpsc::Sender<RunRequest>,
}

impl RealExecutorBackend {
    /// Spawns the background executor loop immediately.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, shell: Shell) -> Self {
        let tx = spawn_executor(runtime_tx, shell);
        Self { tx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn start_run(
        &mut self,
        request: RunRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(request).await.map_err(Error::from)?;
            Ok(())
        })
    }
}
