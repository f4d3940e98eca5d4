// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::{ExecutorBackend, RunRequest};

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the run slot in response to `RuntimeEvent`s and delegates actual
/// command execution to an `ExecutorBackend`.
///
/// All semantics live in `CoreRuntime`; this struct only does the async IO:
/// reading events from the channel and handing run requests to the executor.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// Runs until shutdown is requested, the core asks to exit (`--once`),
    /// or every event sender is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("watchrun runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!(skipped = self.core.skipped(), "runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartRun(request) => self.start_run(request).await?,
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn start_run(&mut self, request: RunRequest) -> Result<()> {
        debug!(run_id = request.run_id, cmd = %request.cmd, "dispatching run");
        self.executor.start_run(request).await
    }
}
