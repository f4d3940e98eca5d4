// src/exec/executor_loop.rs

//! Background loop that executes run requests.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::exec::command::{run_command, Shell};
use crate::exec::result::RunRequest;

/// Spawn the background executor loop.
///
/// The returned sender is what `RealExecutorBackend` forwards run requests
/// to. Each request is awaited to completion before the next one is taken,
/// so the executor never has more than one process alive.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    shell: Shell,
) -> mpsc::Sender<RunRequest> {
    let (tx, mut rx) = mpsc::channel::<RunRequest>(4);

    tokio::spawn(async move {
        info!(shell = %shell, "executor loop started");

        while let Some(request) = rx.recv().await {
            let result = run_command(&shell, request).await;
            if runtime_tx
                .send(RuntimeEvent::RunFinished(result))
                .await
                .is_err()
            {
                debug!("runtime channel closed; dropping run result");
                break;
            }
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
