use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use watchrun::engine::RuntimeEvent;
use watchrun::errors::Result;
use watchrun::exec::{ExecutorBackend, RunOutcome, RunRequest, RunResult};

/// Shared view of what a [`FakeExecutor`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    inner: Arc<Mutex<RunLogInner>>,
}

#[derive(Debug, Default)]
struct RunLogInner {
    requests: Vec<RunRequest>,
    in_flight: usize,
    max_in_flight: usize,
    finished: usize,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Number of runs started.
    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    /// Runs whose completion has been delivered to the runtime.
    pub fn finished(&self) -> usize {
        self.inner.lock().unwrap().finished
    }

    /// Highest number of runs that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().unwrap().max_in_flight
    }

    fn begin(&self, request: RunRequest) {
        let mut guard = self.inner.lock().unwrap();
        guard.requests.push(request);
        guard.in_flight += 1;
        guard.max_in_flight = guard.max_in_flight.max(guard.in_flight);
    }

    fn end(&self) {
        self.inner.lock().unwrap().in_flight -= 1;
    }

    fn delivered(&self) {
        self.inner.lock().unwrap().finished += 1;
    }
}

/// A fake executor that:
/// - records every run request in a [`RunLog`]
/// - "runs" for a configurable time without spawning anything
/// - then reports `RunFinished` with a configurable outcome.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    log: RunLog,
    run_time: Duration,
    outcome: RunOutcome,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, log: RunLog) -> Self {
        Self {
            runtime_tx,
            log,
            run_time: Duration::ZERO,
            outcome: RunOutcome::Success,
        }
    }

    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn with_outcome(mut self, outcome: RunOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn start_run(
        &mut self,
        request: RunRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let log = self.log.clone();
        let run_time = self.run_time;
        let outcome = self.outcome.clone();

        Box::pin(async move {
            log.begin(request.clone());

            tokio::spawn(async move {
                tokio::time::sleep(run_time).await;
                log.end();
                let result = RunResult {
                    run_id: request.run_id,
                    cmd: request.cmd,
                    outcome,
                    elapsed: run_time,
                };
                if tx.send(RuntimeEvent::RunFinished(result)).await.is_ok() {
                    log.delivered();
                }
            });

            Ok(())
        })
    }
}
