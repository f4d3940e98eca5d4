// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs the task's command through the host shell with
//! `tokio::process::Command`, its output going straight to our stdout and
//! stderr, and reports each finished run back to the runtime as a
//! `RuntimeEvent::RunFinished`.
//!
//! - [`result`] holds the run request/result records.
//! - [`command`] builds the shell invocation and runs one command to
//!   completion.
//! - [`executor_loop`] owns the background loop that executes requests one
//!   at a time.
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` used in production; tests swap in a fake.

pub mod backend;
pub mod command;
pub mod executor_loop;
pub mod result;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use command::{run_command, Shell};
pub use executor_loop::spawn_executor;
pub use result::{RunOutcome, RunRequest, RunResult};
