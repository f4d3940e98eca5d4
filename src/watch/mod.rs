// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the task's `watch` / `exclude` glob patterns into a
//!   [`WatchSpec`].
//! - Working out which directories the notifier must observe.
//! - Wiring up a cross-platform filesystem watcher (`notify`) and turning
//!   matching events into `RuntimeEvent::Triggered`, optionally coalescing
//!   bursts.
//!
//! It does **not** know whether a command is running; busy handling lives in
//! the engine.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{WatchSpec, WatchTarget};
pub use watcher::{spawn_watcher, WatcherHandle};
