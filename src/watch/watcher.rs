// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{Result, WatchrunError};
use crate::watch::event_handler::matching_path;
use crate::watch::patterns::WatchSpec;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping the handle stops
/// file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish_non_exhaustive()
    }
}

/// Start watching every directory `spec` needs and forward matching
/// changes to the runtime as `RuntimeEvent::Triggered`.
///
/// - `root` is the project root against which all glob patterns are
///   evaluated.
/// - `debounce`, when set, coalesces all matching events that arrive within
///   that window after the first one into a single trigger.
///
/// Fails with `WatchrunError::SetupError` before any event is delivered if
/// the root or a watched directory does not exist or the notifier refuses
/// it. Must be called from within a Tokio runtime.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    spec: WatchSpec,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Option<Duration>,
) -> Result<WatcherHandle> {
    if let Some(window) = debounce {
        if Instant::now().checked_add(window).is_none() {
            return Err(WatchrunError::ConfigError(format!(
                "debounce window of {}s is too large",
                window.as_secs()
            )));
        }
    }

    let root = root.into();
    let root = root
        .canonicalize()
        .map_err(|e| WatchrunError::setup(&root, e))?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event_tx.send(event).is_err() {
                    debug!("watch event receiver dropped");
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )
    .map_err(|e| WatchrunError::setup(&root, e))?;

    for target in spec.watch_targets() {
        let dir = root.join(&target.dir);
        if !dir.is_dir() {
            return Err(WatchrunError::setup(dir, "directory does not exist"));
        }
        let mode = if target.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&dir, mode)
            .map_err(|e| WatchrunError::setup(&dir, e))?;
        info!(dir = ?dir, recursive = target.recursive, "watching directory");
    }

    info!(patterns = ?spec.patterns(), root = ?root, "file watcher started");

    tokio::spawn(forward_events(root, spec, event_rx, runtime_tx, debounce));

    Ok(WatcherHandle { _inner: watcher })
}

/// Consume notify events and send one trigger per matching change (or per
/// coalesced burst).
async fn forward_events(
    root: PathBuf,
    spec: WatchSpec,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Option<Duration>,
) {
    while let Some(event) = event_rx.recv().await {
        debug!(?event, "received notify event");

        let Some(path) = matching_path(&root, &spec, &event) else {
            continue;
        };

        if let Some(window) = debounce {
            let coalesced = drain_window(&root, &spec, &mut event_rx, window).await;
            if coalesced > 0 {
                debug!(path = %path, coalesced, "coalesced burst into one trigger");
            }
        }

        debug!(path = %path, "watch match -> trigger");
        if runtime_tx.send(RuntimeEvent::file_changed(path)).await.is_err() {
            // The runtime is gone; nothing left to notify.
            debug!("runtime channel closed; stopping watcher loop");
            return;
        }
    }

    debug!("watcher event loop finished");
}

/// Swallow events until `window` has elapsed; returns how many of them
/// matched `spec`.
async fn drain_window(
    root: &Path,
    spec: &WatchSpec,
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
    window: Duration,
) -> usize {
    let Some(deadline) = Instant::now().checked_add(window) else {
        warn!(window = ?window, "debounce window overflows the clock; not coalescing");
        return 0;
    };
    let mut coalesced = 0;

    loop {
        tokio::select! {
            _ = sleep_until(deadline) => break,
            next = event_rx.recv() => match next {
                Some(event) => {
                    if matching_path(root, spec, &event).is_some() {
                        coalesced += 1;
                    }
                }
                None => break,
            },
        }
    }

    coalesced
}
