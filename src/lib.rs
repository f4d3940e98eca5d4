// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::{ConfigFile, ResolvedTask};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::exec::{ExecutorBackend, RealExecutorBackend, Shell};
use crate::types::TriggerWhileRunningBehaviour;
use crate::watch::{spawn_watcher, WatchSpec};

/// Settings for [`start`] that do not come from the task itself.
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Directory the task's patterns are relative to.
    pub root: PathBuf,
    pub behaviour: TriggerWhileRunningBehaviour,
    pub debounce: Option<Duration>,
    /// Run the command once instead of watching.
    pub once: bool,
}

impl StartOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            behaviour: TriggerWhileRunningBehaviour::default(),
            debounce: None,
            once: false,
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and task resolution
/// - the real process executor
/// - Ctrl-C handling
/// - [`start`], which owns the watcher and the runtime loop
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config_path = args.config.clone();
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config from {:?}", config_path))?;
    let task = cfg.resolve_task(&args.task)?;
    let root = config_root_dir(&config_path);

    if args.dry_run {
        print_dry_run(&cfg, &task, &root)?;
        return Ok(());
    }

    let shell = Shell::from_config(cfg.config.shell.as_deref());
    let options = StartOptions {
        root,
        behaviour: cfg.behaviour(),
        debounce: cfg.debounce(),
        once: args.once,
    };

    info!(task = %task.name, cmd = %task.cmd, "starting watchrun");

    start(
        &task,
        options,
        move |runtime_tx| RealExecutorBackend::new(runtime_tx, shell),
        ctrl_c(),
    )
    .await?;

    Ok(())
}

/// Watch `task`'s patterns and run its command on every relevant change
/// until `shutdown` resolves.
///
/// - The watcher is set up before the executor exists: a missing directory
///   fails with `SetupError` and nothing is ever run.
/// - `make_executor` receives the runtime's event sender so the backend can
///   report `RunFinished`.
/// - With `options.once`, no watcher is started; the command runs once and
///   the function returns when it finishes.
pub async fn start<E, F, S>(
    task: &ResolvedTask,
    options: StartOptions,
    make_executor: F,
    shutdown: S,
) -> errors::Result<()>
where
    E: ExecutorBackend,
    F: FnOnce(mpsc::Sender<RuntimeEvent>) -> E,
    S: Future<Output = ()> + Send + 'static,
{
    let spec = WatchSpec::from_task(task)?;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Kept alive for the whole loop; dropping it stops watching.
    let _watcher = if options.once {
        None
    } else {
        Some(spawn_watcher(
            &options.root,
            spec,
            rt_tx.clone(),
            options.debounce,
        )?)
    };

    let executor = make_executor(rt_tx.clone());

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    if options.once {
        rt_tx
            .send(RuntimeEvent::Triggered {
                reason: TriggerReason::Manual,
                path: None,
            })
            .await
            .map_err(anyhow::Error::from)?;
    }
    drop(rt_tx);

    let core = CoreRuntime::new(
        task.cmd.clone(),
        options.behaviour,
        RuntimeOptions {
            exit_when_idle: options.once,
        },
    );

    Runtime::new(core, rt_rx, executor).run().await
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed, never
/// resolves (the process then stops the usual way, by being killed).
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("interrupt received");
}

/// Figure out the project root the patterns are relative to.
///
/// - If the config path has a non-empty parent (e.g. "ci/Watchrun.toml"),
///   that directory is used.
/// - For a bare filename like "Watchrun.toml" (parent = ""), fall back to
///   the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Dry-run output: resolved task, policy, and the directories that would be
/// watched.
fn print_dry_run(cfg: &ConfigFile, task: &ResolvedTask, root: &Path) -> errors::Result<()> {
    let spec = WatchSpec::from_task(task)?;
    let shell = Shell::from_config(cfg.config.shell.as_deref());

    println!("watchrun dry-run");
    println!(
        "  config.triggered_while_running_behaviour = {:?}",
        cfg.behaviour()
    );
    match cfg.debounce() {
        Some(d) => println!("  config.debounce = {}ms", d.as_millis()),
        None => println!("  config.debounce = off"),
    }
    println!("  shell = {shell}");
    println!();

    println!("task {}:", task.name);
    println!("  cmd: {}", task.cmd);
    println!("  watch: {:?}", spec.patterns());
    if !spec.exclude().is_empty() {
        println!("  exclude: {:?}", spec.exclude());
    }

    println!("  directories:");
    for target in spec.watch_targets() {
        let dir = root.join(&target.dir);
        let mode = if target.recursive { "recursive" } else { "flat" };
        let missing = if dir.is_dir() { "" } else { " (missing)" };
        println!("    - {} [{mode}]{missing}", dir.display());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_config_parent() {
        assert_eq!(
            config_root_dir(Path::new("ci/Watchrun.toml")),
            PathBuf::from("ci")
        );
    }

    #[test]
    fn bare_config_name_uses_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config_root_dir(Path::new("Watchrun.toml")), cwd);
    }
}
