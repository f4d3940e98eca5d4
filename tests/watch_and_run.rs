// tests/watch_and_run.rs
//
// End-to-end: real `notify` watcher on a temp directory, driven through
// `watchrun::start`.

mod common;
use crate::common::fake_executor::{FakeExecutor, RunLog};
use crate::common::{init_tracing, wait_until, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::oneshot;

use watchrun::config::ResolvedTask;
use watchrun::errors::WatchrunError;
use watchrun::exec::{RealExecutorBackend, Shell};
use watchrun::types::TriggerWhileRunningBehaviour;
use watchrun::{start, StartOptions};

type TestResult = Result<(), Box<dyn Error>>;

fn task(cmd: &str, watch: &[&str]) -> ResolvedTask {
    ResolvedTask {
        name: "watch".to_string(),
        cmd: cmd.to_string(),
        watch: watch.iter().map(|s| s.to_string()).collect(),
        exclude: vec![],
    }
}

fn shutdown_pair() -> (oneshot::Sender<()>, impl std::future::Future<Output = ()>) {
    let (tx, rx) = oneshot::channel::<()>();
    (tx, async move {
        let _ = rx.await;
    })
}

/// Time for the notifier to settle before the first write.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(300)).await;
}

fn touch(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write watched file");
}

#[tokio::test]
async fn missing_directory_is_setup_error_and_runs_nothing() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let log = RunLog::new();
    let exec_log = log.clone();
    let (_stop, shutdown) = shutdown_pair();

    let result = with_timeout(start(
        &task("echo done", &["src/*.ext", "missing/*.ext"]),
        StartOptions::new(dir.path()),
        move |tx| FakeExecutor::new(tx, exec_log),
        shutdown,
    ))
    .await;

    match result {
        Err(WatchrunError::SetupError { path, .. }) => {
            assert!(path.ends_with("src") || path.ends_with("missing"));
        }
        other => panic!("expected SetupError, got {other:?}"),
    }
    assert_eq!(log.count(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_root_is_setup_error() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().join("nope");
    let (_stop, shutdown) = shutdown_pair();
    let log = RunLog::new();

    let result = start(
        &task("echo done", &["*.ext"]),
        StartOptions::new(&root),
        move |tx| FakeExecutor::new(tx, log),
        shutdown,
    )
    .await;

    assert!(matches!(result, Err(WatchrunError::SetupError { .. })));
    Ok(())
}

#[tokio::test]
async fn unrepresentable_debounce_fails_before_watching() -> TestResult {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("src"))?;
    let (_stop, shutdown) = shutdown_pair();
    let log = RunLog::new();
    let exec_log = log.clone();

    let mut options = StartOptions::new(dir.path());
    options.debounce = Some(Duration::MAX);

    let result = with_timeout(start(
        &task("echo done", &["src/*.ext"]),
        options,
        move |tx| FakeExecutor::new(tx, exec_log),
        shutdown,
    ))
    .await;

    match result {
        Err(WatchrunError::ConfigError(msg)) => assert!(msg.contains("too large")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(log.count(), 0);
    Ok(())
}

#[tokio::test]
async fn modifying_watched_file_triggers_one_run() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::create_dir(dir.path().join("src"))?;
    fs::create_dir(dir.path().join("src").join("nested"))?;

    let log = RunLog::new();
    let exec_log = log.clone();
    let (stop, shutdown) = shutdown_pair();
    let root = dir.path().to_path_buf();

    let handle = tokio::spawn(async move {
        start(
            &task("echo done", &["src/*.ext"]),
            StartOptions::new(root),
            move |tx| {
                FakeExecutor::new(tx, exec_log).with_run_time(Duration::from_millis(500))
            },
            shutdown,
        )
        .await
    });
    settle().await;

    // Not matched: wrong extension, and `*` does not recurse.
    touch(&dir.path().join("src").join("a.txt"), "x");
    touch(&dir.path().join("src").join("nested").join("a.ext"), "x");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(log.count(), 0);

    // One modification: the follow-on notify events for the same write land
    // while the (fake) command is still running and are dropped.
    touch(&dir.path().join("src").join("a.ext"), "one");
    let l = log.clone();
    assert!(wait_until(Duration::from_secs(5), move || l.finished() >= 1).await);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(log.count(), 1);

    // Idle again: a later modification runs again.
    touch(&dir.path().join("src").join("a.ext"), "two");
    let l = log.clone();
    assert!(wait_until(Duration::from_secs(5), move || l.count() >= 2).await);

    assert_eq!(log.max_in_flight(), 1);
    assert!(log.requests().iter().all(|r| r.cmd == "echo done"));

    let _ = stop.send(());
    with_timeout(handle).await??;
    Ok(())
}

#[tokio::test]
async fn debounce_coalesces_a_burst() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::create_dir(dir.path().join("src"))?;

    let log = RunLog::new();
    let exec_log = log.clone();
    let (stop, shutdown) = shutdown_pair();
    let root = dir.path().to_path_buf();

    let handle = tokio::spawn(async move {
        let mut options = StartOptions::new(root);
        options.behaviour = TriggerWhileRunningBehaviour::Queue;
        options.debounce = Some(Duration::from_millis(400));
        start(
            &task("echo done", &["src/*.ext"]),
            options,
            move |tx| FakeExecutor::new(tx, exec_log),
            shutdown,
        )
        .await
    });
    settle().await;

    for i in 0..5 {
        touch(&dir.path().join("src").join(format!("f{i}.ext")), "x");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let l = log.clone();
    assert!(wait_until(Duration::from_secs(5), move || l.finished() >= 1).await);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(log.count(), 1);

    let _ = stop.send(());
    with_timeout(handle).await??;
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failing_real_command_keeps_watching() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::create_dir(dir.path().join("src"))?;
    let marker = dir.path().join("runs.log");
    let cmd = format!("echo run >> '{}'; exit 1", marker.display());

    let (stop, shutdown) = shutdown_pair();
    let root = dir.path().to_path_buf();

    let handle = tokio::spawn(async move {
        start(
            &task(&cmd, &["src/*.ext"]),
            StartOptions::new(root),
            move |tx| RealExecutorBackend::new(tx, Shell::default()),
            shutdown,
        )
        .await
    });
    settle().await;

    let runs = |path: &Path| {
        fs::read_to_string(path)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    };

    touch(&dir.path().join("src").join("a.ext"), "one");
    let m = marker.clone();
    assert!(wait_until(Duration::from_secs(5), move || runs(&m) >= 1).await);

    tokio::time::sleep(Duration::from_millis(300)).await;
    touch(&dir.path().join("src").join("a.ext"), "two");
    let m = marker.clone();
    assert!(wait_until(Duration::from_secs(5), move || runs(&m) >= 2).await);

    let _ = stop.send(());
    with_timeout(handle).await??;
    Ok(())
}
