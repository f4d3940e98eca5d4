// tests/config_loading.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;
use watchrun::config::{load_and_validate, ConfigFile, DEFAULT_TASK_ALIAS};
use watchrun::errors::WatchrunError;
use watchrun::types::TriggerWhileRunningBehaviour;
use watchrun::watch::WatchSpec;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str, needle: &str) {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(WatchrunError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn demo_config_resolves_default_alias_to_watch_task() -> TestResult {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest_dir.join("demos/Watchrun.toml"))?;

    assert_eq!(cfg.behaviour(), TriggerWhileRunningBehaviour::Drop);
    assert_eq!(cfg.debounce(), None);

    let task = cfg.resolve_task(DEFAULT_TASK_ALIAS)?;
    assert_eq!(task, cfg.resolve_task("watch")?);
    assert_eq!(task.cmd, "pwd; PYTHONPATH=. python tests/test.py");

    let spec = WatchSpec::from_task(&task)?;
    assert!(spec.matches("databacon/models.py"));
    assert!(spec.matches("tests/test.py"));
    assert!(!spec.matches("tests/starwars/schema.py"));
    assert!(!spec.matches("setup.py"));

    Ok(())
}

#[test]
fn queue_demo_carries_policy_debounce_and_shell() -> TestResult {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest_dir.join("demos/queue-debounce.toml"))?;

    assert_eq!(cfg.behaviour(), TriggerWhileRunningBehaviour::Queue);
    assert_eq!(cfg.debounce(), Some(Duration::from_millis(150)));
    assert_eq!(
        cfg.config.shell.as_deref(),
        Some(&["bash".to_string(), "-c".to_string()][..])
    );

    let task = cfg.resolve_task("default")?;
    let spec = WatchSpec::from_task(&task)?;
    assert!(spec.matches("src/engine/core.rs"));
    assert!(spec.matches("Cargo.toml"));
    assert!(!spec.matches("src/engine/generated_tables.rs"));

    Ok(())
}

#[test]
fn zero_debounce_means_off() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .debounce("0ms")
        .with_task("t", TaskConfigBuilder::new("true").watch("src/*").build())
        .build();
    assert_eq!(cfg.debounce(), None);
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let result = load_and_validate("/watchrun/definitely/missing/Watchrun.toml");
    assert!(matches!(result, Err(WatchrunError::IoError(_))));
}

#[test]
fn malformed_toml_is_toml_error() {
    let file = write_config("[task.a\ncmd = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchrunError::TomlError(_))
    ));
}

#[test]
fn unknown_behaviour_is_rejected_at_parse_time() {
    let file = write_config(
        r#"
[config]
triggered_while_running_behaviour = "cancel"

[task.a]
watch = ["src/*"]
cmd = "true"
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchrunError::TomlError(_))
    ));
}

#[test]
fn config_without_tasks_is_rejected() {
    expect_config_error("[config]\n", "at least one [task.<name>]");
}

#[test]
fn empty_command_is_rejected() {
    expect_config_error(
        r#"
[task.a]
watch = ["src/*"]
cmd = "   "
"#,
        "empty `cmd`",
    );
}

#[test]
fn empty_watch_list_is_rejected() {
    expect_config_error(
        r#"
[task.a]
watch = []
cmd = "true"
"#,
        "at least one `watch` pattern",
    );
}

#[test]
fn task_named_default_is_reserved() {
    expect_config_error(
        r#"
[task.default]
watch = ["src/*"]
cmd = "true"
"#,
        "reserved",
    );
}

#[test]
fn default_task_must_exist() {
    expect_config_error(
        r#"
[config]
default_task = "nope"

[task.a]
watch = ["src/*"]
cmd = "true"
"#,
        "unknown task 'nope'",
    );
}

#[test]
fn bad_debounce_is_rejected() {
    expect_config_error(
        r#"
[config]
debounce = "soon"

[task.a]
watch = ["src/*"]
cmd = "true"
"#,
        "[config].debounce",
    );
}

#[test]
fn empty_shell_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .shell(&[])
        .with_task("a", TaskConfigBuilder::new("true").watch("src/*").build())
        .build_raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(WatchrunError::ConfigError(_))
    ));
}

#[test]
fn overflowing_debounce_is_rejected() {
    expect_config_error(
        r#"
[config]
debounce = "5124095576030432h"

[task.a]
watch = ["src/*"]
cmd = "true"
"#,
        "too large",
    );
}

#[test]
fn debounce_above_maximum_is_rejected() {
    expect_config_error(
        r#"
[config]
debounce = "18446744073709551615s"

[task.a]
watch = ["src/*"]
cmd = "true"
"#,
        "exceeds the maximum",
    );
}

#[test]
fn debounce_at_maximum_is_accepted() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .debounce("60m")
        .with_task("t", TaskConfigBuilder::new("true").watch("src/*").build())
        .build();
    assert_eq!(cfg.debounce(), Some(Duration::from_secs(3600)));
    Ok(())
}

#[test]
fn absolute_pattern_is_rejected() {
    expect_config_error(
        r#"
[task.a]
watch = ["/abs/*.py"]
cmd = "true"
"#,
        "must be relative",
    );
}

#[test]
fn parent_escaping_pattern_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_task(
            "a",
            TaskConfigBuilder::new("true")
                .watch("src/*.py")
                .exclude("../x/*.py")
                .build(),
        )
        .build_raw();
    match ConfigFile::try_from(raw) {
        Err(WatchrunError::ConfigError(msg)) => assert!(msg.contains("../x/*.py")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
