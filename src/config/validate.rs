// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::resolve::DEFAULT_TASK_ALIAS;
use crate::errors::{Result, WatchrunError};
use crate::types::parse_duration;

/// Longest accepted `[config].debounce` window.
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(60 * 60);

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_tasks(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(WatchrunError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if let Some(ref debounce) = cfg.config.debounce {
        let window = parse_duration(debounce).map_err(|e| {
            WatchrunError::ConfigError(format!("[config].debounce: {e}"))
        })?;
        if window > MAX_DEBOUNCE {
            return Err(WatchrunError::ConfigError(format!(
                "[config].debounce: '{}' exceeds the maximum of {}s",
                debounce.trim(),
                MAX_DEBOUNCE.as_secs()
            )));
        }
    }

    if let Some(ref default_task) = cfg.config.default_task {
        if !cfg.task.contains_key(default_task) {
            return Err(WatchrunError::ConfigError(format!(
                "[config].default_task refers to unknown task '{}'",
                default_task
            )));
        }
    }

    if let Some(ref shell) = cfg.config.shell {
        match shell.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => {
                return Err(WatchrunError::ConfigError(
                    "[config].shell must start with a program name".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_tasks(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if name == DEFAULT_TASK_ALIAS {
            return Err(WatchrunError::ConfigError(format!(
                "task name '{}' is reserved for the default alias; use [config].default_task",
                DEFAULT_TASK_ALIAS
            )));
        }
        if task.cmd.trim().is_empty() {
            return Err(WatchrunError::ConfigError(format!(
                "task '{}' has an empty `cmd`",
                name
            )));
        }
        if task.watch.is_empty() {
            return Err(WatchrunError::ConfigError(format!(
                "task '{}' must list at least one `watch` pattern",
                name
            )));
        }
        for pat in task.watch.iter().chain(task.exclude.iter()) {
            if pat.trim().is_empty() {
                return Err(WatchrunError::ConfigError(format!(
                    "task '{}' has an empty glob pattern",
                    name
                )));
            }
            if !is_root_relative(pat) {
                return Err(WatchrunError::ConfigError(format!(
                    "task '{}': pattern '{}' must be relative to the config directory (no absolute paths or `..`)",
                    name, pat
                )));
            }
        }
    }
    Ok(())
}

/// True if `pattern` stays inside the project root: not absolute, no drive
/// or UNC prefix, and no `..` component.
fn is_root_relative(pattern: &str) -> bool {
    let pattern = pattern.trim().replace('\\', "/");
    let bytes = pattern.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    !pattern.starts_with('/') && !has_drive && !pattern.split('/').any(|c| c == "..")
}
