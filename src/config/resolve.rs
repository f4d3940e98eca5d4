// src/config/resolve.rs

//! Task selection: turns the task name given on the command line (or the
//! `default` alias) into the single task this process will watch and run.

use crate::config::model::ConfigFile;
use crate::errors::{Result, WatchrunError};

/// Name that resolves to `[config].default_task`, or to the only task when
/// the file defines exactly one.
pub const DEFAULT_TASK_ALIAS: &str = "default";

/// The task selected for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub name: String,
    pub cmd: String,
    pub watch: Vec<String>,
    pub exclude: Vec<String>,
}

impl ConfigFile {
    /// Look up `requested`, following the `default` alias.
    pub fn resolve_task(&self, requested: &str) -> Result<ResolvedTask> {
        let name = if requested == DEFAULT_TASK_ALIAS {
            self.default_task_name()?
        } else {
            requested
        };

        let task = self
            .task
            .get(name)
            .ok_or_else(|| WatchrunError::UnknownTask(name.to_string()))?;

        Ok(ResolvedTask {
            name: name.to_string(),
            cmd: task.cmd.clone(),
            watch: task.watch.clone(),
            exclude: task.exclude.clone(),
        })
    }

    fn default_task_name(&self) -> Result<&str> {
        if let Some(ref name) = self.config.default_task {
            return Ok(name.as_str());
        }

        let mut names = self.task.keys();
        match (names.next(), names.next()) {
            (Some(only), None) => Ok(only.as_str()),
            _ => Err(WatchrunError::ConfigError(format!(
                "'{}' is ambiguous with {} tasks; set [config].default_task",
                DEFAULT_TASK_ALIAS,
                self.task.len()
            ))),
        }
    }
}
