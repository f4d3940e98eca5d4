// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{parse_duration, TriggerWhileRunningBehaviour};

/// Top-level configuration exactly as read from a TOML file.
///
/// ```toml
/// [config]
/// triggered_while_running_behaviour = "drop"
/// debounce = "100ms"
/// default_task = "watch"
///
/// [task.watch]
/// watch = ["databacon/*py", "tests/*py"]
/// cmd = "pwd; PYTHONPATH=. python tests/test.py"
/// ```
///
/// This is unchecked; convert it into a [`ConfigFile`] with `try_from` to get
/// validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// `"drop"` (default) or `"queue"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Coalescing window such as `"100ms"`. Absent or zero means every
    /// matching event is its own trigger.
    #[serde(default)]
    pub debounce: Option<String>,

    /// Task the `default` alias resolves to.
    #[serde(default)]
    pub default_task: Option<String>,

    /// Shell override: program followed by leading arguments, the command
    /// string is appended last. Defaults to `sh -c` (`cmd /C` on Windows).
    #[serde(default)]
    pub shell: Option<Vec<String>>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The shell command line to execute on each trigger.
    pub cmd: String,

    /// Glob patterns, relative to the project root, whose changes trigger
    /// the command. `*` does not cross directory separators.
    pub watch: Vec<String>,

    /// Glob patterns that veto a match from `watch`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`), so holders can rely on the invariants checked there.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
    debounce: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        let debounce = config
            .debounce
            .as_deref()
            .and_then(|s| parse_duration(s).ok())
            .filter(|d| !d.is_zero());
        Self {
            config,
            task,
            debounce,
        }
    }

    /// Effective coalescing window, `None` when disabled.
    pub fn debounce(&self) -> Option<Duration> {
        self.debounce
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.config.triggered_while_running_behaviour
    }
}
