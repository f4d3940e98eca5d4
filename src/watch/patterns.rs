// src/watch/patterns.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::ResolvedTask;
use crate::errors::{Result, WatchrunError};

/// Compiled watch/exclude glob patterns for the task being run.
///
/// Patterns are relative to the project root, and the watcher passes
/// root-relative paths with forward slashes (e.g. `"src/main.rs"`) into
/// [`WatchSpec::matches`]. A `*` never crosses a `/`, so `tests/*py` only
/// sees files directly inside `tests/`; use `**` to recurse.
#[derive(Clone)]
pub struct WatchSpec {
    patterns: Vec<String>,
    exclude: Vec<String>,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSpec")
            .field("patterns", &self.patterns)
            .field("exclude", &self.exclude)
            .finish_non_exhaustive()
    }
}

/// A directory handed to the filesystem notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Directory relative to the project root (`"."` for the root itself).
    pub dir: PathBuf,
    pub recursive: bool,
}

impl WatchSpec {
    pub fn new(patterns: &[String], exclude: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(WatchrunError::ConfigError(
                "at least one watch pattern is required".to_string(),
            ));
        }

        let patterns: Vec<String> = patterns.iter().map(|p| normalize(p)).collect();
        let exclude: Vec<String> = exclude.iter().map(|p| normalize(p)).collect();

        let watch_set = build_globset(&patterns)?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(&exclude)?)
        };

        Ok(Self {
            patterns,
            exclude,
            watch_set,
            exclude_set,
        })
    }

    pub fn from_task(task: &ResolvedTask) -> Result<Self> {
        Self::new(&task.watch, &task.exclude)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Returns true if a change to `rel_path` should trigger a run.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Directories the notifier has to observe so every path the patterns
    /// can match is covered.
    ///
    /// Each pattern contributes its literal prefix directory, watched
    /// non-recursively when only one (non-`**`) component follows it.
    /// Directories already covered by a recursive ancestor are dropped.
    pub fn watch_targets(&self) -> Vec<WatchTarget> {
        let mut dirs: BTreeMap<PathBuf, bool> = BTreeMap::new();
        for pattern in &self.patterns {
            let target = target_for_pattern(pattern);
            let recursive = dirs.entry(target.dir).or_insert(false);
            *recursive |= target.recursive;
        }

        let recursive_roots: Vec<PathBuf> = dirs
            .iter()
            .filter(|(_, recursive)| **recursive)
            .map(|(dir, _)| dir.clone())
            .collect();

        dirs.into_iter()
            .filter(|(dir, _)| {
                !recursive_roots
                    .iter()
                    .any(|root| root != dir && is_under(dir, root))
            })
            .map(|(dir, recursive)| WatchTarget { dir, recursive })
            .collect()
    }
}

fn target_for_pattern(pattern: &str) -> WatchTarget {
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    let literal_len = components
        .iter()
        .position(|c| has_glob_meta(c))
        .unwrap_or(components.len());

    // A fully literal pattern names a single file: watch its parent.
    let (base, rest) = if literal_len == components.len() {
        let split = components.len().saturating_sub(1);
        (&components[..split], &components[split..])
    } else {
        (&components[..literal_len], &components[literal_len..])
    };

    let dir = if base.is_empty() {
        PathBuf::from(".")
    } else {
        base.iter().collect()
    };
    let recursive = rest.len() > 1 || rest.iter().any(|c| c.contains("**"));

    WatchTarget { dir, recursive }
}

fn is_under(dir: &Path, root: &Path) -> bool {
    root == Path::new(".") || dir.starts_with(root)
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

fn normalize(pattern: &str) -> String {
    let trimmed = pattern.trim().replace('\\', "/");
    trimmed
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(trimmed)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                WatchrunError::ConfigError(format!("invalid glob pattern '{pat}': {e}"))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| WatchrunError::ConfigError(format!("building glob set: {e}")))
}
