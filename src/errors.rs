// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// Filesystem monitoring could not be established. Fatal at startup.
    #[error("Watch setup failed for {path:?}: {reason}")]
    SetupError { path: PathBuf, reason: String },

    /// The command for a single trigger could not be started. The watcher
    /// keeps running after reporting it.
    #[error("Failed to spawn `{cmd}`: {source}")]
    SpawnError {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WatchrunError {
    pub(crate) fn setup(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        WatchrunError::SetupError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchrunError>;
