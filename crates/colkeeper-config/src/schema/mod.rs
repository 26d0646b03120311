//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_ai;
mod schema_runtime;

pub use schema_ai::*;
pub use schema_runtime::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `sqlite`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Database file for the sqlite backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files; `~/.colkeeper/logs` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Resolved sqlite path: configured path, else `~/.colkeeper/views.db`.
    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .path
            .as_deref()
            .map(crate::ConfigLoader::expand_path)
            .unwrap_or_else(|| colkeeper_dir().join("views.db"))
    }

    /// Resolved log directory.
    pub fn log_directory(&self) -> PathBuf {
        self.logging
            .directory
            .as_deref()
            .map(crate::ConfigLoader::expand_path)
            .unwrap_or_else(|| colkeeper_dir().join("logs"))
    }
}

/// Base directory for colkeeper state.
pub fn colkeeper_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".colkeeper")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
