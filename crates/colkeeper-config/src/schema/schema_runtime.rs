//! Reapplication scheduler and snapshot configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reapplication scheduler timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Iterations performed by one reapplication run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Quiet period after a relevant mutation before a run starts.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Sleep after an iteration that changed nothing.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Sleep after an iteration that applied a change.
    #[serde(default = "default_settle_interval_ms")]
    pub settle_interval_ms: u64,

    /// Period of the observed-roots refresh.
    #[serde(default = "default_root_refresh_ms")]
    pub root_refresh_ms: u64,
}

impl SchedulerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn root_refresh(&self) -> Duration {
        Duration::from_millis(self.root_refresh_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            debounce_ms: default_debounce_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            settle_interval_ms: default_settle_interval_ms(),
            root_refresh_ms: default_root_refresh_ms(),
        }
    }
}

fn default_max_iterations() -> u32 {
    25
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_retry_interval_ms() -> u64 {
    300
}

fn default_settle_interval_ms() -> u64 {
    800
}

fn default_root_refresh_ms() -> u64 {
    1500
}

/// Limits of the reduced page snapshot sent for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_max_dom_nodes")]
    pub max_dom_nodes: usize,

    #[serde(default = "default_max_tables")]
    pub max_tables: usize,

    #[serde(default = "default_max_columns")]
    pub max_columns: usize,

    /// Characters kept from each summarized node's text.
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,

    /// Rows sampled per column for type inference.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    #[serde(default = "default_allowed_actions")]
    pub allowed_actions: Vec<String>,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_dom_nodes: default_max_dom_nodes(),
            max_tables: default_max_tables(),
            max_columns: default_max_columns(),
            text_limit: default_text_limit(),
            sample_rows: default_sample_rows(),
            allowed_actions: default_allowed_actions(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_max_dom_nodes() -> usize {
    120
}

fn default_max_tables() -> usize {
    10
}

fn default_max_columns() -> usize {
    40
}

fn default_text_limit() -> usize {
    180
}

fn default_sample_rows() -> usize {
    5
}

fn default_allowed_actions() -> Vec<String> {
    vec!["hide".to_string(), "reorder".to_string()]
}

fn default_max_suggestions() -> usize {
    5
}
