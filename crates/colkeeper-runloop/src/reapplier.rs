//! Bounded reapplication loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use colkeeper_config::SchedulerConfig;
use colkeeper_core::{ApplyOutcome, ViewEngine};
use colkeeper_dom::Page;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Summary of one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub iterations: u32,
    /// Iterations in which at least one table was changed.
    pub changed_iterations: u32,
}

/// Reapplies saved views to every table of a page, a bounded number of times.
pub struct Reapplier {
    engine: Arc<ViewEngine>,
    page: Page,
    config: SchedulerConfig,
    running: AtomicBool,
    completed_runs: AtomicUsize,
    outcomes: RwLock<HashMap<String, ApplyOutcome>>,
}

/// Clears the running flag however the run ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Reapplier {
    pub fn new(engine: Arc<ViewEngine>, page: Page, config: SchedulerConfig) -> Self {
        Self {
            engine,
            page,
            config,
            running: AtomicBool::new(false),
            completed_runs: AtomicUsize::new(0),
            outcomes: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<ViewEngine> {
        &self.engine
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Number of runs that ran to completion.
    pub fn completed_runs(&self) -> usize {
        self.completed_runs.load(Ordering::SeqCst)
    }

    /// Outcome of a table in the latest pass. Tables gone from the page
    /// have none.
    pub fn last_outcome(&self, table_id: &str) -> Option<ApplyOutcome> {
        self.outcomes.read().get(table_id).copied()
    }

    /// Run the bounded loop.
    ///
    /// Returns `None` without doing anything when a run is already active.
    pub async fn run(&self) -> Option<RunReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Reapplication already running, trigger ignored");
            return None;
        }
        let _guard = RunGuard(&self.running);

        info!(max_iterations = self.config.max_iterations, "Reapplication run started");
        let mut report = RunReport {
            iterations: 0,
            changed_iterations: 0,
        };
        for _ in 0..self.config.max_iterations {
            let changed = self.reapply_all().await;
            report.iterations += 1;
            let pause = if changed {
                report.changed_iterations += 1;
                self.config.settle_interval()
            } else {
                self.config.retry_interval()
            };
            tokio::time::sleep(pause).await;
        }

        self.completed_runs.fetch_add(1, Ordering::SeqCst);
        info!(
            iterations = report.iterations,
            changed = report.changed_iterations,
            "Reapplication run finished"
        );
        Some(report)
    }

    /// One pass over every table, in locator order. Returns whether any
    /// table was changed.
    ///
    /// A failing table is recorded and skipped; it never stops the pass.
    pub async fn reapply_all(&self) -> bool {
        let tables = self.engine.describe_tables(&self.page);
        let mut changed = false;
        let mut outcomes = HashMap::with_capacity(tables.len());
        for table in &tables {
            let outcome = match self.engine.apply_saved_order(&self.page, table).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(table_id = %table.table_id, "Reapplication failed: {}", e);
                    ApplyOutcome::Failed
                }
            };
            changed |= outcome.is_applied();
            outcomes.insert(table.table_id.clone(), outcome);
        }
        *self.outcomes.write() = outcomes;
        changed
    }
}

#[cfg(test)]
#[path = "reapplier_tests.rs"]
mod tests;
