//! View engine: saved view lookup, reconciliation and application.

use std::fmt;
use std::sync::Arc;

use colkeeper_dom::Page;
use colkeeper_protocols::{ColumnDescriptor, SavedColumn, SavedViewConfig, ViewStore};
use tracing::{debug, info};

use crate::adapters::{AdapterChain, AdapterKind, find_grid_instance};
use crate::discovery::{TableDescriptor, describe_tables};
use crate::error::CoreError;
use crate::keys;
use crate::reconcile::{is_applied, reconcile};

/// Result of one reconciliation attempt on one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The target columns were written by this adapter.
    Applied(AdapterKind),
    /// Nothing saved for this table.
    NoSaved,
    /// No columns could be read yet.
    NotReady,
    /// The table already shows the target columns.
    AlreadyApplied,
    /// Every adapter declined or failed.
    Failed,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Applied(kind) => kind.as_str(),
            Self::NoSaved => "no-saved",
            Self::NotReady => "cols-not-ready",
            Self::AlreadyApplied => "already-sorted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// A saved view and the key it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedView {
    pub key: String,
    pub config: SavedViewConfig,
}

/// Ties discovery, adapters and the store together.
pub struct ViewEngine {
    store: Arc<dyn ViewStore>,
    adapters: AdapterChain,
}

impl ViewEngine {
    pub fn new(store: Arc<dyn ViewStore>) -> Self {
        Self::with_adapters(store, AdapterChain::default())
    }

    pub fn with_adapters(store: Arc<dyn ViewStore>, adapters: AdapterChain) -> Self {
        Self { store, adapters }
    }

    pub fn store(&self) -> &Arc<dyn ViewStore> {
        &self.store
    }

    /// Run one discovery pass.
    pub fn describe_tables(&self, page: &Page) -> Vec<TableDescriptor> {
        describe_tables(&page.read())
    }

    /// Live columns of a table; empty while the table is not ready.
    pub fn columns(&self, page: &Page, table: &TableDescriptor) -> Vec<ColumnDescriptor> {
        self.adapters.extract(page, table.element)
    }

    pub fn has_grid(&self, page: &Page, table: &TableDescriptor) -> bool {
        find_grid_instance(&page.read(), table.element).is_some()
    }

    /// Current-format storage key of a table.
    pub fn view_key(&self, page: &Page, table: &TableDescriptor) -> String {
        keys::view_key(page.url().path(), &table.table_id)
    }

    /// Saved view of a table: the legacy entry when it holds anything, else
    /// the current one.
    pub async fn load_saved(
        &self,
        page: &Page,
        table: &TableDescriptor,
    ) -> Result<Option<SavedView>, CoreError> {
        let pathname = page.url().path().to_string();
        let candidates = [
            keys::legacy_view_key(&pathname, &table.uid),
            keys::view_key(&pathname, &table.table_id),
        ];
        for key in candidates {
            let Some(value) = self.store.get(&key).await? else {
                continue;
            };
            if let Some(config) = SavedViewConfig::from_value(&value) {
                return Ok(Some(SavedView { key, config }));
            }
        }
        Ok(None)
    }

    /// Reconcile one table with its saved view and apply the result.
    pub async fn apply_saved_order(
        &self,
        page: &Page,
        table: &TableDescriptor,
    ) -> Result<ApplyOutcome, CoreError> {
        let outcome = match self.load_saved(page, table).await? {
            None => ApplyOutcome::NoSaved,
            Some(saved) => self.apply_config(page, table, &saved.config),
        };
        debug!(table_id = %table.table_id, outcome = %outcome, "Reconciled table");
        Ok(outcome)
    }

    fn apply_config(
        &self,
        page: &Page,
        table: &TableDescriptor,
        saved: &SavedViewConfig,
    ) -> ApplyOutcome {
        let live = self.columns(page, table);
        if live.is_empty() {
            return ApplyOutcome::NotReady;
        }
        let target = reconcile(&live, saved);
        if is_applied(&live, &target) {
            return ApplyOutcome::AlreadyApplied;
        }
        match self.adapters.apply(page, table.element, &target) {
            Some(kind) => ApplyOutcome::Applied(kind),
            None => ApplyOutcome::Failed,
        }
    }

    /// Persist a view in the current format and retire the legacy entry.
    ///
    /// Returns the key written.
    pub async fn save(
        &self,
        page: &Page,
        table: &TableDescriptor,
        columns: &[SavedColumn],
    ) -> Result<String, CoreError> {
        let pathname = page.url().path().to_string();
        let key = keys::view_key(&pathname, &table.table_id);
        self.store.set(&key, serde_json::to_value(columns)?).await?;
        self.store
            .remove(&keys::legacy_view_key(&pathname, &table.uid))
            .await?;
        info!(key = %key, columns = columns.len(), "Saved view");
        Ok(key)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
