//! Table adapters: one column read/write strategy per table technology.
//!
//! Each adapter probes the element for the capability it needs and reports
//! [`AdapterError::NotApplicable`] otherwise. [`AdapterChain`] tries them in
//! a fixed order and stops at the first that works.

mod grid_library;
mod native;
mod payload;

use std::fmt;

use colkeeper_dom::{DomError, GridError, NodeId, Page};
use colkeeper_protocols::ColumnDescriptor;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub use grid_library::{GridLibraryAdapter, find_grid_instance};
pub use native::{NativeTableAdapter, data_rows, header_cells, row_cells};
pub use payload::{PAYLOAD_PROPERTY, PayloadAdapter};

/// Which adapter applied a column change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
    GridLibrary,
    Payload,
    NativeTable,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GridLibrary => "grid-library",
            Self::Payload => "payload",
            Self::NativeTable => "native-table",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an adapter did not apply a column change.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Adapter not applicable to this element")]
    NotApplicable,

    #[error("Columns already match")]
    Unchanged,

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Column read/write strategy for one table technology.
pub trait TableAdapter: Send + Sync {
    fn kind(&self) -> AdapterKind;

    /// Current columns, or `None` when this source has nothing to offer.
    fn extract_columns(&self, page: &Page, element: NodeId) -> Option<Vec<ColumnDescriptor>>;

    /// Write `target` to the table.
    fn apply_columns(
        &self,
        page: &Page,
        element: NodeId,
        target: &[ColumnDescriptor],
    ) -> Result<(), AdapterError>;
}

/// Ordered adapter list.
pub struct AdapterChain {
    adapters: Vec<Box<dyn TableAdapter>>,
}

impl Default for AdapterChain {
    /// Grid library, then payload, then native header cells.
    fn default() -> Self {
        Self::new(vec![
            Box::new(GridLibraryAdapter),
            Box::new(PayloadAdapter),
            Box::new(NativeTableAdapter),
        ])
    }
}

impl AdapterChain {
    pub fn new(adapters: Vec<Box<dyn TableAdapter>>) -> Self {
        Self { adapters }
    }

    /// Columns from the first source that yields any.
    ///
    /// Empty means "not ready yet", never "zero columns".
    pub fn extract(&self, page: &Page, element: NodeId) -> Vec<ColumnDescriptor> {
        self.adapters
            .iter()
            .find_map(|adapter| {
                adapter
                    .extract_columns(page, element)
                    .filter(|columns| !columns.is_empty())
            })
            .unwrap_or_default()
    }

    /// Apply `target` with the first adapter that succeeds.
    pub fn apply(
        &self,
        page: &Page,
        element: NodeId,
        target: &[ColumnDescriptor],
    ) -> Option<AdapterKind> {
        for adapter in &self.adapters {
            match adapter.apply_columns(page, element, target) {
                Ok(()) => return Some(adapter.kind()),
                Err(AdapterError::NotApplicable) | Err(AdapterError::Unchanged) => {}
                Err(e) => warn!(adapter = %adapter.kind(), "Column apply failed: {}", e),
            }
        }
        debug!(element = %element, "No adapter applied the columns");
        None
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
