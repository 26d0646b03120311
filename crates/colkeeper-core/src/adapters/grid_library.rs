//! Grid-library instances (Tabulator and similar).

use std::sync::Arc;

use colkeeper_dom::{Document, GridInstance, NodeId, Page};
use colkeeper_protocols::ColumnDescriptor;
use serde_json::Value;

use super::{AdapterError, AdapterKind, TableAdapter};

const GRID_CLASS_MARKER: &str = "tabulator";

/// Grid instance bound to `element`, or to a node inside its shadow root
/// whose class mentions the grid library.
pub fn find_grid_instance(document: &Document, element: NodeId) -> Option<Arc<dyn GridInstance>> {
    if let Some(grid) = document.grid(element) {
        return Some(grid);
    }
    let shadow = document.shadow_root(element)?;
    document
        .find_all(shadow, |doc, node| {
            doc.attribute(node, "class")
                .is_some_and(|class| class.contains(GRID_CLASS_MARKER))
        })
        .into_iter()
        .find_map(|node| document.grid(node))
}

/// Reads and writes columns through a bound grid instance.
pub struct GridLibraryAdapter;

impl TableAdapter for GridLibraryAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::GridLibrary
    }

    fn extract_columns(&self, page: &Page, element: NodeId) -> Option<Vec<ColumnDescriptor>> {
        let grid = find_grid_instance(&page.read(), element)?;

        if let Some(definitions) = grid.column_definitions() {
            return Some(
                definitions
                    .iter()
                    .filter_map(Value::as_object)
                    .map(ColumnDescriptor::from_object)
                    .collect(),
            );
        }

        let columns = grid.columns()?;
        Some(
            columns
                .iter()
                .map(|column| {
                    let field = column.field();
                    ColumnDescriptor {
                        title: column.title().or_else(|| field.clone()),
                        field,
                        visible: column.is_visible(),
                        extra: Default::default(),
                    }
                })
                .collect(),
        )
    }

    fn apply_columns(
        &self,
        page: &Page,
        element: NodeId,
        target: &[ColumnDescriptor],
    ) -> Result<(), AdapterError> {
        let grid = find_grid_instance(&page.read(), element).ok_or(AdapterError::NotApplicable)?;
        let definitions = target
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        grid.set_columns(definitions)?;
        grid.redraw()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "grid_library_tests.rs"]
mod tests;
