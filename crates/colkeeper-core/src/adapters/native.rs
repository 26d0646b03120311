//! Plain HTML tables driven through their header and body cells.

use colkeeper_dom::{Document, DomError, NodeId, Page, collapse_whitespace};
use colkeeper_protocols::ColumnDescriptor;

use super::{AdapterError, AdapterKind, TableAdapter};

/// Attribute holding a header cell's stable field.
pub const FIELD_ATTRIBUTE: &str = "data-field";

/// Reads header cells of any table-like element; reorders and hides the
/// cells of plain `<table>` elements.
pub struct NativeTableAdapter;

impl TableAdapter for NativeTableAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::NativeTable
    }

    fn extract_columns(&self, page: &Page, element: NodeId) -> Option<Vec<ColumnDescriptor>> {
        let document = page.read();
        let columns: Vec<ColumnDescriptor> = header_cells(&document, element)
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                let field = field_for(&document, cell, index);
                let text = collapse_whitespace(&document.text_content(cell));
                let title = if text.is_empty() { field.clone() } else { text };
                ColumnDescriptor {
                    field: Some(field),
                    title: Some(title),
                    visible: !is_hidden(&document, cell),
                    extra: Default::default(),
                }
            })
            .collect();
        (!columns.is_empty()).then_some(columns)
    }

    fn apply_columns(
        &self,
        page: &Page,
        element: NodeId,
        target: &[ColumnDescriptor],
    ) -> Result<(), AdapterError> {
        page.update(|document| apply(document, element, target))
    }
}

fn apply(
    document: &mut Document,
    table: NodeId,
    target: &[ColumnDescriptor],
) -> Result<(), AdapterError> {
    if document.tag(table) != Some("table") {
        return Err(AdapterError::NotApplicable);
    }
    let headers = header_row(document, table)
        .map(|row| row_cells(document, row))
        .unwrap_or_default();
    if headers.is_empty() {
        return Err(AdapterError::NotApplicable);
    }

    let fields: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(index, cell)| field_for(document, *cell, index))
        .collect();

    let mut order: Vec<usize> = Vec::with_capacity(fields.len());
    let mut visible = vec![false; fields.len()];
    for column in target {
        let Some(field) = column.field.as_deref() else {
            continue;
        };
        if let Some(index) = fields.iter().position(|f| f == field) {
            if !order.contains(&index) {
                order.push(index);
                visible[index] = column.visible;
            }
        }
    }
    // An empty target hides every column; a non-empty one must match.
    if order.is_empty() && !target.is_empty() {
        return Err(AdapterError::NotApplicable);
    }

    let mut changed = false;

    // Positional fields must survive the reordering below.
    for (cell, field) in headers.iter().zip(&fields) {
        if document
            .attribute(*cell, FIELD_ATTRIBUTE)
            .is_none_or(str::is_empty)
        {
            document.set_attribute(*cell, FIELD_ATTRIBUTE, field)?;
            changed = true;
        }
    }

    let unmatched: Vec<usize> = (0..fields.len()).filter(|i| !order.contains(i)).collect();
    order.extend(unmatched);

    for row in table_rows(document, table) {
        let cells = row_cells(document, row);
        let mut desired: Vec<NodeId> = order.iter().filter_map(|i| cells.get(*i).copied()).collect();
        desired.extend(cells.iter().skip(fields.len()).copied());
        if desired != cells {
            for cell in &desired {
                document.append_child(row, *cell)?;
            }
            changed = true;
        }
        for (index, cell) in cells.iter().enumerate().take(fields.len()) {
            changed |= set_visibility(document, *cell, visible[index])?;
        }
    }

    if changed {
        Ok(())
    } else {
        Err(AdapterError::Unchanged)
    }
}

/// Header cells: the first header row's cells, else ARIA column headers.
pub fn header_cells(document: &Document, element: NodeId) -> Vec<NodeId> {
    if let Some(row) = header_row(document, element) {
        let cells = row_cells(document, row);
        if !cells.is_empty() {
            return cells;
        }
    }
    document.find_all(element, |doc, node| {
        doc.attribute(node, "role") == Some("columnheader")
    })
}

/// First row inside `<thead>`, else the first row holding a `<th>`.
fn header_row(document: &Document, table: NodeId) -> Option<NodeId> {
    let rows = table_rows(document, table);
    rows.iter()
        .copied()
        .find(|row| {
            document
                .ancestors(*row)
                .into_iter()
                .take_while(|a| *a != table)
                .any(|a| document.tag(a) == Some("thead"))
        })
        .or_else(|| {
            rows.into_iter().find(|row| {
                document
                    .element_children(*row)
                    .into_iter()
                    .any(|c| document.tag(c) == Some("th"))
            })
        })
}

/// Rows belonging to `table` itself, not to nested tables.
fn table_rows(document: &Document, table: NodeId) -> Vec<NodeId> {
    document.find_all(table, |doc, node| {
        doc.tag(node) == Some("tr")
            && doc
                .ancestors(node)
                .into_iter()
                .find(|a| doc.tag(*a) == Some("table"))
                .is_none_or(|owner| owner == table)
    })
}

/// Rows of `table` after its header row, nested tables excluded.
pub fn data_rows(document: &Document, table: NodeId) -> Vec<NodeId> {
    let header = header_row(document, table);
    table_rows(document, table)
        .into_iter()
        .filter(|row| Some(*row) != header)
        .collect()
}

/// `<th>`/`<td>` children of a row, in document order.
pub fn row_cells(document: &Document, row: NodeId) -> Vec<NodeId> {
    document
        .element_children(row)
        .into_iter()
        .filter(|c| matches!(document.tag(*c), Some("th") | Some("td")))
        .collect()
}

fn field_for(document: &Document, cell: NodeId, index: usize) -> String {
    document
        .attribute(cell, FIELD_ATTRIBUTE)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("column_{}", index + 1))
}

fn is_hidden(document: &Document, cell: NodeId) -> bool {
    document.style(cell, "display").as_deref() == Some("none")
        || document.attribute(cell, "aria-hidden") == Some("true")
}

/// Show or hide one cell. Returns whether anything changed.
fn set_visibility(document: &mut Document, cell: NodeId, visible: bool) -> Result<bool, DomError> {
    let display_none = document.style(cell, "display").as_deref() == Some("none");
    let aria_hidden = document.attribute(cell, "aria-hidden") == Some("true");
    let mut changed = false;
    if visible {
        if display_none {
            document.set_style(cell, "display", None)?;
            changed = true;
        }
        if aria_hidden {
            document.remove_attribute(cell, "aria-hidden")?;
            changed = true;
        }
    } else {
        if !display_none {
            document.set_style(cell, "display", Some("none"))?;
            changed = true;
        }
        if !aria_hidden {
            document.set_attribute(cell, "aria-hidden", "true")?;
            changed = true;
        }
    }
    Ok(changed)
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
