//! One discovery pass: roots, locator and identity together.

use colkeeper_dom::{Document, NodeId};
use serde::Serialize;

use crate::identity;
use crate::locator::{self, PRIMARY_COMPONENT_TAG, Strategy};
use crate::roots::collect_roots;

/// A table found by one discovery pass.
///
/// `element` is only meaningful until the page changes; persist `table_id`
/// or `uid`, never the element.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    #[serde(skip)]
    pub element: NodeId,
    pub strategy: Strategy,
    pub table_id: String,
    /// Attribute-based identity of legacy saved views.
    pub uid: String,
    pub label: String,
    pub tag: String,
}

/// Locate and identify every table of the document.
pub fn describe_tables(document: &Document) -> Vec<TableDescriptor> {
    let roots = collect_roots(document);
    locator::locate(document, &roots)
        .into_iter()
        .enumerate()
        .map(|(ordinal, (element, strategy))| TableDescriptor {
            element,
            strategy,
            table_id: identity::table_id(document, element, ordinal),
            uid: identity::legacy_uid(document, element),
            label: identity::label(document, element, strategy),
            tag: document.tag(element).unwrap_or_default().to_string(),
        })
        .collect()
}

/// The table an action targets: the one with `table_id` when given and
/// present, else the primary invoice component, else the first table.
pub fn primary_table<'a>(
    tables: &'a [TableDescriptor],
    table_id: Option<&str>,
) -> Option<&'a TableDescriptor> {
    if let Some(wanted) = table_id {
        if let Some(table) = tables.iter().find(|t| t.table_id == wanted) {
            return Some(table);
        }
    }
    tables
        .iter()
        .find(|t| t.tag == PRIMARY_COMPONENT_TAG)
        .or_else(|| tables.first())
}
