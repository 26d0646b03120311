//! Table locator: layered strategies over every root.

use std::collections::HashSet;
use std::fmt;

use colkeeper_dom::{Document, NodeId};
use serde::Serialize;

/// Custom elements rendered by the host application's table widget.
pub const TABLE_COMPONENT_TAGS: [&str; 2] = ["m2c-view-invoice", "b2w-table-v2"];

/// The host application's primary invoice table.
pub const PRIMARY_COMPONENT_TAG: &str = "m2c-view-invoice";

/// Attribute carrying a serialized column payload.
pub const PAYLOAD_ATTRIBUTE: &str = "payload-columns";

const ARIA_TABLE_ROLES: [&str; 3] = ["grid", "table", "treegrid"];

const LIBRARY_GRID_CLASSES: [&str; 4] = [
    "tabulator",
    "ag-root-wrapper",
    "dataTables_wrapper",
    "handsontable",
];

/// Locator strategy that matched a table. Earlier variants win attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    WebComponent,
    NativeTable,
    AriaGrid,
    LibraryGrid,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::WebComponent,
        Strategy::NativeTable,
        Strategy::AriaGrid,
        Strategy::LibraryGrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebComponent => "web-component",
            Self::NativeTable => "native-table",
            Self::AriaGrid => "aria-grid",
            Self::LibraryGrid => "library-grid",
        }
    }

    /// Whether `element` matches this strategy.
    pub fn matches(&self, document: &Document, element: NodeId) -> bool {
        let Some(tag) = document.tag(element) else {
            return false;
        };
        match self {
            Self::WebComponent => {
                TABLE_COMPONENT_TAGS.contains(&tag)
                    || document
                        .attribute(element, PAYLOAD_ATTRIBUTE)
                        .is_some_and(|v| !v.is_empty())
            }
            Self::NativeTable => tag == "table",
            Self::AriaGrid => document
                .attribute(element, "role")
                .is_some_and(|role| ARIA_TABLE_ROLES.contains(&role.trim())),
            Self::LibraryGrid => LIBRARY_GRID_CLASSES
                .iter()
                .any(|class| document.has_class(element, class)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every table element under `roots`, in root order then strategy order.
///
/// An element matched by several strategies is returned once, attributed to
/// the first strategy that matched it.
pub fn locate(document: &Document, roots: &[NodeId]) -> Vec<(NodeId, Strategy)> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for root in roots {
        let elements = document.find_all(*root, |_, _| true);
        for strategy in Strategy::ALL {
            for element in &elements {
                if strategy.matches(document, *element) && seen.insert(*element) {
                    found.push((*element, strategy));
                }
            }
        }
    }
    found
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
