//! Reduced page snapshot sent for analysis.

use std::sync::LazyLock;

use colkeeper_config::SnapshotConfig;
use colkeeper_core::adapters::{data_rows, row_cells};
use colkeeper_core::{TableDescriptor, ViewEngine};
use colkeeper_dom::{Document, NodeId, Page, collapse_whitespace};
use colkeeper_protocols::{
    AnalysisPolicy, ColumnMetadata, DomSummaryNode, PageInfo, PageSnapshot, TableMetadata,
};
use regex::Regex;

/// Tags listed in the DOM summary.
const SUMMARY_TAGS: [&str; 11] = [
    "h1", "h2", "h3", "form", "table", "button", "input", "select", "textarea", "canvas", "svg",
];

const CLASS_LIMIT: usize = 120;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?\d{1,3}([.,\s]?\d{3})*([.,]\d+)?%?$").expect("valid regex"));
static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([€$£]\s?[-+]?[\d.,\s]+|[-+]?[\d.,\s]+\s?(€|\$|£|EUR|USD))$").expect("valid regex")
});
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}|\d{4}-\d{2}-\d{2}([T ][\d:.]+Z?)?)$")
        .expect("valid regex")
});

/// Collapse whitespace and cut to `max` characters, marking the cut with `…`.
pub fn truncate_text(text: &str, max: usize) -> String {
    let text = collapse_whitespace(text);
    if text.chars().count() <= max {
        return text;
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}

/// Best guess at the type of a column from sample cell texts.
///
/// All non-empty samples must agree; otherwise the column is `text`. No
/// samples at all is `unknown`.
pub fn infer_type<S: AsRef<str>>(samples: &[S]) -> &'static str {
    let values: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if values.is_empty() {
        return "unknown";
    }
    let all = |f: &dyn Fn(&str) -> bool| values.iter().copied().all(f);
    if all(&|v| {
        matches!(
            v.to_lowercase().as_str(),
            "true" | "false" | "si" | "sì" | "no" | "yes"
        )
    }) {
        "boolean"
    } else if all(&|v| CURRENCY.is_match(v)) {
        "currency"
    } else if all(&|v| NUMBER.is_match(v)) {
        "number"
    } else if all(&|v| DATE.is_match(v)) {
        "date"
    } else {
        "text"
    }
}

fn summary_node(document: &Document, node: NodeId, text_limit: usize) -> DomSummaryNode {
    DomSummaryNode {
        tag: document.tag(node).unwrap_or_default().to_string(),
        id: document
            .attribute(node, "id")
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        class_name: truncate_text(document.attribute(node, "class").unwrap_or_default(), CLASS_LIMIT),
        role: document.attribute(node, "role").map(str::to_string),
        text: truncate_text(&document.text_content(node), text_limit),
    }
}

/// Headings, forms, tables and controls of the main document, in document order.
pub fn dom_summary(document: &Document, config: &SnapshotConfig) -> Vec<DomSummaryNode> {
    document
        .find_all(document.root(), |doc, node| {
            doc.tag(node).is_some_and(|tag| SUMMARY_TAGS.contains(&tag))
                || doc.attribute(node, "role") == Some("table")
        })
        .into_iter()
        .take(config.max_dom_nodes)
        .map(|node| summary_node(document, node, config.text_limit))
        .collect()
}

/// Texts of column `index` in the first `limit` body rows of a native table.
fn column_samples(document: &Document, table: NodeId, index: usize, limit: usize) -> Vec<String> {
    data_rows(document, table)
        .into_iter()
        .take(limit)
        .filter_map(|row| row_cells(document, row).get(index).copied())
        .map(|cell| collapse_whitespace(&document.text_content(cell)))
        .collect()
}

/// Column metadata of the located tables.
pub fn table_metadata(
    engine: &ViewEngine,
    page: &Page,
    tables: &[TableDescriptor],
    config: &SnapshotConfig,
) -> Vec<TableMetadata> {
    tables
        .iter()
        .take(config.max_tables)
        .map(|table| {
            let live = engine.columns(page, table);
            let document = page.read();
            let native = table.tag == "table";
            let columns: Vec<ColumnMetadata> = live
                .iter()
                .take(config.max_columns)
                .enumerate()
                .map(|(index, column)| {
                    let inferred = if native {
                        infer_type(&column_samples(&document, table.element, index, config.sample_rows))
                    } else {
                        "unknown"
                    };
                    ColumnMetadata {
                        field: column.field.clone(),
                        header: Some(column.display_name().to_string()).filter(|h| !h.is_empty()),
                        visible: column.visible,
                        inferred_type: inferred.to_string(),
                    }
                })
                .collect();
            TableMetadata {
                table_id: table.table_id.clone(),
                tag: table.tag.clone(),
                column_count: columns.len(),
                columns,
            }
        })
        .collect()
}

/// Build the full snapshot of a page.
pub fn build_snapshot(
    engine: &ViewEngine,
    page: &Page,
    tables: &[TableDescriptor],
    config: &SnapshotConfig,
) -> PageSnapshot {
    let url = page.url();
    let (title, dom_summary) = {
        let document = page.read();
        (document.title(), dom_summary(&document, config))
    };
    PageSnapshot {
        page: PageInfo {
            origin: url.origin().ascii_serialization(),
            pathname: url.path().to_string(),
            title,
        },
        dom_summary,
        table_metadata: table_metadata(engine, page, tables, config),
        policy: AnalysisPolicy {
            allowed_actions: config.allowed_actions.clone(),
            max_suggestions: config.max_suggestions,
        },
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
