//! Table identity.
//!
//! The computed identity joins three parts with `|`:
//!
//! 1. the ancestor path, one `tag:n` segment per level (`n` is the 1-based
//!    position among same-tag siblings) with `#shadow` at every shadow
//!    boundary,
//! 2. nearby heading text,
//! 3. the table's ordinal in the current discovery pass.
//!
//! Neither part is unique on its own; together they are stable across
//! re-renders of an unchanged subtree. Structurally identical, unlabeled
//! tables at the same ordinal can still collide. A detached element has no
//! path and degrades to `tag|heading`.

use colkeeper_dom::{Document, NodeId, NodeKind, collapse_whitespace};

use crate::locator::Strategy;

/// Maximum characters of heading text kept in an identity.
pub const HEADING_LIMIT: usize = 80;

const SECTIONING_TAGS: [&str; 6] = ["section", "article", "main", "aside", "fieldset", "dialog"];

const HEADING_TAGS: [&str; 7] = ["h1", "h2", "h3", "h4", "h5", "h6", "legend"];

/// Computed identity of a table.
pub fn table_id(document: &Document, element: NodeId, ordinal: usize) -> String {
    let tag = document.tag(element).unwrap_or_default();
    let heading = heading_text(document, element);
    match ancestor_path(document, element) {
        Some(path) => format!("{}|{}|{}", path, heading, ordinal),
        None => format!("{}|{}", tag, heading),
    }
}

/// Attribute-based identity used by legacy saved views.
pub fn legacy_uid(document: &Document, element: NodeId) -> String {
    let attr = |name: &str| {
        document
            .attribute(element, name)
            .filter(|value| !value.is_empty())
    };
    if let Some(uid) = attr("unique-id").or_else(|| attr("id")) {
        return uid.to_string();
    }
    if let Some(account) = attr("account-code") {
        return format!("invoice_acc_{}", account);
    }
    if let Some(crm) = attr("crm-code") {
        return format!("invoice_crm_{}", crm);
    }
    document.tag(element).unwrap_or_default().to_string()
}

/// Human readable description; informational only.
pub fn label(document: &Document, element: NodeId, strategy: Strategy) -> String {
    let tag = document.tag(element).unwrap_or_default();
    let heading = heading_text(document, element);
    if heading.is_empty() {
        format!("<{}> [{}]", tag, strategy)
    } else {
        format!("{} <{}> [{}]", heading, tag, strategy)
    }
}

/// Heading of the enclosing semantic container, else the table's own
/// caption or heading. Whitespace-collapsed and truncated.
pub fn heading_text(document: &Document, element: NodeId) -> String {
    let text = container_heading(document, element)
        .or_else(|| own_heading(document, element))
        .map(|node| collapse_whitespace(&document.text_content(node)))
        .unwrap_or_default();
    truncate(&text, HEADING_LIMIT)
}

fn container_heading(document: &Document, element: NodeId) -> Option<NodeId> {
    let container = composed_ancestors(document, element)
        .into_iter()
        .find(|node| is_sectioning(document, *node))?;
    let inside_table = document.descendants(element);
    document.find_first(container, |doc, node| {
        node != element && !inside_table.contains(&node) && is_heading(doc, node)
    })
}

fn own_heading(document: &Document, element: NodeId) -> Option<NodeId> {
    document
        .find_first(element, |doc, node| doc.tag(node) == Some("caption"))
        .or_else(|| document.find_first(element, is_heading))
}

fn is_sectioning(document: &Document, node: NodeId) -> bool {
    document
        .tag(node)
        .is_some_and(|tag| SECTIONING_TAGS.contains(&tag))
        || document.attribute(node, "role") == Some("region")
}

fn is_heading(document: &Document, node: NodeId) -> bool {
    document.tag(node).is_some_and(|tag| HEADING_TAGS.contains(&tag))
        || document.attribute(node, "role") == Some("heading")
}

/// Element ancestors, nearest first, continuing through shadow hosts.
fn composed_ancestors(document: &Document, element: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut current = document.parent(element);
    while let Some(node) = current {
        match document.kind(node) {
            Some(NodeKind::Element(_)) => {
                out.push(node);
                current = document.parent(node);
            }
            Some(NodeKind::ShadowRoot { host }) => current = Some(*host),
            _ => break,
        }
    }
    out
}

/// `tag:n` segments from the document down to `element`, or `None` when the
/// element is not connected.
fn ancestor_path(document: &Document, element: NodeId) -> Option<String> {
    let mut segments = Vec::new();
    let mut current = element;
    loop {
        let parent = document.parent(current)?;
        segments.push(segment(document, current, parent));
        match document.kind(parent)? {
            NodeKind::Document => break,
            NodeKind::ShadowRoot { host } => {
                segments.push("#shadow".to_string());
                current = *host;
            }
            NodeKind::Element(_) => current = parent,
            NodeKind::Text(_) => return None,
        }
    }
    segments.reverse();
    Some(segments.join(">"))
}

fn segment(document: &Document, element: NodeId, parent: NodeId) -> String {
    let tag = document.tag(element).unwrap_or_default();
    let ordinal = document
        .element_children(parent)
        .into_iter()
        .filter(|sibling| document.tag(*sibling) == Some(tag))
        .position(|sibling| sibling == element)
        .map(|p| p + 1)
        .unwrap_or(1);
    format!("{}:{}", tag, ordinal)
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
