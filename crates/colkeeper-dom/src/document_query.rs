//! Read-only traversal helpers.

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

impl Document {
    /// Document or shadow root that `id` lives in, `None` when detached.
    pub fn containing_root(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            match self.kind(current)? {
                NodeKind::Document | NodeKind::ShadowRoot { .. } => return Some(current),
                _ => current = self.parent(current)?,
            }
        }
    }

    /// Whether the node is reachable from the document, crossing shadow hosts.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.containing_root(current) {
                Some(root) if root == self.root() => return true,
                Some(root) => match self.host(root) {
                    Some(host) => current = host,
                    None => return false,
                },
                None => return false,
            }
        }
    }

    /// Host element of a shadow root.
    pub fn host(&self, shadow: NodeId) -> Option<NodeId> {
        match self.kind(shadow) {
            Some(NodeKind::ShadowRoot { host }) => Some(*host),
            _ => None,
        }
    }

    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::ShadowRoot { .. }))
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Descendants of `id` in tree order, not crossing into shadow roots.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `id` matching `predicate`, in tree order.
    pub fn find_all<F>(&self, id: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is_element(*n) && predicate(self, *n))
            .collect()
    }

    pub fn find_first<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .find(|n| self.is_element(*n) && predicate(self, *n))
    }

    pub fn elements_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.find_all(id, |doc, n| doc.tag(n) == Some(tag))
    }

    /// Element ancestors, nearest first, stopping at the containing root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(next) = current {
            if !self.is_element(next) {
                break;
            }
            out.push(next);
            current = self.parent(next);
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeKind::Text(text)) = self.kind(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of the first `<title>` element, whitespace-collapsed.
    pub fn title(&self) -> String {
        self.find_first(self.root(), |doc, n| doc.tag(n) == Some("title"))
            .map(|t| collapse_whitespace(&self.text_content(t)))
            .unwrap_or_default()
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
