//! Root traversal: the document plus every reachable shadow root.

use colkeeper_dom::{Document, NodeId};

/// All roots of the page, document first, shadow roots in discovery order.
///
/// Read-only and cheap enough to call on every scheduler tick.
pub fn collect_roots(document: &Document) -> Vec<NodeId> {
    let mut roots = vec![document.root()];
    let mut index = 0;
    while index < roots.len() {
        let root = roots[index];
        for node in document.descendants(root) {
            if let Some(shadow) = document.shadow_root(node) {
                if !roots.contains(&shadow) {
                    roots.push(shadow);
                }
            }
        }
        index += 1;
    }
    roots
}
