//! HTML serialization.

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Serialize the whole document.
pub(crate) fn to_html(document: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for child in document.children(document.root()) {
        write_node(document, *child, &mut out);
    }
    out
}

fn write_node(document: &Document, id: NodeId, out: &mut String) {
    match document.kind(id) {
        Some(NodeKind::Text(text)) => out.push_str(&escape(text, false)),
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value, true));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }
            if let Some(shadow) = element.shadow_root {
                out.push_str("<template shadowrootmode=\"open\">");
                for child in document.children(shadow) {
                    write_node(document, *child, out);
                }
                out.push_str("</template>");
            }
            for child in document.children(id) {
                write_node(document, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        _ => {}
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
