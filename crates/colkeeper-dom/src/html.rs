//! HTML import.

use scraper::{Html, Node as HtmlNode};

use crate::document::Document;
use crate::error::DomError;
use crate::node::NodeId;

/// Attribute marking a declarative shadow root template.
const SHADOW_ROOT_MODE: &str = "shadowrootmode";

/// Parse `html` and append its content to the document node.
///
/// `<template shadowrootmode="open">` children become the shadow root of the
/// template's parent element. Comments, doctypes and whitespace-only text
/// are dropped.
pub(crate) fn import(document: &mut Document, html: &str) -> Result<(), DomError> {
    let parsed = Html::parse_document(html);
    let root = document.root();

    let mut stack = vec![(parsed.tree.root(), root)];
    while let Some((source, parent)) = stack.pop() {
        let target = match source.value() {
            HtmlNode::Document | HtmlNode::Fragment => parent,
            HtmlNode::Element(element) => {
                if element.name() == "template" && element.attr(SHADOW_ROOT_MODE).is_some() {
                    if document.is_element(parent) {
                        document.attach_shadow(parent)?
                    } else {
                        parent
                    }
                } else {
                    let id = document.create_element(element.name());
                    for (name, value) in element.attrs() {
                        document.set_attribute(id, name, value)?;
                    }
                    document.append_child(parent, id)?;
                    id
                }
            }
            HtmlNode::Text(text) => {
                append_text(document, parent, text)?;
                continue;
            }
            _ => continue,
        };
        let children: Vec<_> = source.children().collect();
        for child in children.into_iter().rev() {
            stack.push((child, target));
        }
    }
    Ok(())
}

fn append_text(document: &mut Document, parent: NodeId, text: &str) -> Result<(), DomError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let id = document.create_text(text);
    document.append_child(parent, id)
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
