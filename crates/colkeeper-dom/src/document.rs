//! Arena document with mutation recording.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::DomError;
use crate::event::{MutationKind, MutationRecord};
use crate::grid::GridInstance;
use crate::node::{ElementData, Node, NodeId, NodeKind};

/// A page document: one tree rooted at the document node plus any number of
/// shadow trees hanging off elements.
///
/// Nodes are never freed. Removing a node detaches it; its id stays valid but
/// it no longer belongs to any root.
pub struct Document {
    nodes: Vec<Node>,
    url: Url,
    pending: Vec<MutationRecord>,
}

impl Document {
    pub fn new(url: Url) -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            url,
            pending: Vec::new(),
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId::from_raw(0)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Attach an open shadow root to `host`, returning the existing one if any.
    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId, DomError> {
        if let Some(existing) = self.element_mut(host)?.shadow_root {
            return Ok(existing);
        }
        let shadow = self.push(NodeKind::ShadowRoot { host });
        self.element_mut(host)?.shadow_root = Some(shadow);
        Ok(shadow)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host).and_then(|e| e.shadow_root)
    }

    /// Append `child` to `parent`, moving it if it is already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.node(parent).ok_or(DomError::NodeNotFound(parent))?;
        let child_node = self.node(child).ok_or(DomError::NodeNotFound(child))?;
        if matches!(child_node.kind, NodeKind::Document | NodeKind::ShadowRoot { .. }) {
            return Err(DomError::Hierarchy(format!("{} cannot be inserted", child)));
        }
        if matches!(self.kind(parent), Some(NodeKind::Text(_))) {
            return Err(DomError::Hierarchy(format!("text node {} cannot have children", parent)));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy(format!(
                "{} is an ancestor of {}",
                child, parent
            )));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::Hierarchy(format!(
                    "{} is not a child of {}",
                    reference, parent
                )));
            }
        }

        self.detach(child)?;

        let node = self.node_mut(parent)?;
        let position = reference
            .and_then(|r| node.children.iter().position(|c| *c == r))
            .unwrap_or(node.children.len());
        node.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        self.record(parent, MutationKind::ChildList);
        Ok(())
    }

    /// Detach a node from its parent.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.detach(id)
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node_mut(id)?.parent.take() else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != id);
        self.record(parent, MutationKind::ChildList);
        Ok(())
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn has_class(&self, id: NodeId, token: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(token))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(id)?;
        match element.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attributes.push((name.clone(), value.to_string())),
        }
        self.record(id, MutationKind::Attribute { name });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        let element = self.element_mut(id)?;
        let before = element.attributes.len();
        element.attributes.retain(|(key, _)| key != name);
        if element.attributes.len() != before {
            self.record(
                id,
                MutationKind::Attribute {
                    name: name.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Live object property; not observed by mutation records.
    pub fn property(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.element(id).and_then(|e| e.properties.get(name))
    }

    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) -> Result<(), DomError> {
        self.element_mut(id)?
            .properties
            .insert(name.to_string(), value);
        Ok(())
    }

    pub fn bind_grid(&mut self, id: NodeId, grid: Arc<dyn GridInstance>) -> Result<(), DomError> {
        self.element_mut(id)?.grid = Some(grid);
        Ok(())
    }

    pub fn grid(&self, id: NodeId) -> Option<Arc<dyn GridInstance>> {
        self.element(id).and_then(|e| e.grid.clone())
    }

    /// Value of one inline style property.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        parse_style(style)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Set (or with `None`, clear) one inline style property.
    pub fn set_style(
        &mut self,
        id: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        let mut declarations = self
            .attribute(id, "style")
            .map(parse_style)
            .unwrap_or_default();
        declarations.retain(|(name, _)| name != property);
        if let Some(value) = value {
            declarations.push((property.to_string(), value.to_string()));
        }
        if declarations.is_empty() {
            return self.remove_attribute(id, "style");
        }
        let text = declarations
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "style", &text)
    }

    fn record(&mut self, target: NodeId, kind: MutationKind) {
        // Changes inside detached subtrees are invisible to observers.
        if let Some(root) = self.containing_root(target) {
            self.pending.push(MutationRecord { root, target, kind });
        }
    }

    pub(crate) fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            (!name.is_empty()).then(|| (name, value.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
