//! Page lifecycle and mutation events.

use url::Url;

use crate::node::NodeId;

/// Kind of a recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children added to or removed from the target.
    ChildList,
    /// An attribute of the target changed.
    Attribute { name: String },
}

/// A single mutation, attributed to the document or shadow root it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub root: NodeId,
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attribute { name } => Some(name),
            MutationKind::ChildList => None,
        }
    }
}

/// Events published by a [`Page`](crate::Page).
#[derive(Debug, Clone)]
pub enum PageEvent {
    Mutation(MutationRecord),
    /// The page finished loading.
    Load,
    /// Client-side navigation changed the location.
    Navigated(Url),
}
