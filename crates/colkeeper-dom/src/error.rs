//! DOM error types.

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by document operations.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is not an element: {0}")]
    NotAnElement(NodeId),

    #[error("Hierarchy request error: {0}")]
    Hierarchy(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
