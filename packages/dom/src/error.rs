use thiserror::Error;

use crate::NodeId;

pub type DomResult<T> = Result<T, DomError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is not text")]
    NotText(NodeId),

    #[error("Node {0} has no parent")]
    Detached(NodeId),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The root node cannot be released")]
    ReleaseRoot,

    #[error("Offset {offset} out of bounds for node {node}")]
    OffsetOutOfBounds { node: NodeId, offset: usize },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Malformed markup at {pos}: {message}")]
    Markup { pos: usize, message: String },
}

impl DomError {
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    pub fn markup(pos: usize, message: impl Into<String>) -> Self {
        Self::Markup {
            pos,
            message: message.into(),
        }
    }
}
