//! Error types for the editor

use marginalia_dom::DomError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Bookmark marker was removed from the document")]
    MissingBookmark,
}

impl EditorError {
    pub fn invalid_range(message: impl Into<String>) -> Self {
        EditorError::InvalidRange(message.into())
    }
}
