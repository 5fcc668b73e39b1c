//! Error types for the annotation engine

use marginalia_dom::DomError;
use marginalia_editor::EditorError;
use thiserror::Error;

pub type AnnotateResult<T> = Result<T, AnnotateError>;

/// Failure reported by a decorator callback
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Decorator for '{name}' failed: {message}")]
pub struct DecorateError {
    pub name: String,
    pub message: String,
}

impl DecorateError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotateError {
    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(String),

    #[error(transparent)]
    Decorate(#[from] DecorateError),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AnnotateError {
    pub fn config(message: impl Into<String>) -> Self {
        AnnotateError::Config(message.into())
    }
}
