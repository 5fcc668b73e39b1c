//! Decorators turn an annotation's uid and data into the extra attributes
//! and classes written onto its markers.

use crate::errors::DecorateError;
use serde::{Deserialize, Serialize};

/// Free-form data passed through `annotate` to the decorator
pub type DecoratorData = serde_json::Map<String, serde_json::Value>;

/// Attributes and classes contributed by a decorator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    /// Attribute names and values, in the order they are written
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl Decoration {
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.classes.is_empty()
    }
}

/// Produces the decoration for one annotate call
pub trait Decorator {
    fn decorate(&self, uid: &str, data: &DecoratorData) -> Result<Decoration, DecorateError>;
}

impl<F> Decorator for F
where
    F: Fn(&str, &DecoratorData) -> Decoration,
{
    fn decorate(&self, uid: &str, data: &DecoratorData) -> Result<Decoration, DecorateError> {
        Ok(self(uid, data))
    }
}

/// Decorator that adds nothing beyond the base markings
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDecorator;

impl Decorator for PlainDecorator {
    fn decorate(&self, _uid: &str, _data: &DecoratorData) -> Result<Decoration, DecorateError> {
        Ok(Decoration::default())
    }
}
