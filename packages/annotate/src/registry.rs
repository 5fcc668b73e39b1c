//! Registered annotation names and their decorators, owned by one annotator.

use crate::decorator::{Decorator, PlainDecorator};
use std::collections::BTreeMap;
use std::fmt;

/// How one annotation name is decorated and serialized
pub struct AnnotatorSettings {
    pub decorator: Box<dyn Decorator>,

    /// Whether markers survive into serialized content
    pub persistent: bool,
}

impl AnnotatorSettings {
    pub fn new(decorator: impl Decorator + 'static) -> Self {
        Self {
            decorator: Box::new(decorator),
            persistent: true,
        }
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

impl Default for AnnotatorSettings {
    fn default() -> Self {
        Self::new(PlainDecorator)
    }
}

impl fmt::Debug for AnnotatorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatorSettings")
            .field("persistent", &self.persistent)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct AnnotationsRegistry {
    annotations: BTreeMap<String, AnnotatorSettings>,
}

impl AnnotationsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, replacing any earlier registration
    pub fn register(&mut self, name: impl Into<String>, settings: AnnotatorSettings) {
        self.annotations.insert(name.into(), settings);
    }

    pub fn lookup(&self, name: &str) -> Option<&AnnotatorSettings> {
        self.annotations.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.annotations.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotatorSettings)> {
        self.annotations
            .iter()
            .map(|(name, settings)| (name.as_str(), settings))
    }
}
