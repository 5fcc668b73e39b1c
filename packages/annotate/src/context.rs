//! # Node Classifier
//!
//! Decides, per node, what the wrapping engine does with it.
//!
//! ## Decision order (first match wins)
//!
//! - No parent: `Skipping`
//! - `br` or a text node holding only a ZWSP: `Valid`
//! - Already annotated: `Existing`
//! - Caret or bookmark placeholder: `Caret`
//! - Matches a direct-block selector: `ValidBlock`
//! - Matches a wrap-block selector: `ValidWrapBlock`
//! - Wrapper cannot hold the node, or the parent cannot hold the wrapper:
//!   `InvalidChild`
//! - Otherwise `Valid`

use crate::config::ClassifierRules;
use crate::markings::is_annotation;
use marginalia_dom::{Document, NodeId, Schema, ZWSP};
use marginalia_editor::bookmark::is_bookmark;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildContext {
    Skipping,
    Existing,
    InvalidChild,
    Caret,
    Valid,
    /// Annotate the element itself
    ValidBlock,
    /// Wrap the element in a wrapper of its own
    ValidWrapBlock,
}

impl fmt::Display for ChildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChildContext::Skipping => "skipping",
            ChildContext::Existing => "existing",
            ChildContext::InvalidChild => "invalid-child",
            ChildContext::Caret => "caret",
            ChildContext::Valid => "valid",
            ChildContext::ValidBlock => "valid-block",
            ChildContext::ValidWrapBlock => "valid-wrap-block",
        };
        f.write_str(name)
    }
}

fn is_zero_width(doc: &Document, id: NodeId) -> bool {
    let Some(text) = doc.text(id) else {
        return false;
    };
    let mut chars = text.chars();
    chars.next() == Some(ZWSP) && chars.next().is_none()
}

/// Caret containers and selection bookmarks
pub fn is_caret_node(doc: &Document, id: NodeId) -> bool {
    is_bookmark(doc, id) || doc.has_attr(id, "data-mce-caret") || doc.attr(id, "id") == Some("_mce_caret")
}

/// Classify `node` for wrapping in `rules.wrapper_tag`
pub fn classify(doc: &Document, schema: &Schema, rules: &ClassifierRules, node: NodeId) -> ChildContext {
    let Some(parent) = doc.parent(node) else {
        return ChildContext::Skipping;
    };

    let node_name = doc.node_name(node);
    if node_name == "br" || is_zero_width(doc, node) {
        return ChildContext::Valid;
    }
    if is_annotation(doc, node) {
        return ChildContext::Existing;
    }
    if is_caret_node(doc, node) {
        return ChildContext::Caret;
    }
    if rules.direct_blocks.iter().any(|s| s.matches(doc, node)) {
        return ChildContext::ValidBlock;
    }
    if rules.wrap_blocks.iter().any(|s| s.matches(doc, node)) {
        return ChildContext::ValidWrapBlock;
    }

    let wrapper = rules.wrapper_tag.as_str();
    let parent_name = doc.node_name(parent);
    if !schema.is_valid_child(wrapper, node_name) || !schema.is_valid_child(parent_name, wrapper) {
        return ChildContext::InvalidChild;
    }
    ChildContext::Valid
}
