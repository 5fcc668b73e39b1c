//! Finding annotations around the selection and across the document.

use crate::markings::{is_annotation, name_of, uid_of, ANNOTATION_CLASS, DATA_ANNOTATION};
use marginalia_dom::{Document, NodeId, Selector};
use marginalia_editor::Range;
use serde::Serialize;
use std::collections::BTreeMap;

/// The annotation enclosing a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifiedAnnotation {
    pub uid: String,
    pub name: String,

    /// Every element carrying `uid`, in document order
    pub elements: Vec<NodeId>,
}

/// Node the selection start sits on: the child at the offset when the
/// container is an element, else the container itself
fn start_node(doc: &Document, range: &Range) -> NodeId {
    let start = range.start;
    if doc.is_element(start.container) {
        if let Some(child) = doc.child(start.container, start.offset) {
            return child;
        }
    }
    start.container
}

/// Innermost annotation enclosing the start of `range`, optionally limited
/// to one annotation name
pub fn identify(doc: &Document, range: &Range, name: Option<&str>) -> Option<IdentifiedAnnotation> {
    let selector = match name {
        Some(name) => Selector::attribute_equals(DATA_ANNOTATION, name),
        None => Selector::class(ANNOTATION_CLASS),
    };
    let root = doc.root();
    let found = doc.closest(
        start_node(doc, range),
        |doc, node| is_annotation(doc, node) && selector.matches(doc, node),
        |node| node == root,
    )?;

    let uid = uid_of(doc, found)?.to_string();
    let name = name_of(doc, found).unwrap_or_default().to_string();
    let elements = find_markers(doc, &uid);
    Some(IdentifiedAnnotation {
        uid,
        name,
        elements,
    })
}

/// Every element carrying `uid`, in document order
pub fn find_markers(doc: &Document, uid: &str) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|node| uid_of(doc, *node) == Some(uid))
        .collect()
}

/// Every annotation named `name`, grouped by uid
pub fn find_all(doc: &Document, name: &str) -> BTreeMap<String, Vec<NodeId>> {
    let mut all: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
    for node in doc.descendants(doc.root()) {
        if name_of(doc, node) != Some(name) {
            continue;
        }
        if let Some(uid) = uid_of(doc, node) {
            all.entry(uid.to_string()).or_default().push(node);
        }
    }
    all
}
