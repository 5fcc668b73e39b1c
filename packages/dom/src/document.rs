//! # Document Tree
//!
//! Arena-backed mutable DOM used by the editor and the annotation engine.
//!
//! ## Design
//!
//! - Every node lives in a flat arena and is addressed by [`NodeId`]
//! - Detaching only unlinks a node from its parent; scratch nodes nobody
//!   else holds are handed back with [`Document::release`] and their slots
//!   are reused by the next `create_*` calls
//! - Cloning a document preserves ids, so snapshots can be swapped back in
//!   without invalidating ids held by the caller
//! - The root is a `body` element and is the only node allowed to have no
//!   parent while still being part of the document

use crate::error::{DomError, DomResult};
use crate::node::{byte_index, Node, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Editable document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
    #[serde(default)]
    free: Vec<NodeId>,
}

impl Document {
    /// Create an empty document with a `body` root
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            root: NodeId(0),
            free: Vec::new(),
        };
        doc.root = doc.push(Node::element("body"));
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, node: Node) -> NodeId {
        let slot = Slot {
            node,
            parent: None,
            children: Vec::new(),
        };
        if let Some(id) = self.free.pop() {
            if let Some(reused) = self.slots.get_mut(id.0) {
                *reused = slot;
                return id;
            }
        }
        let id = NodeId(self.slots.len());
        self.slots.push(slot);
        id
    }

    fn slot(&self, id: NodeId) -> DomResult<&Slot> {
        self.slots.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> DomResult<&mut Slot> {
        self.slots.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    /// Whether `id` was allocated by this document (attached or not)
    pub fn has_node(&self, id: NodeId) -> bool {
        id.0 < self.slots.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(Node::element(tag))
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(Node::text(content))
    }

    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.push(Node::comment(content))
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|slot| slot.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Whether `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Descendants of `id` in document (preorder) order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Nearest node, starting at `id` itself, for which `predicate` holds.
    ///
    /// The walk stops without matching as soon as `is_root` returns true.
    pub fn closest<P, R>(&self, id: NodeId, predicate: P, is_root: R) -> Option<NodeId>
    where
        P: Fn(&Document, NodeId) -> bool,
        R: Fn(NodeId) -> bool,
    {
        let mut current = Some(id);
        while let Some(node) = current {
            if is_root(node) {
                return None;
            }
            if predicate(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut chain_a = vec![a];
        chain_a.extend(self.ancestors(a));
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|candidate| chain_a.contains(candidate))
    }

    /// Deepest first descendant of `id` (or `id` when it has no children)
    pub fn first_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(child) = self.first_child(current) {
            current = child;
        }
        current
    }

    /// Deepest last descendant of `id` (or `id` when it has no children)
    pub fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(child) = self.last_child(current) {
            current = child;
        }
        current
    }

    /// First leaf that follows the whole subtree of `id`, staying inside `root`
    pub fn next_leaf_after(&self, id: NodeId, root: NodeId) -> Option<NodeId> {
        let mut current = id;
        while current != root {
            if let Some(sibling) = self.next_sibling(current) {
                return Some(self.first_leaf(sibling));
            }
            current = self.parent(current)?;
        }
        None
    }

    /// Last leaf that precedes the whole subtree of `id`, staying inside `root`
    pub fn previous_leaf_before(&self, id: NodeId, root: NodeId) -> Option<NodeId> {
        let mut current = id;
        while current != root {
            if let Some(sibling) = self.previous_sibling(current) {
                return Some(self.last_leaf(sibling));
            }
            current = self.parent(current)?;
        }
        None
    }

    // ---------------------------------------------------------------------
    // Structure mutation
    // ---------------------------------------------------------------------

    /// Unlink a node from its parent (no-op for detached nodes)
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self.slot(id)?.parent;
        if let Some(parent) = parent {
            self.slot_mut(parent)?.children.retain(|c| *c != id);
            self.slot_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Detach `id` and free it together with its descendants.
    ///
    /// Released ids are handed out again by later `create_*` calls, so only
    /// release nodes that no caller still refers to.
    pub fn release(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::ReleaseRoot);
        }
        if self.free.contains(&id) {
            return Ok(());
        }
        self.detach(id)?;
        let mut released = self.descendants(id);
        released.push(id);
        for node in released {
            let slot = self.slot_mut(node)?;
            slot.node = Node::comment("");
            slot.parent = None;
            slot.children.clear();
            self.free.push(node);
        }
        Ok(())
    }

    /// Number of allocated slots, released ones included
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insert `child` into `parent` at `index` (clamped), moving it if attached elsewhere
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> DomResult<()> {
        self.slot(child)?;
        if !self.slot(parent)?.node.is_element() {
            return Err(DomError::NotAnElement(parent));
        }
        if self.contains(child, parent) {
            return Err(DomError::CycleDetected);
        }
        self.detach(child)?;

        let children = &mut self.slot_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_at(parent, usize::MAX, child)
    }

    /// Insert `node` immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> DomResult<()> {
        if reference == node {
            return Ok(());
        }
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.detach(node)?;
        let index = self
            .index_in_parent(reference)
            .ok_or(DomError::Detached(reference))?;
        self.insert_at(parent, index, node)
    }

    /// Insert `node` immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> DomResult<()> {
        if reference == node {
            return Ok(());
        }
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.detach(node)?;
        let index = self
            .index_in_parent(reference)
            .ok_or(DomError::Detached(reference))?;
        self.insert_at(parent, index + 1, node)
    }

    /// Put `wrapper` where `node` is, then move `node` to the end of `wrapper`.
    ///
    /// An already attached wrapper is moved, which is how a run of adjacent
    /// siblings is gathered into one wrapper.
    pub fn wrap(&mut self, node: NodeId, wrapper: NodeId) -> DomResult<()> {
        if self.parent(node).is_none() {
            return Err(DomError::Detached(node));
        }
        self.insert_before(node, wrapper)?;
        self.append_child(wrapper, node)
    }

    /// Replace an element by its children
    pub fn unwrap(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self.parent(id).ok_or(DomError::Detached(id))?;
        let index = self.index_in_parent(id).ok_or(DomError::Detached(id))?;
        let children = self.children(id).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_at(parent, index + offset, child)?;
        }
        self.detach(id)
    }

    /// Copy a node's payload (tag and attributes, or text) without children
    pub fn shallow_clone(&mut self, id: NodeId) -> DomResult<NodeId> {
        let node = self.slot(id)?.node.clone();
        Ok(self.push(node))
    }

    // ---------------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------------

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::as_text)
    }

    /// Length in chars of a text node (0 for anything else)
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map(|t| t.chars().count()).unwrap_or(0)
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> DomResult<()> {
        match &mut self.slot_mut(id)?.node {
            Node::Text { content } => {
                *content = value.into();
                Ok(())
            }
            _ => Err(DomError::NotText(id)),
        }
    }

    /// Split a text node at a char offset; the right half becomes a new
    /// sibling placed directly after the original, and its id is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> DomResult<NodeId> {
        let content = self.text(id).ok_or(DomError::NotText(id))?;
        if offset > content.chars().count() {
            return Err(DomError::OffsetOutOfBounds { node: id, offset });
        }
        let at = byte_index(content, offset);
        let right = content[at..].to_string();
        let left = content[..at].to_string();

        self.set_text(id, left)?;
        let new_node = self.create_text(right);
        if self.parent(id).is_some() {
            self.insert_after(id, new_node)?;
        }
        Ok(new_node)
    }

    /// Concatenated text of every text node below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text(d))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Elements, attributes and classes
    // ---------------------------------------------------------------------

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_element)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_text)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id)? {
            Node::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// DOM node name (`#text` for text nodes); empty for unknown ids
    pub fn node_name(&self, id: NodeId) -> &str {
        self.node(id).map(Node::name).unwrap_or("")
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.node(id) {
            Some(Node::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    fn attributes_mut(&mut self, id: NodeId) -> DomResult<&mut Vec<(String, String)>> {
        match &mut self.slot_mut(id)?.node {
            Node::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let name = name.into();
        let value = value.into();
        let attributes = self.attributes_mut(id)?;
        match attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => attributes.push((name, value)),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        self.attributes_mut(id)?.retain(|(key, _)| key != name);
        Ok(())
    }

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        if class.is_empty() || self.has_class(id, class) {
            return self.attributes_mut(id).map(|_| ());
        }
        let mut classes: Vec<String> = self.classes(id).into_iter().map(str::to_string).collect();
        classes.push(class.to_string());
        self.set_attr(id, "class", classes.join(" "))
    }

    /// Remove a class; the `class` attribute goes away with its last class
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        if !self.has_class(id, class) {
            return self.attributes_mut(id).map(|_| ());
        }
        let remaining: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if remaining.is_empty() {
            self.remove_attr(id, "class")
        } else {
            self.set_attr(id, "class", remaining.join(" "))
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's ancestors, nearest first
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}
