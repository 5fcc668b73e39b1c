//! # Range Walker
//!
//! Splits a range into runs of sibling nodes so callers can process whole
//! subtrees instead of individual leaves.
//!
//! ## Design
//!
//! - Each segment is a list of adjacent siblings in document order
//! - Partially selected ancestors are never yielded; their selected children are
//! - A text node that the range touches only at its very edge is excluded
//! - Segments are collected up front so the caller can mutate the tree while
//!   consuming them

use crate::selection::{validate, Range};
use crate::EditorError;
use marginalia_dom::{Document, NodeId};
use tracing::trace;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

struct Walk<'a> {
    doc: &'a Document,
    range: Range,
    segments: Vec<Vec<NodeId>>,
}

impl Walk<'_> {
    /// Drop text nodes at either edge that the range only touches
    fn exclude(&self, mut nodes: Vec<NodeId>) -> Vec<NodeId> {
        let start = self.range.start;
        if let Some(&first) = nodes.first() {
            if self.doc.is_text(first)
                && first == start.container
                && start.offset >= self.doc.text_len(first)
            {
                nodes.remove(0);
            }
        }

        let end = self.range.end;
        if let Some(&last) = nodes.last() {
            if self.doc.is_text(last) && last == end.container && end.offset == 0 {
                nodes.pop();
            }
        }
        nodes
    }

    fn emit(&mut self, nodes: Vec<NodeId>) {
        let nodes = self.exclude(nodes);
        if !nodes.is_empty() {
            self.segments.push(nodes);
        }
    }

    fn sibling(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        match direction {
            Direction::Forward => self.doc.next_sibling(node),
            Direction::Backward => self.doc.previous_sibling(node),
        }
    }

    fn collect_siblings(
        &self,
        from: Option<NodeId>,
        direction: Direction,
        stop: Option<NodeId>,
    ) -> Vec<NodeId> {
        let mut siblings = Vec::new();
        let mut current = from;
        while let Some(node) = current {
            if Some(node) == stop {
                break;
            }
            siblings.push(node);
            current = self.sibling(node, direction);
        }
        siblings
    }

    /// Climb from `start` up to (not including) `stop`, yielding the siblings
    /// on one side at every level
    fn walk_boundary(&mut self, start: NodeId, stop: NodeId, direction: Direction) {
        let mut current = Some(start);
        while let Some(node) = current {
            if node == stop {
                break;
            }
            let from = if node == start {
                Some(node)
            } else {
                self.sibling(node, direction)
            };
            let mut siblings = self.collect_siblings(from, direction, None);
            if !siblings.is_empty() {
                if direction == Direction::Backward {
                    siblings.reverse();
                }
                self.emit(siblings);
            }
            current = self.doc.parent(node);
        }
    }
}

/// Child of `root` on the path from `node`, if `node` sits below `root`
fn find_end_point(doc: &Document, node: NodeId, root: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = doc.parent(current)?;
        if parent == root {
            return Some(current);
        }
        current = parent;
    }
}

/// Child indices from the root down to `node`
fn index_path(doc: &Document, node: NodeId) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(index) = doc.index_in_parent(current) {
        path.push(index);
        current = match doc.parent(current) {
            Some(parent) => parent,
            None => break,
        };
    }
    path.reverse();
    path
}

fn resolve_start(doc: &Document, range: &Range) -> Option<NodeId> {
    let start = range.start;
    if !doc.is_element(start.container) || doc.children(start.container).is_empty() {
        return Some(start.container);
    }
    match doc.child(start.container, start.offset) {
        Some(child) => Some(child),
        None => doc.next_leaf_after(start.container, doc.root()),
    }
}

fn resolve_end(doc: &Document, range: &Range) -> Option<NodeId> {
    let end = range.end;
    let children = doc.children(end.container);
    if !doc.is_element(end.container) || children.is_empty() {
        return Some(end.container);
    }
    if end.offset == 0 {
        return doc.previous_leaf_before(end.container, doc.root());
    }
    let index = (end.offset - 1).min(children.len() - 1);
    children.get(index).copied()
}

/// Split `range` into segments of adjacent sibling nodes covering it
pub fn walk(doc: &Document, range: &Range) -> Result<Vec<Vec<NodeId>>, EditorError> {
    validate(doc, range)?;
    if range.collapsed() {
        return Ok(Vec::new());
    }

    let (Some(start), Some(end)) = (resolve_start(doc, range), resolve_end(doc, range)) else {
        return Ok(Vec::new());
    };
    if start != end
        && !doc.contains(start, end)
        && !doc.contains(end, start)
        && index_path(doc, start) > index_path(doc, end)
    {
        trace!(start = %start, end = %end, "range resolves to nothing");
        return Ok(Vec::new());
    }

    let mut walk = Walk {
        doc,
        range: *range,
        segments: Vec::new(),
    };

    if start == end {
        walk.emit(vec![start]);
        return Ok(walk.segments);
    }

    let Some(ancestor) = doc.common_ancestor(start, end) else {
        return Ok(Vec::new());
    };

    // End encloses start: everything after start inside end
    if doc.contains(end, start) {
        walk.walk_boundary(start, ancestor, Direction::Forward);
        return Ok(walk.segments);
    }

    // Start encloses end: everything before end inside start
    if doc.contains(start, end) {
        walk.walk_boundary(end, ancestor, Direction::Backward);
        return Ok(walk.segments);
    }

    let start_point = find_end_point(doc, start, ancestor).unwrap_or(start);
    let end_point = find_end_point(doc, end, ancestor).unwrap_or(end);

    walk.walk_boundary(start, start_point, Direction::Forward);

    let from = if start_point == start {
        Some(start_point)
    } else {
        doc.next_sibling(start_point)
    };
    let stop = if end_point == end {
        doc.next_sibling(end_point)
    } else {
        Some(end_point)
    };
    let middle = walk.collect_siblings(from, Direction::Forward, stop);
    if !middle.is_empty() {
        walk.emit(middle);
    }

    walk.walk_boundary(end, end_point, Direction::Backward);

    Ok(walk.segments)
}
