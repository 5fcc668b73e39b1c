//! # Selection Ranges
//!
//! DOM-style boundary points. Offsets count chars inside text nodes and
//! children inside elements.

use crate::cells::selected_cells;
use crate::{Editor, EditorError};
use marginalia_dom::{Document, Node, NodeId};
use serde::{Deserialize, Serialize};

/// A boundary point inside the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub container: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// A selection range between two boundary points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Collapsed range at a single point
    pub fn caret(container: NodeId, offset: usize) -> Self {
        let point = Position::new(container, offset);
        Self::new(point, point)
    }

    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Range around `node` itself, expressed in its parent
    pub fn select_node(doc: &Document, node: NodeId) -> Result<Self, EditorError> {
        let parent = doc
            .parent(node)
            .ok_or_else(|| EditorError::invalid_range(format!("{} has no parent", node)))?;
        let index = doc
            .index_in_parent(node)
            .ok_or_else(|| EditorError::invalid_range(format!("{} has no parent", node)))?;
        Ok(Self::new(
            Position::new(parent, index),
            Position::new(parent, index + 1),
        ))
    }

    /// Range over everything inside `node`
    pub fn select_node_contents(doc: &Document, node: NodeId) -> Self {
        Self::new(
            Position::new(node, 0),
            Position::new(node, max_offset(doc, node)),
        )
    }
}

/// Largest valid offset inside a container
pub fn max_offset(doc: &Document, container: NodeId) -> usize {
    match doc.node(container) {
        Some(Node::Text { .. }) => doc.text_len(container),
        Some(Node::Element { .. }) => doc.children(container).len(),
        _ => 0,
    }
}

/// Check that both boundary points sit in attached containers and within bounds
pub fn validate(doc: &Document, range: &Range) -> Result<(), EditorError> {
    for (label, point) in [("start", range.start), ("end", range.end)] {
        if !doc.has_node(point.container) {
            return Err(EditorError::invalid_range(format!(
                "{} container {} does not exist",
                label, point.container
            )));
        }
        if !doc.is_attached(point.container) {
            return Err(EditorError::invalid_range(format!(
                "{} container {} is not in the document",
                label, point.container
            )));
        }
        let max = max_offset(doc, point.container);
        if point.offset > max {
            return Err(EditorError::invalid_range(format!(
                "{} offset {} exceeds {} for {}",
                label, point.offset, max, point.container
            )));
        }
    }
    Ok(())
}

/// Insert `node` at a boundary point, splitting a text container when the
/// point falls inside it
pub fn insert_node(doc: &mut Document, point: Position, node: NodeId) -> Result<(), EditorError> {
    let container = point.container;
    if doc.is_text(container) {
        if point.offset == 0 {
            doc.insert_before(container, node)?;
        } else if point.offset >= doc.text_len(container) {
            doc.insert_after(container, node)?;
        } else {
            let right = doc.split_text(container, point.offset)?;
            doc.insert_before(right, node)?;
        }
    } else {
        doc.insert_at(container, point.offset, node)?;
    }
    Ok(())
}

/// Run `f` once per selected table cell (over the cell's contents), or once
/// for the current selection when no cells are selected.
pub fn run_on_ranges<E, F>(editor: &mut Editor, mut f: F) -> Result<(), E>
where
    F: FnMut(&mut Editor, &Range) -> Result<(), E>,
{
    let cells = selected_cells(editor.document());
    if cells.is_empty() {
        let range = *editor.selection();
        return f(editor, &range);
    }

    for cell in cells {
        let range = Range::select_node_contents(editor.document(), cell);
        f(editor, &range)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_dom::parse_html;

    #[test]
    fn test_select_node_uses_parent_offsets() {
        let doc = parse_html("<p>before<img>after</p>").unwrap();
        let p = doc.children(doc.root())[0];
        let img = doc.children(p)[1];

        let range = Range::select_node(&doc, img).unwrap();
        assert_eq!(range.start, Position::new(p, 1));
        assert_eq!(range.end, Position::new(p, 2));
        assert!(!range.collapsed());
    }

    #[test]
    fn test_select_node_contents_of_text() {
        let doc = parse_html("<p>hello</p>").unwrap();
        let p = doc.children(doc.root())[0];
        let text = doc.children(p)[0];

        let range = Range::select_node_contents(&doc, text);
        assert_eq!(range.end.offset, 5);
    }

    #[test]
    fn test_insert_node_splits_text() {
        let mut doc = parse_html("<p>abcd</p>").unwrap();
        let p = doc.children(doc.root())[0];
        let text = doc.children(p)[0];

        let br = doc.create_element("br");
        insert_node(&mut doc, Position::new(text, 2), br).unwrap();
        assert_eq!(doc.to_html(), "<p>ab<br>cd</p>");

        let edge = doc.create_element("br");
        insert_node(&mut doc, Position::new(text, 2), edge).unwrap();
        assert_eq!(doc.to_html(), "<p>ab<br><br>cd</p>");

        let first = doc.create_element("wbr");
        insert_node(&mut doc, Position::new(p, 0), first).unwrap();
        assert_eq!(doc.to_html(), "<p><wbr>ab<br><br>cd</p>");
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut doc = parse_html("<p>abc</p>").unwrap();
        let p = doc.children(doc.root())[0];
        let text = doc.children(p)[0];
        let loose = doc.create_text("loose");

        assert!(validate(&doc, &Range::caret(text, 3)).is_ok());
        assert!(validate(&doc, &Range::caret(text, 4)).is_err());
        assert!(validate(&doc, &Range::caret(loose, 0)).is_err());

        let unknown: NodeId = serde_json::from_str("999").unwrap();
        assert!(matches!(
            validate(&doc, &Range::caret(unknown, 0)),
            Err(EditorError::InvalidRange(_))
        ));
    }
}
