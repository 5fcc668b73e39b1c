//! # Selection Bookmarks
//!
//! Keeps a selection alive across structural edits by dropping marker spans
//! at its boundaries, then turning the markers back into a range.
//!
//! ## Design
//!
//! - Markers are `span[data-mce-type="bookmark"]`, so they survive any edit
//!   that moves nodes around rather than rewriting offsets
//! - The end marker goes in first so the start offset is still valid when
//!   its marker is inserted
//! - Removing a marker merges the two text nodes it separated

use crate::selection::{insert_node, validate, Position, Range};
use crate::{Editor, EditorError};
use marginalia_dom::{Document, NodeId, ZWSP};
use tracing::{trace, warn};

pub const BOOKMARK_TYPE_ATTR: &str = "data-mce-type";
pub const BOOKMARK_TYPE: &str = "bookmark";
const BOOKMARK_STYLE: &str = "overflow:hidden;line-height:0px";

/// Whether `id` is a bookmark marker span
pub fn is_bookmark(doc: &Document, id: NodeId) -> bool {
    doc.tag_name(id) == Some("span") && doc.attr(id, BOOKMARK_TYPE_ATTR) == Some(BOOKMARK_TYPE)
}

struct Markers {
    start: NodeId,
    end: Option<NodeId>,
}

impl Markers {
    fn insert(doc: &mut Document, range: &Range, insert_zwsp: bool) -> Result<Self, EditorError> {
        let end = if range.collapsed() {
            None
        } else {
            let marker = create_marker(doc, insert_zwsp)?;
            insert_node(doc, range.end, marker)?;
            Some(marker)
        };
        let start = create_marker(doc, insert_zwsp)?;
        insert_node(doc, range.start, start)?;
        Ok(Self { start, end })
    }

    /// The range strictly between the markers
    fn inner_range(&self, doc: &Document) -> Result<Range, EditorError> {
        let start = after(doc, self.start)?;
        let end = match self.end {
            Some(marker) => before(doc, marker)?,
            None => start,
        };
        Ok(Range::new(start, end))
    }

    fn restore(self, doc: &mut Document) -> Result<Range, EditorError> {
        let start = remove_marker(doc, self.start)?;
        let end = match self.end {
            Some(marker) => remove_marker(doc, marker)?,
            None => start,
        };
        Ok(Range::new(start, end))
    }
}

fn create_marker(doc: &mut Document, insert_zwsp: bool) -> Result<NodeId, EditorError> {
    let marker = doc.create_element("span");
    doc.set_attr(marker, BOOKMARK_TYPE_ATTR, BOOKMARK_TYPE)?;
    doc.set_attr(marker, "style", BOOKMARK_STYLE)?;
    if insert_zwsp {
        let filler = doc.create_text(ZWSP.to_string());
        doc.append_child(marker, filler)?;
    }
    Ok(marker)
}

fn location(doc: &Document, marker: NodeId) -> Result<(NodeId, usize), EditorError> {
    if !doc.is_attached(marker) {
        return Err(EditorError::MissingBookmark);
    }
    let parent = doc.parent(marker).ok_or(EditorError::MissingBookmark)?;
    let index = doc
        .index_in_parent(marker)
        .ok_or(EditorError::MissingBookmark)?;
    Ok((parent, index))
}

fn after(doc: &Document, marker: NodeId) -> Result<Position, EditorError> {
    let (parent, index) = location(doc, marker)?;
    Ok(Position::new(parent, index + 1))
}

fn before(doc: &Document, marker: NodeId) -> Result<Position, EditorError> {
    let (parent, index) = location(doc, marker)?;
    Ok(Position::new(parent, index))
}

fn remove_marker(doc: &mut Document, marker: NodeId) -> Result<Position, EditorError> {
    let (parent, index) = location(doc, marker).inspect_err(|_| {
        warn!(marker = %marker, "bookmark marker is gone");
    })?;
    let previous = doc.previous_sibling(marker);
    let next = doc.next_sibling(marker);
    doc.release(marker)?;

    if let (Some(previous), Some(next)) = (previous, next) {
        if let (Some(left), Some(right)) = (doc.text(previous), doc.text(next)) {
            let offset = doc.text_len(previous);
            let merged = format!("{}{}", left, right);
            doc.set_text(previous, merged)?;
            doc.detach(next)?;
            trace!(node = %previous, offset, "merged text around bookmark");
            return Ok(Position::new(previous, offset));
        }
    }
    Ok(Position::new(parent, index))
}

/// Run `f` with the current selection pinned by bookmark markers.
///
/// `f` sees the selection set to the range between the markers. Afterwards
/// the markers are removed and the selection is restored to the equivalent
/// position. An error from `f` wins over a restore failure.
pub fn preserve<T, E, F>(editor: &mut Editor, insert_zwsp: bool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut Editor) -> Result<T, E>,
    E: From<EditorError>,
{
    let range = *editor.selection();
    validate(editor.document(), &range)?;

    let markers = Markers::insert(editor.document_mut(), &range, insert_zwsp)?;
    let inner = markers.inner_range(editor.document())?;
    editor.selection = inner;

    let outcome = f(editor);
    let restored = markers.restore(editor.document_mut());
    let value = outcome?;
    editor.selection = restored?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(html: &str) -> Editor {
        Editor::from_html(html).unwrap()
    }

    #[test]
    fn test_markers_split_and_merge_text() {
        let mut editor = editor_with("<p>hello world</p>");
        let p = editor.document().children(editor.document().root())[0];
        let text = editor.document().children(p)[0];
        editor
            .set_selection(Range::new(Position::new(text, 2), Position::new(text, 7)))
            .unwrap();

        let seen = preserve(&mut editor, false, |editor| {
            let html = editor.document().to_html();
            assert_eq!(
                html,
                "<p>he<span data-mce-type=\"bookmark\" style=\"overflow:hidden;line-height:0px\"></span>llo w<span data-mce-type=\"bookmark\" style=\"overflow:hidden;line-height:0px\"></span>orld</p>"
            );
            let inner = *editor.selection();
            Ok::<_, EditorError>((inner.start.offset, inner.end.offset))
        })
        .unwrap();
        assert_eq!(seen, (2, 3));

        assert_eq!(editor.document().to_html(), "<p>hello world</p>");
        let restored = *editor.selection();
        assert_eq!(restored, Range::new(Position::new(text, 2), Position::new(text, 7)));
    }

    #[test]
    fn test_marker_slots_are_reused() {
        let mut editor = editor_with("<p><b>a</b><i>b</i></p>");
        let p = editor.document().children(editor.document().root())[0];
        editor.set_selection(Range::caret(p, 1)).unwrap();

        let mut capacities = Vec::new();
        for _ in 0..3 {
            preserve(&mut editor, false, |_| Ok::<_, EditorError>(())).unwrap();
            capacities.push(editor.document().capacity());
        }

        assert_eq!(capacities[0], capacities[1]);
        assert_eq!(capacities[1], capacities[2]);
        assert_eq!(editor.document().to_html(), "<p><b>a</b><i>b</i></p>");
        assert_eq!(*editor.selection(), Range::caret(p, 1));
    }

    #[test]
    fn test_zwsp_filler() {
        let mut editor = editor_with("<p>ab</p>");
        let p = editor.document().children(editor.document().root())[0];
        let text = editor.document().children(p)[0];
        editor.set_selection(Range::caret(text, 1)).unwrap();

        preserve(&mut editor, true, |editor| {
            let markers: Vec<NodeId> = editor
                .document()
                .descendants(editor.document().root())
                .into_iter()
                .filter(|id| is_bookmark(editor.document(), *id))
                .collect();
            assert_eq!(markers.len(), 1);
            assert_eq!(
                editor.document().text_content(markers[0]),
                ZWSP.to_string()
            );
            Ok::<_, EditorError>(())
        })
        .unwrap();

        assert_eq!(editor.document().to_html(), "<p>ab</p>");
        assert_eq!(*editor.selection(), Range::caret(text, 1));
    }

    #[test]
    fn test_element_boundaries_restore_by_index() {
        let mut editor = editor_with("<p>a</p><hr><p>b</p>");
        let root = editor.document().root();
        editor
            .set_selection(Range::select_node_contents(editor.document(), root))
            .unwrap();

        preserve(&mut editor, false, |_| Ok::<_, EditorError>(())).unwrap();

        assert_eq!(editor.document().to_html(), "<p>a</p><hr><p>b</p>");
        assert_eq!(
            *editor.selection(),
            Range::new(Position::new(root, 0), Position::new(root, 3))
        );
    }

    #[test]
    fn test_removed_marker_is_reported() {
        let mut editor = editor_with("<p>abc</p>");
        let p = editor.document().children(editor.document().root())[0];
        let text = editor.document().children(p)[0];
        editor
            .set_selection(Range::new(Position::new(text, 0), Position::new(text, 3)))
            .unwrap();

        let result = preserve(&mut editor, false, |editor| {
            let p = editor.document().children(editor.document().root())[0];
            editor.document_mut().set_inner_html(p, "gone")?;
            Ok::<_, EditorError>(())
        });
        assert_eq!(result, Err(EditorError::MissingBookmark));
    }

    #[test]
    fn test_callback_error_wins() {
        let mut editor = editor_with("<p>abc</p>");
        let p = editor.document().children(editor.document().root())[0];
        editor.set_selection(Range::caret(p, 0)).unwrap();

        let result: Result<(), EditorError> = preserve(&mut editor, false, |_| {
            Err(EditorError::invalid_range("boom"))
        });
        assert_eq!(result, Err(EditorError::invalid_range("boom")));
        assert_eq!(editor.document().to_html(), "<p>abc</p>");
    }
}
