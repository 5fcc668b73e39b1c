//! # Wrapping Engine
//!
//! Marks every node a range touches, either by gathering runs of inline
//! content into wrapper elements or by decorating block elements in place.
//!
//! ## Design
//!
//! - One detached master element carries the full marker; every wrapper is a
//!   shallow clone of it, so all wrappers of a call are identical. The master
//!   is released once the range is wrapped
//! - The open wrapper is an `Option` threaded through the visit and reset at
//!   every segment boundary
//! - Block-like verdicts close the open wrapper so later siblings never merge
//!   into a wrapper opened before the block

use crate::config::ClassifierRules;
use crate::context::{classify, ChildContext};
use crate::errors::{AnnotateError, AnnotateResult};
use crate::markings::{apply_annotation, Marker};
use marginalia_dom::{Document, NodeId, Schema, NBSP};
use marginalia_editor::expand::expand_word;
use marginalia_editor::{bookmark, insert_node, range_walk, run_on_ranges, Editor, Range};
use tracing::{debug, trace};

/// Build the detached master wrapper for one annotate call
fn make_annotation(
    doc: &mut Document,
    rules: &ClassifierRules,
    marker: &Marker<'_>,
) -> AnnotateResult<NodeId> {
    let master = doc.create_element(rules.wrapper_tag.as_str());
    apply_annotation(doc, master, marker, false)?;
    Ok(master)
}

struct WrapEngine<'a> {
    doc: &'a mut Document,
    schema: &'a Schema,
    rules: &'a ClassifierRules,
    marker: &'a Marker<'a>,
    master: NodeId,
    created: Vec<NodeId>,
}

impl WrapEngine<'_> {
    fn get_or_open_wrapper(&mut self, open: &mut Option<NodeId>) -> AnnotateResult<NodeId> {
        if let Some(wrapper) = *open {
            return Ok(wrapper);
        }
        let wrapper = self.doc.shallow_clone(self.master)?;
        self.created.push(wrapper);
        *open = Some(wrapper);
        trace!(wrapper = %wrapper, "opened wrapper");
        Ok(wrapper)
    }

    fn process_elements(&mut self, nodes: &[NodeId], open: &mut Option<NodeId>) -> AnnotateResult<()> {
        for node in nodes {
            self.process_element(*node, open)?;
        }
        Ok(())
    }

    fn process_element(&mut self, node: NodeId, open: &mut Option<NodeId>) -> AnnotateResult<()> {
        let verdict = classify(self.doc, self.schema, self.rules, node);
        trace!(node = %node, verdict = %verdict, "classified");

        match verdict {
            ChildContext::InvalidChild => {
                *open = None;
                let children = self.doc.children(node).to_vec();
                self.process_elements(&children, open)?;
                *open = None;
            }
            ChildContext::ValidBlock => {
                *open = None;
                apply_annotation(self.doc, node, self.marker, true)?;
                debug!(node = %node, "annotated block directly");
            }
            ChildContext::ValidWrapBlock => {
                *open = None;
                let wrapper = self.get_or_open_wrapper(open)?;
                self.doc.wrap(node, wrapper)?;
                *open = None;
            }
            ChildContext::Valid => {
                let wrapper = self.get_or_open_wrapper(open)?;
                self.doc.wrap(node, wrapper)?;
            }
            ChildContext::Skipping | ChildContext::Existing | ChildContext::Caret => {
                *open = None;
            }
        }
        Ok(())
    }
}

/// Mark everything `range` touches; returns the wrappers created
pub fn wrap(
    editor: &mut Editor,
    range: &Range,
    rules: &ClassifierRules,
    marker: &Marker<'_>,
) -> AnnotateResult<Vec<NodeId>> {
    let segments = range_walk::walk(editor.document(), range)?;
    let (doc, schema) = editor.document_and_schema();
    let master = make_annotation(doc, rules, marker)?;

    let mut engine = WrapEngine {
        doc,
        schema,
        rules,
        marker,
        master,
        created: Vec::new(),
    };
    for segment in &segments {
        let mut open = None;
        engine.process_elements(segment, &mut open)?;
    }
    engine.doc.release(master)?;

    debug!(
        segments = segments.len(),
        wrappers = engine.created.len(),
        "wrapped range"
    );
    Ok(engine.created)
}

/// Insert a single NBSP-filled wrapper at a caret and select it
fn insert_placeholder(
    editor: &mut Editor,
    rules: &ClassifierRules,
    marker: &Marker<'_>,
) -> AnnotateResult<NodeId> {
    let caret = editor.selection().start;
    let doc = editor.document_mut();
    let wrapper = make_annotation(doc, rules, marker)?;
    let filler = doc.create_text(NBSP.to_string());
    doc.append_child(wrapper, filler)?;
    insert_node(doc, caret, wrapper)?;
    editor.select_node(wrapper)?;
    debug!(wrapper = %wrapper, "inserted placeholder annotation at caret");
    Ok(wrapper)
}

/// Annotate the current selection as one undoable step.
///
/// A collapsed selection first grows to the surrounding word; if there is no
/// word, a placeholder wrapper is inserted at the caret instead. Otherwise
/// every range of the selection (one per selected table cell, if any) is
/// wrapped with the selection pinned by bookmarks.
pub fn annotate_with_bookmark(
    editor: &mut Editor,
    rules: &ClassifierRules,
    marker: &Marker<'_>,
) -> AnnotateResult<Vec<NodeId>> {
    let description = format!("Annotate {}", marker.name);
    editor.transact(&description, |editor| {
        let has_fake_selection = !editor.selected_cells().is_empty();

        if editor.selection().collapsed() && !has_fake_selection {
            let expanded = expand_word(editor.document(), editor.selection());
            editor.set_selection(expanded)?;
        }

        if editor.selection().collapsed() && !has_fake_selection {
            let wrapper = insert_placeholder(editor, rules, marker)?;
            return Ok(vec![wrapper]);
        }

        bookmark::preserve(editor, false, |editor| {
            let mut created = Vec::new();
            run_on_ranges(editor, |editor, range| {
                created.extend(wrap(editor, range, rules, marker)?);
                Ok::<_, AnnotateError>(())
            })?;
            Ok(created)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorator::Decoration;
    use marginalia_editor::Position;

    fn wrap_all(html: &str) -> (Editor, Vec<NodeId>) {
        let mut editor = Editor::from_html(html).unwrap();
        editor.select_all();
        let decoration = Decoration::default();
        let marker = Marker {
            uid: "u1",
            name: "c",
            decoration: &decoration,
        };
        let range = *editor.selection();
        let created = wrap(&mut editor, &range, &ClassifierRules::default(), &marker).unwrap();
        (editor, created)
    }

    const WRAPPER: &str =
        r#"<span class="mce-annotation" data-mce-annotation-uid="u1" data-mce-annotation="c">"#;

    #[test]
    fn test_run_of_inline_content_shares_one_wrapper() {
        let (editor, created) = wrap_all("<p>a<b>b</b>c</p>");
        assert_eq!(created.len(), 1);
        assert_eq!(
            editor.document().to_html(),
            format!("<p>{}a<b>b</b>c</span></p>", WRAPPER)
        );
    }

    #[test]
    fn test_master_is_released() {
        let (mut editor, created) = wrap_all("<p>a<b>b</b>c</p>");
        let capacity = editor.document().capacity();

        let next = editor.document_mut().create_element("span");
        assert_eq!(editor.document().capacity(), capacity);
        assert!(!created.contains(&next));
    }

    #[test]
    fn test_wrap_block_splits_runs() {
        let (editor, created) = wrap_all("<p>before<img>after</p>");
        assert_eq!(created.len(), 3);
        assert_eq!(
            editor.document().to_html(),
            format!(
                "<p>{w}before</span>{w}<img></span>{w}after</span></p>",
                w = WRAPPER
            )
        );
    }

    #[test]
    fn test_existing_annotation_is_a_boundary() {
        let (editor, created) = wrap_all(
            r#"<p>a<span class="mce-annotation" data-mce-annotation-uid="old" data-mce-annotation="c">b</span>c</p>"#,
        );
        assert_eq!(created.len(), 2);
        let html = editor.document().to_html();
        assert_eq!(html.matches("data-mce-annotation-uid=\"old\"").count(), 1);
        assert_eq!(html.matches("data-mce-annotation-uid=\"u1\"").count(), 2);
    }

    #[test]
    fn test_nothing_wrappable() {
        let (editor, created) = wrap_all("<hr>");
        assert!(created.is_empty());
        assert_eq!(editor.document().to_html(), "<hr>");
    }

    #[test]
    fn test_partial_text_range() {
        let mut editor = Editor::from_html("<p>abc</p>").unwrap();
        let p = editor.document().children(editor.document().root())[0];
        let text = editor.document().children(p)[0];
        editor
            .set_selection(Range::new(Position::new(text, 0), Position::new(text, 3)))
            .unwrap();

        let decoration = Decoration::default();
        let marker = Marker {
            uid: "u1",
            name: "c",
            decoration: &decoration,
        };
        let range = *editor.selection();
        let created = wrap(&mut editor, &range, &ClassifierRules::default(), &marker).unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(
            editor.document().to_html(),
            format!("<p>{}abc</span></p>", WRAPPER)
        );
    }
}
