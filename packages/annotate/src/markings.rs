//! # Markings
//!
//! The attribute and class contract carried by annotated elements. These
//! names are persisted in saved documents and must not change.
//!
//! ## Design
//!
//! - Every marker carries the base class, the uid and the name
//! - Direct markers also record the decorator's class and attribute names so
//!   that removal strips exactly what was added and nothing the element had
//!   before
//! - Bookkeeping lists are comma-joined without escaping

use crate::decorator::Decoration;
use marginalia_dom::{Document, DomResult, NodeId};

/// Base class on every annotation marker
pub const ANNOTATION_CLASS: &str = "mce-annotation";
/// Annotation name
pub const DATA_ANNOTATION: &str = "data-mce-annotation";
/// Identity shared by every element created in one annotate call
pub const DATA_ANNOTATION_ID: &str = "data-mce-annotation-uid";
/// Set to `"true"` while the selection is inside the annotation
pub const DATA_ANNOTATION_ACTIVE: &str = "data-mce-annotation-active";
/// Decorator classes recorded on direct markers
pub const DATA_ANNOTATION_CLASSES: &str = "data-mce-annotation-classes";
/// Decorator attribute names recorded on direct markers
pub const DATA_ANNOTATION_ATTRIBUTES: &str = "data-mce-annotation-attrs";

/// Identity of one annotate call as written onto elements
#[derive(Debug, Clone, PartialEq)]
pub struct Marker<'a> {
    pub uid: &'a str,
    pub name: &'a str,
    pub decoration: &'a Decoration,
}

/// Whether `id` carries an annotation uid
pub fn is_annotation(doc: &Document, id: NodeId) -> bool {
    doc.has_attr(id, DATA_ANNOTATION_ID)
}

pub fn uid_of(doc: &Document, id: NodeId) -> Option<&str> {
    doc.attr(id, DATA_ANNOTATION_ID)
}

pub fn name_of(doc: &Document, id: NodeId) -> Option<&str> {
    doc.attr(id, DATA_ANNOTATION)
}

/// Write the marker onto `elem`; `direct` also records the bookkeeping lists
pub fn apply_annotation(
    doc: &mut Document,
    elem: NodeId,
    marker: &Marker<'_>,
    direct: bool,
) -> DomResult<()> {
    doc.add_class(elem, ANNOTATION_CLASS)?;
    doc.set_attr(elem, DATA_ANNOTATION_ID, marker.uid)?;
    doc.set_attr(elem, DATA_ANNOTATION, marker.name)?;

    let decoration = marker.decoration;
    for (name, value) in &decoration.attributes {
        doc.set_attr(elem, name.as_str(), value.as_str())?;
    }
    for class in &decoration.classes {
        doc.add_class(elem, class)?;
    }

    if direct {
        if !decoration.classes.is_empty() {
            doc.set_attr(elem, DATA_ANNOTATION_CLASSES, decoration.classes.join(","))?;
        }
        if !decoration.attributes.is_empty() {
            let names: Vec<&str> = decoration
                .attributes
                .iter()
                .map(|(name, _)| name.as_str())
                .collect();
            doc.set_attr(elem, DATA_ANNOTATION_ATTRIBUTES, names.join(","))?;
        }
    }
    Ok(())
}

fn bookkeeping(doc: &Document, elem: NodeId, attr: &str) -> Vec<String> {
    doc.attr(elem, attr)
        .map(|names| {
            names
                .split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Undo [`apply_annotation`] on a direct marker, leaving the element's own
/// attributes and classes alone
pub fn remove_direct_annotation(doc: &mut Document, elem: NodeId) -> DomResult<()> {
    strip_marker(doc, elem)?;

    let custom_attrs = bookkeeping(doc, elem, DATA_ANNOTATION_ATTRIBUTES);
    let custom_classes = bookkeeping(doc, elem, DATA_ANNOTATION_CLASSES);
    for name in &custom_attrs {
        doc.remove_attr(elem, name)?;
    }
    for class in &custom_classes {
        doc.remove_class(elem, class)?;
    }
    doc.remove_attr(elem, DATA_ANNOTATION_CLASSES)?;
    doc.remove_attr(elem, DATA_ANNOTATION_ATTRIBUTES)
}

/// Remove the base class, uid, name and active flag
pub fn strip_marker(doc: &mut Document, elem: NodeId) -> DomResult<()> {
    doc.remove_class(elem, ANNOTATION_CLASS)?;
    doc.remove_attr(elem, DATA_ANNOTATION_ID)?;
    doc.remove_attr(elem, DATA_ANNOTATION)?;
    doc.remove_attr(elem, DATA_ANNOTATION_ACTIVE)
}

pub fn set_active(doc: &mut Document, elem: NodeId, active: bool) -> DomResult<()> {
    if active {
        doc.set_attr(elem, DATA_ANNOTATION_ACTIVE, "true")
    } else {
        doc.remove_attr(elem, DATA_ANNOTATION_ACTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_dom::parse_html;

    fn decoration() -> Decoration {
        Decoration::default()
            .with_attribute("data-comment-author", "ana")
            .with_class("comment")
            .with_class("urgent")
    }

    #[test]
    fn test_wrapper_marker_has_no_bookkeeping() {
        let mut doc = parse_html("<span>x</span>").unwrap();
        let span = doc.children(doc.root())[0];
        let decoration = decoration();
        let marker = Marker {
            uid: "u1",
            name: "comment",
            decoration: &decoration,
        };

        apply_annotation(&mut doc, span, &marker, false).unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<span class="mce-annotation comment urgent" data-mce-annotation-uid="u1" data-mce-annotation="comment" data-comment-author="ana">x</span>"#
        );
    }

    #[test]
    fn test_direct_round_trip_keeps_existing_markup() {
        let original = r#"<figure class="image" data-x="1"><img src="a.png"></figure>"#;
        let mut doc = parse_html(original).unwrap();
        let figure = doc.children(doc.root())[0];
        let decoration = decoration();
        let marker = Marker {
            uid: "u1",
            name: "comment",
            decoration: &decoration,
        };

        apply_annotation(&mut doc, figure, &marker, true).unwrap();
        assert_eq!(
            doc.attr(figure, DATA_ANNOTATION_CLASSES),
            Some("comment,urgent")
        );
        assert_eq!(
            doc.attr(figure, DATA_ANNOTATION_ATTRIBUTES),
            Some("data-comment-author")
        );

        set_active(&mut doc, figure, true).unwrap();
        remove_direct_annotation(&mut doc, figure).unwrap();
        assert_eq!(doc.to_html(), original);
    }

    #[test]
    fn test_direct_without_decoration_skips_bookkeeping() {
        let mut doc = parse_html("<pre>code</pre>").unwrap();
        let pre = doc.children(doc.root())[0];
        let decoration = Decoration::default();
        let marker = Marker {
            uid: "u2",
            name: "review",
            decoration: &decoration,
        };

        apply_annotation(&mut doc, pre, &marker, true).unwrap();
        assert!(!doc.has_attr(pre, DATA_ANNOTATION_CLASSES));
        assert!(!doc.has_attr(pre, DATA_ANNOTATION_ATTRIBUTES));
        assert!(is_annotation(&doc, pre));
        assert_eq!(uid_of(&doc, pre), Some("u2"));
        assert_eq!(name_of(&doc, pre), Some("review"));

        remove_direct_annotation(&mut doc, pre).unwrap();
        assert_eq!(doc.to_html(), "<pre>code</pre>");
    }
}
