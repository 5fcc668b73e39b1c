//! Stripping annotation markers from elements.

use crate::config::ClassifierRules;
use crate::identification::find_all;
use crate::markings::{
    remove_direct_annotation, DATA_ANNOTATION_ATTRIBUTES, DATA_ANNOTATION_CLASSES,
};
use marginalia_dom::{Document, DomResult, NodeId};
use tracing::trace;

/// Whether `elem` was annotated in place rather than created as a wrapper
fn is_direct(doc: &Document, rules: &ClassifierRules, elem: NodeId) -> bool {
    doc.tag_name(elem) != Some(rules.wrapper_tag.as_str())
        || doc.has_attr(elem, DATA_ANNOTATION_CLASSES)
        || doc.has_attr(elem, DATA_ANNOTATION_ATTRIBUTES)
        || rules.direct_blocks.iter().any(|s| s.matches(doc, elem))
}

/// Remove the markers from `elements`.
///
/// Every element loses the marker and the decoration recorded on it.
/// Decorator output on wrappers is not recorded, so it stays unless the
/// wrapper is unwrapped. Only wrappers are unwrapped when `unwrap` is set.
pub fn remove_annotations(
    doc: &mut Document,
    elements: &[NodeId],
    rules: &ClassifierRules,
    unwrap: bool,
) -> DomResult<()> {
    for &elem in elements {
        if !doc.is_attached(elem) {
            continue;
        }
        let direct = is_direct(doc, rules, elem);
        remove_direct_annotation(doc, elem)?;
        if unwrap && !direct {
            doc.unwrap(elem)?;
            trace!(node = %elem, "unwrapped annotation");
        } else {
            trace!(node = %elem, direct, "stripped annotation marker");
        }
    }
    Ok(())
}

/// Remove every annotation named `name`; returns how many uids were removed
pub fn remove_named(
    doc: &mut Document,
    name: &str,
    rules: &ClassifierRules,
    unwrap: bool,
) -> DomResult<usize> {
    let all = find_all(doc, name);
    for elements in all.values() {
        remove_annotations(doc, elements, rules, unwrap)?;
    }
    Ok(all.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotatorConfig;
    use marginalia_dom::parse_html;

    const HTML: &str = concat!(
        r#"<p><span class="mce-annotation" data-mce-annotation-uid="u" data-mce-annotation="c">a</span></p>"#,
        r#"<pre class="language-js mce-annotation" contenteditable="false" data-mce-annotation-uid="u" data-mce-annotation="c">x</pre>"#,
    );

    fn markers(doc: &Document) -> Vec<NodeId> {
        let p = doc.children(doc.root())[0];
        vec![doc.children(p)[0], doc.children(doc.root())[1]]
    }

    #[test]
    fn test_wrappers_are_left_in_place() {
        let mut doc = parse_html(HTML).unwrap();
        let elements = markers(&doc);
        remove_annotations(&mut doc, &elements, &ClassifierRules::default(), false).unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<p><span>a</span></p><pre class="language-js" contenteditable="false">x</pre>"#
        );
    }

    #[test]
    fn test_unwrap_on_remove() {
        let mut doc = parse_html(HTML).unwrap();
        let elements = markers(&doc);
        remove_annotations(&mut doc, &elements, &ClassifierRules::default(), true).unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<p>a</p><pre class="language-js" contenteditable="false">x</pre>"#
        );
    }

    #[test]
    fn test_second_removal_is_a_no_op() {
        let mut doc = parse_html(HTML).unwrap();
        let elements = markers(&doc);
        remove_annotations(&mut doc, &elements, &ClassifierRules::default(), false).unwrap();
        let once = doc.to_html();
        remove_annotations(&mut doc, &elements, &ClassifierRules::default(), false).unwrap();
        assert_eq!(doc.to_html(), once);
    }

    #[test]
    fn test_remove_named_leaves_other_names() {
        let mut doc = parse_html(concat!(
            r#"<p><span class="mce-annotation" data-mce-annotation-uid="u" data-mce-annotation="c">a</span>"#,
            r#"<span class="mce-annotation" data-mce-annotation-uid="v" data-mce-annotation="c">b</span>"#,
            r#"<span class="mce-annotation" data-mce-annotation-uid="w" data-mce-annotation="r">c</span></p>"#,
        ))
        .unwrap();

        assert_eq!(remove_named(&mut doc, "c", &ClassifierRules::default(), true).unwrap(), 2);
        assert_eq!(
            doc.to_html(),
            r#"<p>ab<span class="mce-annotation" data-mce-annotation-uid="w" data-mce-annotation="r">c</span></p>"#
        );
        assert_eq!(remove_named(&mut doc, "c", &ClassifierRules::default(), true).unwrap(), 0);
    }

    #[test]
    fn test_span_direct_block_keeps_its_own_markup() {
        let rules = AnnotatorConfig {
            direct_blocks: vec!["span.mce-preview-object".to_string()],
            ..Default::default()
        }
        .rules()
        .unwrap();
        let annotated = concat!(
            r#"<p><span class="mce-preview-object mce-annotation c1" contenteditable="false" "#,
            r#"data-mce-annotation-uid="u" data-mce-annotation="c" data-by="x" "#,
            r#"data-mce-annotation-classes="c1" data-mce-annotation-attrs="data-by">v</span></p>"#,
        );

        for unwrap in [false, true] {
            let mut doc = parse_html(annotated).unwrap();
            let p = doc.children(doc.root())[0];
            let elements = vec![doc.children(p)[0]];
            remove_annotations(&mut doc, &elements, &rules, unwrap).unwrap();
            assert_eq!(
                doc.to_html(),
                r#"<p><span class="mce-preview-object" contenteditable="false">v</span></p>"#
            );
        }
    }
}
