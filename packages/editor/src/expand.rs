//! Word expansion for collapsed selections.

use crate::selection::{Position, Range};
use marginalia_dom::{Document, NBSP, ZWSP};

fn is_word_boundary(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n' || c == '\r' || c == NBSP || c == ZWSP
}

/// Grow a caret inside a text node to the word around it.
///
/// Anything other than a collapsed range in a text node is returned as is.
/// The result can still be collapsed, e.g. when the caret sits between two
/// spaces.
pub fn expand_word(doc: &Document, range: &Range) -> Range {
    if !range.collapsed() {
        return *range;
    }
    let container = range.start.container;
    let Some(text) = doc.text(container) else {
        return *range;
    };

    let chars: Vec<char> = text.chars().collect();
    let caret = range.start.offset.min(chars.len());

    let start = chars[..caret]
        .iter()
        .rposition(|c| is_word_boundary(*c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = chars[caret..]
        .iter()
        .position(|c| is_word_boundary(*c))
        .map(|i| caret + i)
        .unwrap_or(chars.len());

    Range::new(Position::new(container, start), Position::new(container, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_dom::parse_html;

    fn text_in_first_paragraph(html: &str) -> (Document, marginalia_dom::NodeId) {
        let doc = parse_html(html).unwrap();
        let p = doc.children(doc.root())[0];
        let text = doc.children(p)[0];
        (doc, text)
    }

    #[test]
    fn test_expands_to_word() {
        let (doc, text) = text_in_first_paragraph("<p>hello brave world</p>");
        let expanded = expand_word(&doc, &Range::caret(text, 8));

        assert_eq!(expanded.start.offset, 6);
        assert_eq!(expanded.end.offset, 11);
    }

    #[test]
    fn test_caret_at_word_edges() {
        let (doc, text) = text_in_first_paragraph("<p>hello world</p>");

        let at_start = expand_word(&doc, &Range::caret(text, 0));
        assert_eq!((at_start.start.offset, at_start.end.offset), (0, 5));

        let at_end = expand_word(&doc, &Range::caret(text, 11));
        assert_eq!((at_end.start.offset, at_end.end.offset), (6, 11));
    }

    #[test]
    fn test_nbsp_is_a_boundary() {
        let (doc, text) = text_in_first_paragraph("<p>one&nbsp;two</p>");
        let expanded = expand_word(&doc, &Range::caret(text, 5));
        assert_eq!((expanded.start.offset, expanded.end.offset), (4, 7));
    }

    #[test]
    fn test_between_spaces_stays_collapsed() {
        let (doc, text) = text_in_first_paragraph("<p>a  b</p>");
        assert!(expand_word(&doc, &Range::caret(text, 2)).collapsed());
    }

    #[test]
    fn test_element_caret_is_unchanged() {
        let doc = parse_html("<p>text</p>").unwrap();
        let p = doc.children(doc.root())[0];
        let range = Range::caret(p, 1);
        assert_eq!(expand_word(&doc, &range), range);
    }
}
