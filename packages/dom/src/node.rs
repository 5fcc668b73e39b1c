use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-width marker character used for caret placeholders and empty-block fillers.
pub const ZWSP: char = '\u{feff}';

/// Non-breaking space.
pub const NBSP: char = '\u{a0}';

/// Arena index of a node inside a [`crate::Document`].
///
/// Ids are never reused, so they stay valid across tree mutations and
/// across clones of the owning document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Document node payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// HTML element (tag names are stored lowercase)
    Element {
        tag: String,
        /// Attributes in insertion order, which is also serialization order
        attributes: Vec<(String, String)>,
    },

    /// Text node
    Text { content: String },

    /// Comment node
    Comment { content: String },
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Node::Text {
            content: content.into(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Node::Comment {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element {
            ref mut attributes, ..
        } = self
        {
            let key = key.into();
            let value = value.into();
            match attributes.iter_mut().find(|(name, _)| *name == key) {
                Some(slot) => slot.1 = value,
                None => attributes.push((key, value)),
            }
        }
        self
    }

    /// DOM-style node name: the tag for elements, `#text` / `#comment` otherwise
    pub fn name(&self) -> &str {
        match self {
            Node::Element { tag, .. } => tag,
            Node::Text { .. } => "#text",
            Node::Comment { .. } => "#comment",
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text { content } => Some(content),
            _ => None,
        }
    }
}

/// Convert a char offset into a byte index, clamping to the end of the string.
pub(crate) fn byte_index(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(index, _)| index)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_tags_are_lowercased() {
        let node = Node::element("SPAN");
        assert_eq!(node.name(), "span");
    }

    #[test]
    fn test_with_attr_replaces_existing_value() {
        let node = Node::element("img")
            .with_attr("src", "a.png")
            .with_attr("alt", "")
            .with_attr("src", "b.png");

        match node {
            Node::Element { attributes, .. } => {
                assert_eq!(
                    attributes,
                    vec![
                        ("src".to_string(), "b.png".to_string()),
                        ("alt".to_string(), String::new()),
                    ]
                );
            }
            _ => panic!("Expected element"),
        }
    }

    #[test]
    fn test_node_names() {
        assert_eq!(Node::text("a").name(), "#text");
        assert_eq!(Node::comment("a").name(), "#comment");
    }

    #[test]
    fn test_byte_index_handles_multibyte_text() {
        let s = "a\u{a0}b";
        assert_eq!(byte_index(s, 0), 0);
        assert_eq!(byte_index(s, 2), 3);
        assert_eq!(byte_index(s, 10), s.len());
    }
}
