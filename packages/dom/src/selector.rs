//! Compound CSS selectors (`tag.class[attr op value]`), enough to express
//! element allow-lists such as `pre[class*=language-][contenteditable="false"]`.

use crate::document::Document;
use crate::error::{DomError, DomResult};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr*=value]`
    Contains,
    /// `[attr^=value]`
    StartsWith,
    /// `[attr~=value]`
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrMatcher {
    pub name: String,
    pub op: AttrOp,
    pub value: String,
}

impl AttrMatcher {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => actual.contains(&self.value),
            AttrOp::StartsWith => actual.starts_with(&self.value),
            AttrOp::Word => actual.split_whitespace().any(|w| w == self.value),
        }
    }
}

/// A single compound selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatcher>,
}

impl Selector {
    pub fn parse(source: &str) -> DomResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(DomError::invalid_selector(source, "empty selector"));
        }

        let mut selector = Selector {
            source: trimmed.to_string(),
            tag: None,
            classes: Vec::new(),
            attributes: Vec::new(),
        };

        let mut rest = trimmed;
        let tag_len = rest
            .find(|c: char| c == '.' || c == '[')
            .unwrap_or(rest.len());
        let tag = &rest[..tag_len];
        if !tag.is_empty() && tag != "*" {
            if !tag.chars().all(is_ident_char) {
                return Err(DomError::invalid_selector(source, "invalid tag name"));
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_len..];

        while let Some(first) = rest.chars().next() {
            match first {
                '.' => {
                    let end = rest[1..]
                        .find(|c: char| c == '.' || c == '[')
                        .map(|i| i + 1)
                        .unwrap_or(rest.len());
                    let class = &rest[1..end];
                    if class.is_empty() || !class.chars().all(is_ident_char) {
                        return Err(DomError::invalid_selector(source, "invalid class name"));
                    }
                    selector.classes.push(class.to_string());
                    rest = &rest[end..];
                }
                '[' => {
                    let end = find_closing_bracket(rest)
                        .ok_or_else(|| DomError::invalid_selector(source, "unclosed '['"))?;
                    selector.attributes.push(parse_attr(&rest[1..end], source)?);
                    rest = &rest[end + 1..];
                }
                _ => {
                    return Err(DomError::invalid_selector(
                        source,
                        format!("unexpected character '{}'", first),
                    ))
                }
            }
        }

        Ok(selector)
    }

    /// Selector matching elements whose `name` attribute equals `value` exactly
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        Selector {
            source: format!("[{}=\"{}\"]", name, value),
            tag: None,
            classes: Vec::new(),
            attributes: vec![AttrMatcher {
                name,
                op: AttrOp::Equals,
                value,
            }],
        }
    }

    /// Selector matching elements carrying `class`
    pub fn class(class: impl Into<String>) -> Self {
        let class = class.into();
        Selector {
            source: format!(".{}", class),
            tag: None,
            classes: vec![class],
            attributes: Vec::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag_name(id) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if !self.classes.iter().all(|c| doc.has_class(id, c)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|matcher| matcher.matches(doc.attr(id, &matcher.name)))
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn find_closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attr(inner: &str, source: &str) -> DomResult<AttrMatcher> {
    let ops = [
        ("*=", AttrOp::Contains),
        ("^=", AttrOp::StartsWith),
        ("~=", AttrOp::Word),
        ("=", AttrOp::Equals),
    ];

    for (token, op) in ops {
        if let Some(at) = inner.find(token) {
            let name = inner[..at].trim();
            let raw = inner[at + token.len()..].trim();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(raw);
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(DomError::invalid_selector(source, "invalid attribute name"));
            }
            return Ok(AttrMatcher {
                name: name.to_ascii_lowercase(),
                op,
                value: value.to_string(),
            });
        }
    }

    let name = inner.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(DomError::invalid_selector(source, "invalid attribute name"));
    }
    Ok(AttrMatcher {
        name: name.to_ascii_lowercase(),
        op: AttrOp::Exists,
        value: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    fn first_element(html: &str) -> (Document, NodeId) {
        let doc = parse_html(html).unwrap();
        let id = doc.children(doc.root())[0];
        (doc, id)
    }

    #[test]
    fn test_codesample_selector() {
        let selector = Selector::parse(r#"pre[class*=language-][contenteditable="false"]"#).unwrap();

        let (doc, pre) = first_element(r#"<pre class="language-markup" contenteditable="false">x</pre>"#);
        assert!(selector.matches(&doc, pre));

        let (doc, pre) = first_element(r#"<pre class="language-markup">x</pre>"#);
        assert!(!selector.matches(&doc, pre));

        let (doc, pre) = first_element(r#"<pre contenteditable="false">x</pre>"#);
        assert!(!selector.matches(&doc, pre));
    }

    #[test]
    fn test_tag_and_class() {
        let selector = Selector::parse("figure.image").unwrap();

        let (doc, figure) = first_element(r#"<figure class="image align-left"><img></figure>"#);
        assert!(selector.matches(&doc, figure));

        let (doc, div) = first_element(r#"<div class="image"></div>"#);
        assert!(!selector.matches(&doc, div));
    }

    #[test]
    fn test_attribute_presence() {
        let selector: Selector = "div[data-ephox-embed-iri]".parse().unwrap();
        let (doc, div) = first_element(r#"<div data-ephox-embed-iri="https://example.com"></div>"#);
        assert!(selector.matches(&doc, div));
        assert_eq!(selector.to_string(), "div[data-ephox-embed-iri]");
    }

    #[test]
    fn test_text_nodes_never_match() {
        let selector = Selector::parse("*").unwrap();
        let doc = parse_html("text").unwrap();
        let text = doc.children(doc.root())[0];
        assert!(!selector.matches(&doc, text));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[").is_err());
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse("div.").is_err());
    }

    #[test]
    fn test_programmatic_constructors() {
        let (doc, span) = first_element(r#"<span class="mce-annotation" data-mce-annotation="a&quot;b">x</span>"#);
        assert!(Selector::class("mce-annotation").matches(&doc, span));
        assert!(Selector::attribute_equals("data-mce-annotation", "a\"b").matches(&doc, span));
    }
}
