//! Validity schema: which node names may appear as children of which elements.
//!
//! Children are named the way [`crate::Document::node_name`] names them, so
//! text is `#text` and comments are `#comment`.

use std::collections::{HashMap, HashSet};

const PHRASING: &[&str] = &[
    "#text", "#comment", "a", "abbr", "audio", "b", "bdi", "bdo", "br", "button", "canvas",
    "cite", "code", "data", "del", "dfn", "em", "embed", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "mark", "math", "object", "picture", "q", "s", "samp", "select", "small",
    "span", "strong", "sub", "sup", "svg", "textarea", "time", "u", "var", "video", "wbr",
];

const FLOW_ONLY: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dl", "div", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol",
    "p", "pre", "section", "table", "ul",
];

const PHRASING_PARENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "dt", "summary", "legend", "a", "abbr", "b",
    "bdi", "bdo", "button", "cite", "code", "data", "del", "dfn", "em", "i", "ins", "kbd",
    "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var",
];

const FLOW_PARENTS: &[&str] = &[
    "body", "div", "li", "dd", "blockquote", "figcaption", "td", "th", "caption", "section",
    "article", "aside", "header", "footer", "nav", "main", "address", "form",
];

/// Parent -> allowed child names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    children: HashMap<String, HashSet<String>>,
}

impl Schema {
    /// Schema with no rules; every child check fails until rules are added
    pub fn empty() -> Self {
        Self {
            children: HashMap::new(),
        }
    }

    /// The HTML5 content model, simplified to phrasing vs flow content
    pub fn html5() -> Self {
        let mut schema = Self::empty();
        let flow: Vec<&str> = PHRASING.iter().chain(FLOW_ONLY).copied().collect();

        for parent in PHRASING_PARENTS {
            schema.add_valid_children(parent, PHRASING.iter().copied());
        }
        for parent in FLOW_PARENTS {
            schema.add_valid_children(parent, flow.iter().copied());
        }

        schema.add_valid_children("figure", flow.iter().copied().chain(["figcaption"]));
        schema.add_valid_children("details", flow.iter().copied().chain(["summary"]));
        schema.add_valid_children("fieldset", flow.iter().copied().chain(["legend"]));
        schema.add_valid_children("ul", ["li", "#comment"]);
        schema.add_valid_children("ol", ["li", "#comment"]);
        schema.add_valid_children("dl", ["dt", "dd", "#comment"]);
        schema.add_valid_children(
            "table",
            ["caption", "colgroup", "thead", "tbody", "tfoot", "tr", "#comment"],
        );
        schema.add_valid_children("colgroup", ["col"]);
        for section in ["thead", "tbody", "tfoot"] {
            schema.add_valid_children(section, ["tr", "#comment"]);
        }
        schema.add_valid_children("tr", ["td", "th", "#comment"]);
        schema.add_valid_children("audio", ["source", "track", "#text"]);
        schema.add_valid_children("video", ["source", "track", "#text"]);
        schema.add_valid_children("picture", ["source", "img"]);
        schema.add_valid_children("select", ["option", "optgroup"]);
        schema.add_valid_children("optgroup", ["option"]);
        schema.add_valid_children("option", ["#text"]);
        schema.add_valid_children("textarea", ["#text"]);

        schema
    }

    /// Allow additional children under `parent`
    pub fn add_valid_children<'a, I>(&mut self, parent: &str, children: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entry = self
            .children
            .entry(parent.to_ascii_lowercase())
            .or_default();
        entry.extend(children.into_iter().map(|c| c.to_ascii_lowercase()));
    }

    /// Whether `child` may appear directly inside `parent`
    pub fn is_valid_child(&self, parent: &str, child: &str) -> bool {
        self.children
            .get(&parent.to_ascii_lowercase())
            .is_some_and(|allowed| allowed.contains(&child.to_ascii_lowercase()))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::html5()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_wrapper_rules() {
        let schema = Schema::html5();

        assert!(schema.is_valid_child("span", "#text"));
        assert!(schema.is_valid_child("span", "img"));
        assert!(schema.is_valid_child("p", "span"));
        assert!(schema.is_valid_child("td", "span"));
        assert!(!schema.is_valid_child("span", "p"));
        assert!(!schema.is_valid_child("span", "hr"));
        assert!(!schema.is_valid_child("span", "table"));
        assert!(!schema.is_valid_child("ul", "span"));
        assert!(!schema.is_valid_child("tr", "span"));
    }

    #[test]
    fn test_void_and_unknown_parents_have_no_children() {
        let schema = Schema::html5();

        assert!(!schema.is_valid_child("hr", "span"));
        assert!(!schema.is_valid_child("img", "#text"));
        assert!(!schema.is_valid_child("x-widget", "span"));
    }

    #[test]
    fn test_custom_children() {
        let mut schema = Schema::html5();
        schema.add_valid_children("X-Widget", ["SPAN"]);

        assert!(schema.is_valid_child("x-widget", "span"));
        assert!(!Schema::empty().is_valid_child("p", "#text"));
    }
}
