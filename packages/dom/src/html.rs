//! HTML codec: markup -> [`Document`] and back.
//!
//! The serializer is byte-stable: attributes come out in stored order and
//! nothing is normalized, so parse -> serialize round trips of well-formed
//! markup reproduce the input.

use crate::document::Document;
use crate::error::{DomError, DomResult};
use crate::node::{Node, NodeId, NBSP};
use crate::tokenizer::{tokenize, Token};
use tracing::debug;

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse a fragment of markup into a new document (content goes in `body`)
pub fn parse_html(source: &str) -> DomResult<Document> {
    let mut doc = Document::new();
    let root = doc.root();
    parse_into(&mut doc, root, source)?;
    Ok(doc)
}

/// Parse markup and append the resulting nodes to `parent`
pub fn parse_into(doc: &mut Document, parent: NodeId, source: &str) -> DomResult<()> {
    let mut stack: Vec<NodeId> = vec![parent];

    for (token, span) in tokenize(source) {
        let current = *stack.last().unwrap_or(&parent);
        match token {
            Token::Text(text) => {
                let id = doc.create_text(decode_entities(text));
                doc.append_child(current, id)?;
            }
            Token::Comment(raw) => {
                let inner = &raw[4..raw.len() - 3];
                let id = doc.create_comment(inner);
                doc.append_child(current, id)?;
            }
            Token::Doctype(_) => {}
            Token::StartTag(raw) => {
                let (tag, attributes, self_closing) = parse_start_tag(raw, span.start)?;
                let id = doc.create_element(&tag);
                for (name, value) in attributes {
                    doc.set_attr(id, name, value)?;
                }
                doc.append_child(current, id)?;
                if !self_closing && !is_void(&tag) {
                    stack.push(id);
                }
            }
            Token::UnterminatedTag(raw) => {
                let name = raw[..raw.len() - 1]
                    .trim_end()
                    .trim_end_matches('=')
                    .split_whitespace()
                    .last()
                    .unwrap_or_default();
                return Err(DomError::markup(
                    span.end - 1,
                    format!("unterminated value for attribute '{}'", name),
                ));
            }
            Token::EndTag(raw) => {
                let tag = raw[2..raw.len() - 1].trim().to_ascii_lowercase();
                // Close up to the nearest matching element; stray end tags are dropped.
                if let Some(pos) = stack
                    .iter()
                    .skip(1)
                    .rposition(|open| doc.tag_name(*open) == Some(tag.as_str()))
                {
                    stack.truncate(pos + 1);
                } else {
                    debug!(tag = %tag, pos = span.start, "Ignoring unmatched end tag");
                }
            }
        }
    }

    Ok(())
}

type StartTag = (String, Vec<(String, String)>, bool);

fn parse_start_tag(raw: &str, pos: usize) -> DomResult<StartTag> {
    let body = &raw[1..raw.len() - 1];
    let (body, self_closing) = match body.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (body, false),
    };

    let mut chars = body.char_indices().peekable();
    let mut tag = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        tag.push(c);
        chars.next();
    }

    let mut attributes = Vec::new();
    loop {
        while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            chars.next();
        }
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            name.push(c);
            chars.next();
        }
        while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek().is_some_and(|(_, c)| *c == '=') {
            chars.next();
            while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().map(|(_, c)| *c) {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            closed = true;
                            break;
                        }
                        value.push(c);
                    }
                    if !closed {
                        return Err(DomError::markup(
                            pos + 1 + start,
                            format!("unterminated value for attribute '{}'", name),
                        ));
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if name.is_empty() {
            return Err(DomError::markup(pos + 1 + start, "empty attribute name"));
        }
        attributes.push((name.to_ascii_lowercase(), decode_entities(&value)));
    }

    Ok((tag.to_ascii_lowercase(), attributes, self_closing))
}

/// Decode the handful of named references editors emit plus numeric ones
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(NBSP),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            NBSP => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.node(id) {
        Some(Node::Text { content }) => escape_text(content, out),
        Some(Node::Comment { content }) => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
        Some(Node::Element { tag, attributes }) => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        None => {}
    }
}

impl Document {
    /// Serialized content of the root element
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            write_node(self, *child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        write_node(self, id, &mut out);
        out
    }

    /// Replace the children of `id` with parsed markup
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> DomResult<()> {
        for child in self.children(id).to_vec() {
            self.detach(child)?;
        }
        parse_into(self, id, html)
    }
}
