//! # Marginalia DOM
//!
//! The document model the annotation engine edits: an arena tree with
//! DOM-like primitives, an HTML codec, compound selector matching and an
//! element validity schema.

pub mod document;
pub mod error;
pub mod html;
pub mod node;
pub mod schema;
pub mod selector;
pub mod tokenizer;

pub use document::{Ancestors, Document};
pub use error::{DomError, DomResult};
pub use html::{decode_entities, is_void, parse_html, parse_into};
pub use node::{Node, NodeId, NBSP, ZWSP};
pub use schema::Schema;
pub use selector::{AttrMatcher, AttrOp, Selector};
