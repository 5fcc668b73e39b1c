//! Annotator configuration.
//!
//! Everything has a default, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "wrapperTag": "span",
//!   "directBlocks": ["figure.image", "div.mce-toc"],
//!   "wrapBlocks": ["img", "video", "audio"],
//!   "unwrapOnRemove": false,
//!   "uidPrefix": "mce-annotation",
//!   "validChildren": { "x-note": ["span", "#text"] }
//! }
//! ```

use crate::errors::{AnnotateError, AnnotateResult};
use crate::uid::DEFAULT_UID_PREFIX;
use marginalia_dom::{Schema, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elements annotated in place instead of being wrapped
pub const DEFAULT_DIRECT_BLOCKS: &[&str] = &[
    // Code samples
    r#"pre[class*=language-][contenteditable="false"]"#,
    // Captioned images
    "figure.image",
    // Embedded media
    "div[data-ephox-embed-iri]",
    // Page embeds
    "div.tiny-pageembed",
    // Table of contents
    "div.mce-toc",
];

/// Elements that always get a wrapper of their own
pub const DEFAULT_WRAP_BLOCKS: &[&str] = &["img", "video", "audio"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotatorConfig {
    /// Tag of the inline wrapper elements
    pub wrapper_tag: String,

    /// Selectors for elements annotated directly
    pub direct_blocks: Vec<String>,

    /// Selectors for elements wrapped on their own
    pub wrap_blocks: Vec<String>,

    /// Unwrap plain wrappers on removal instead of leaving bare elements
    pub unwrap_on_remove: bool,

    pub uid_prefix: String,

    /// Extra parent -> children schema entries
    pub valid_children: BTreeMap<String, Vec<String>>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            wrapper_tag: "span".to_string(),
            direct_blocks: DEFAULT_DIRECT_BLOCKS.iter().map(|s| s.to_string()).collect(),
            wrap_blocks: DEFAULT_WRAP_BLOCKS.iter().map(|s| s.to_string()).collect(),
            unwrap_on_remove: false,
            uid_prefix: DEFAULT_UID_PREFIX.to_string(),
            valid_children: BTreeMap::new(),
        }
    }
}

impl AnnotatorConfig {
    pub fn from_json(source: &str) -> AnnotateResult<Self> {
        serde_json::from_str(source).map_err(|e| AnnotateError::config(e.to_string()))
    }

    /// Validate and compile into classifier rules
    pub fn rules(&self) -> AnnotateResult<ClassifierRules> {
        let wrapper_tag = self.wrapper_tag.trim().to_ascii_lowercase();
        if wrapper_tag.is_empty()
            || !wrapper_tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(AnnotateError::config(format!(
                "invalid wrapper tag '{}'",
                self.wrapper_tag
            )));
        }
        if self.uid_prefix.is_empty() {
            return Err(AnnotateError::config("uid prefix must not be empty"));
        }

        Ok(ClassifierRules {
            wrapper_tag,
            direct_blocks: parse_selectors(&self.direct_blocks)?,
            wrap_blocks: parse_selectors(&self.wrap_blocks)?,
        })
    }

    /// Add the configured extra children to `schema`
    pub fn extend_schema(&self, schema: &mut Schema) {
        for (parent, children) in &self.valid_children {
            schema.add_valid_children(parent, children.iter().map(String::as_str));
        }
    }
}

fn parse_selectors(sources: &[String]) -> AnnotateResult<Vec<Selector>> {
    sources
        .iter()
        .map(|source| {
            Selector::parse(source).map_err(|e| AnnotateError::config(e.to_string()))
        })
        .collect()
}

/// Compiled allow-lists used by the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierRules {
    pub wrapper_tag: String,
    pub direct_blocks: Vec<Selector>,
    pub wrap_blocks: Vec<Selector>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            wrapper_tag: "span".to_string(),
            direct_blocks: DEFAULT_DIRECT_BLOCKS
                .iter()
                .filter_map(|s| Selector::parse(s).ok())
                .collect(),
            wrap_blocks: DEFAULT_WRAP_BLOCKS
                .iter()
                .filter_map(|s| Selector::parse(s).ok())
                .collect(),
        }
    }
}
