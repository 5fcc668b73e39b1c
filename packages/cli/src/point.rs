//! `PATH:OFFSET` selection points, e.g. `0.2:5` is offset 5 in the third
//! child of the first child of the body.

use anyhow::{anyhow, Result};
use marginalia_dom::Document;
use marginalia_editor::Position;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Point {
    /// Resolve against `doc`; the offset is checked when the selection is set
    pub fn resolve(&self, doc: &Document) -> Result<Position> {
        let mut node = doc.root();
        for (depth, index) in self.path.iter().enumerate() {
            node = doc.child(node, *index).ok_or_else(|| {
                anyhow!(
                    "No child {} at depth {} of point {}",
                    index,
                    depth,
                    self
                )
            })?;
        }
        Ok(Position::new(node, self.offset))
    }
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, offset) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected PATH:OFFSET, got '{}'", s))?;
        let offset = offset
            .parse()
            .map_err(|_| format!("invalid offset '{}'", offset))?;
        let path = if path.is_empty() {
            Vec::new()
        } else {
            path.split('.')
                .map(|part| {
                    part.parse()
                        .map_err(|_| format!("invalid path segment '{}'", part))
                })
                .collect::<Result<Vec<usize>, String>>()?
        };
        Ok(Self { path, offset })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(|i| i.to_string()).collect();
        write!(f, "{}:{}", path.join("."), self.offset)
    }
}
