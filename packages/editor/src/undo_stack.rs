//! # Undo/Redo Stack
//!
//! Tracks document history as whole-document snapshots.
//!
//! ## Design
//!
//! - Each level stores the state before and after one transaction
//! - Undo restores the `before` snapshot and moves the level to the redo stack
//! - Redo restores the `after` snapshot
//! - New levels clear the redo stack
//! - Node ids survive snapshots because documents never free arena slots

use crate::selection::Range;
use marginalia_dom::Document;

/// Document and selection captured at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Range,
}

/// One undoable step
#[derive(Debug, Clone)]
pub struct UndoLevel {
    pub before: Snapshot,
    pub after: Snapshot,

    /// Optional description of this step
    pub description: Option<String>,
}

impl UndoLevel {
    pub fn new(before: Snapshot, after: Snapshot) -> Self {
        Self {
            before,
            after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied levels (most recent last)
    undo_stack: Vec<UndoLevel>,

    /// Undone levels (most recent last)
    redo_stack: Vec<UndoLevel>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a completed step
    pub fn push(&mut self, level: UndoLevel) {
        self.undo_stack.push(level);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new step invalidates the undone future
        self.redo_stack.clear();
    }

    /// Step back; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<Snapshot> {
        let level = self.undo_stack.pop()?;
        let snapshot = level.before.clone();
        self.redo_stack.push(level);
        Some(snapshot)
    }

    /// Step forward again; returns the snapshot to restore
    pub fn redo(&mut self) -> Option<Snapshot> {
        let level = self.redo_stack.pop()?;
        let snapshot = level.after.clone();
        self.undo_stack.push(level);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Description of the next undo step
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|level| level.description.as_deref())
    }

    /// Description of the next redo step
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|level| level.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_dom::parse_html;

    fn snapshot(html: &str) -> Snapshot {
        let document = parse_html(html).unwrap();
        let selection = Range::caret(document.root(), 0);
        Snapshot {
            document,
            selection,
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo_return_snapshots() {
        let mut stack = UndoStack::new();
        stack.push(
            UndoLevel::new(snapshot("<p>a</p>"), snapshot("<p>b</p>")).with_description("Edit"),
        );
        assert_eq!(stack.undo_description(), Some("Edit"));

        let before = stack.undo().unwrap();
        assert_eq!(before.document.to_html(), "<p>a</p>");
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo_description(), Some("Edit"));

        let after = stack.redo().unwrap();
        assert_eq!(after.document.to_html(), "<p>b</p>");
        assert_eq!(stack.undo_levels(), 1);
        assert!(stack.redo().is_none());
    }

    #[test]
    fn test_new_level_clears_redo() {
        let mut stack = UndoStack::new();
        stack.push(UndoLevel::new(snapshot("a"), snapshot("b")));
        stack.undo();
        assert_eq!(stack.redo_levels(), 1);

        stack.push(UndoLevel::new(snapshot("a"), snapshot("c")));
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..3 {
            stack.push(UndoLevel::new(
                snapshot(&format!("{}", i)),
                snapshot(&format!("{}", i + 1)),
            ));
        }

        assert_eq!(stack.undo_levels(), 2);
        let oldest_kept = {
            stack.undo();
            stack.undo().unwrap()
        };
        assert_eq!(oldest_kept.document.to_html(), "1");
    }
}
