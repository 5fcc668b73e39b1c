//! # Marginalia Editor
//!
//! Editor-side services the annotation engine runs on top of.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dom: HTML text → arena Document             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + selection + history      │
//! │  - Ranges, cell selection, word expansion   │
//! │  - Range walking into sibling segments      │
//! │  - Bookmarks that survive tree edits        │
//! │  - Snapshot transactions with undo/redo     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ annotate: mark, unmark and track regions    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marginalia_editor::{bookmark, range_walk, Editor};
//!
//! let mut editor = Editor::from_html("<p>hello world</p>")?;
//! editor.select_all();
//!
//! editor.transact("Touch every segment", |editor| {
//!     bookmark::preserve(editor, false, |editor| {
//!         let range = *editor.selection();
//!         for segment in range_walk::walk(editor.document(), &range)? {
//!             // mutate editor.document_mut()
//!         }
//!         Ok::<_, EditorError>(())
//!     })
//! })?;
//! ```

pub mod bookmark;
pub mod cells;
mod editor;
mod errors;
pub mod expand;
pub mod range_walk;
pub mod selection;
mod undo_stack;

pub use editor::Editor;
pub use errors::EditorError;
pub use selection::{insert_node, max_offset, run_on_ranges, Position, Range};
pub use undo_stack::{Snapshot, UndoLevel, UndoStack};
