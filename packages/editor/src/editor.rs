//! # Editor Handle
//!
//! An editable document together with its selection, schema and history.
//!
//! ## Lifecycle
//!
//! ```text
//! HTML → Parse → Select → Transact → Serialize
//!          ↓        ↓         ↓           ↓
//!       Document  Range   UndoLevel   HTML (temp attrs stripped)
//! ```

use crate::cells::{self, SELECTED_CELL_ATTR};
use crate::selection::{validate, Range};
use crate::undo_stack::{Snapshot, UndoLevel, UndoStack};
use crate::EditorError;
use marginalia_dom::{parse_html, Document, NodeId, Schema};
use tracing::{debug, warn};

/// Editable document with selection and undo history
#[derive(Debug)]
pub struct Editor {
    document: Document,
    pub(crate) selection: Range,
    schema: Schema,
    undo: UndoStack,

    /// Attributes dropped from serialized output
    temp_attrs: Vec<String>,

    /// Current version number (increments on every committed change)
    version: u64,

    /// Nesting depth of the running transaction (0 = none)
    depth: usize,
}

impl Editor {
    /// Empty editor with the HTML5 schema
    pub fn new() -> Self {
        let document = Document::new();
        let selection = Range::caret(document.root(), 0);
        Self {
            document,
            selection,
            schema: Schema::html5(),
            undo: UndoStack::new(),
            temp_attrs: vec![SELECTED_CELL_ATTR.to_string()],
            version: 0,
            depth: 0,
        }
    }

    pub fn from_html(html: &str) -> Result<Self, EditorError> {
        let mut editor = Self::new();
        editor.set_content(html)?;
        Ok(editor)
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Replace the whole document; resets the selection and the history
    pub fn set_content(&mut self, html: &str) -> Result<(), EditorError> {
        self.document = parse_html(html)?;
        self.selection = Range::caret(self.document.root(), 0);
        self.undo.clear();
        self.version += 1;
        debug!(version = self.version, "content replaced");
        Ok(())
    }

    /// Serialized document without temporary attributes
    pub fn get_content(&self) -> String {
        let mut copy = self.document.clone();
        self.strip_temp_attrs(&mut copy);
        copy.to_html()
    }

    /// Serialize a throwaway copy after `filter` has edited it
    pub fn get_content_with<E, F>(&self, filter: F) -> Result<String, E>
    where
        F: FnOnce(&mut Document) -> Result<(), E>,
    {
        let mut copy = self.document.clone();
        filter(&mut copy)?;
        self.strip_temp_attrs(&mut copy);
        Ok(copy.to_html())
    }

    fn strip_temp_attrs(&self, doc: &mut Document) {
        for id in doc.descendants(doc.root()) {
            for attr in &self.temp_attrs {
                if doc.has_attr(id, attr) {
                    // Elements only carry attributes, so this cannot fail
                    let _ = doc.remove_attr(id, attr);
                }
            }
        }
    }

    /// Register an attribute that exists only while editing
    pub fn add_temp_attr(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.temp_attrs.contains(&name) {
            self.temp_attrs.push(name);
        }
    }

    pub fn temp_attrs(&self) -> &[String] {
        &self.temp_attrs
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// Mutable document alongside the schema that governs it
    pub fn document_and_schema(&mut self) -> (&mut Document, &Schema) {
        (&mut self.document, &self.schema)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    pub fn selection(&self) -> &Range {
        &self.selection
    }

    pub fn set_selection(&mut self, range: Range) -> Result<(), EditorError> {
        validate(&self.document, &range)?;
        self.selection = range;
        Ok(())
    }

    pub fn select_node(&mut self, node: NodeId) -> Result<(), EditorError> {
        let range = Range::select_node(&self.document, node)?;
        self.set_selection(range)
    }

    pub fn select_node_contents(&mut self, node: NodeId) -> Result<(), EditorError> {
        let range = Range::select_node_contents(&self.document, node);
        self.set_selection(range)
    }

    pub fn select_all(&mut self) {
        self.selection = Range::select_node_contents(&self.document, self.document.root());
    }

    pub fn selected_cells(&self) -> Vec<NodeId> {
        cells::selected_cells(&self.document)
    }

    pub fn select_cells(&mut self, cells: &[NodeId]) -> Result<(), EditorError> {
        cells::select_cells(&mut self.document, cells)
    }

    pub fn clear_cell_selection(&mut self) -> Result<(), EditorError> {
        cells::clear(&mut self.document)
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = snapshot.selection;
    }

    /// Whether a transaction is running
    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    /// Run `f` as one undoable step.
    ///
    /// Nested calls fold into the outermost transaction. When the outermost
    /// `f` fails the document and selection are put back as they were.
    pub fn transact<T, E, F>(&mut self, description: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Editor) -> Result<T, E>,
        E: std::fmt::Display,
    {
        if self.depth > 0 {
            self.depth += 1;
            let result = f(self);
            self.depth -= 1;
            return result;
        }

        let before = self.snapshot();
        let before_html = before.document.to_html();

        self.depth = 1;
        let result = f(self);
        self.depth = 0;

        match result {
            Ok(value) => {
                if self.document.to_html() != before_html {
                    let level = UndoLevel::new(before, self.snapshot()).with_description(description);
                    self.undo.push(level);
                    self.version += 1;
                    debug!(description, version = self.version, "transaction committed");
                } else {
                    debug!(description, "transaction made no changes");
                }
                Ok(value)
            }
            Err(err) => {
                warn!(description, error = %err, "transaction rolled back");
                self.restore(before);
                Err(err)
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
