//! Multi-cell table selection, tracked with a temporary attribute on each
//! selected `td`/`th`.

use crate::EditorError;
use marginalia_dom::{Document, NodeId};

/// Attribute flagging a table cell as part of the selection
pub const SELECTED_CELL_ATTR: &str = "data-mce-selected";

fn is_cell(doc: &Document, id: NodeId) -> bool {
    matches!(doc.tag_name(id), Some("td" | "th"))
}

/// Selected cells in document order
pub fn selected_cells(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|id| is_cell(doc, *id) && doc.has_attr(*id, SELECTED_CELL_ATTR))
        .collect()
}

/// Replace the cell selection with `cells`; non-cells are rejected
pub fn select_cells(doc: &mut Document, cells: &[NodeId]) -> Result<(), EditorError> {
    if let Some(bad) = cells.iter().find(|id| !is_cell(doc, **id)) {
        return Err(EditorError::invalid_range(format!(
            "{} is not a table cell",
            bad
        )));
    }
    clear(doc)?;
    for cell in cells {
        doc.set_attr(*cell, SELECTED_CELL_ATTR, "1")?;
    }
    Ok(())
}

/// Drop the cell selection
pub fn clear(doc: &mut Document) -> Result<(), EditorError> {
    for cell in selected_cells(doc) {
        doc.remove_attr(cell, SELECTED_CELL_ATTR)?;
    }
    Ok(())
}
