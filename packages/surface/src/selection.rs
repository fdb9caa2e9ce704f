//! # Selection Codec
//!
//! Saves the live selection as char offsets into the text of one region and
//! puts it back after the region's children were replaced.
//!
//! ```text
//!  <p>He<i>llo</i> world</p>      "Hello world"
//!        ^        ^                 [2, 7]  → "llo w"
//! ```

use crate::dom::{Dom, DomKey, DomPoint, DomRange};
use crate::error::SurfaceError;
use strata_editor::SerializedSelection;

/// Offsets of the current selection inside `root`.
///
/// `None` without a selection or when its anchor lies outside `root`. An
/// end outside `root` is clamped to the end of its text.
pub fn save(dom: &Dom, root: DomKey) -> Option<SerializedSelection> {
    let range = dom.selection()?;
    let start = dom.point_offset(root, range.start)?;
    let end = dom
        .point_offset(root, range.end)
        .unwrap_or_else(|| dom.text_len(root));
    let (start, end) = if start <= end { (start, end) } else { (end, start) };

    Some(SerializedSelection::range(start, end))
}

/// Select `saved` inside `root`.
///
/// On failure the selection is left as it was.
pub fn restore(dom: &mut Dom, root: DomKey, saved: &SerializedSelection) -> Result<(), SurfaceError> {
    let start = locate(dom, root, saved.start)?;
    let end = if saved.collapsed {
        start
    } else {
        locate(dom, root, saved.end)?
    };
    dom.set_selection(DomRange::new(start, end))
}

/// Text node covering `offset`, with the local offset inside it.
fn locate(dom: &Dom, root: DomKey, offset: usize) -> Result<DomPoint, SurfaceError> {
    let mut running = 0;
    for key in dom.text_nodes(root) {
        let len = dom.text(key).map(|t| t.chars().count()).unwrap_or(0);
        if offset <= running + len {
            return Ok(DomPoint::new(key, offset - running));
        }
        running += len;
    }
    Err(SurfaceError::SelectionOutOfRange {
        offset,
        len: running,
    })
}
