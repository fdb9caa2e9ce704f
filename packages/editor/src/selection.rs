//! Selection as reported by the surface.
//!
//! Offsets are character offsets into the concatenated text of one editable
//! region, counted over its text nodes in document order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSelection {
    pub start: usize,
    pub end: usize,
    pub collapsed: bool,
}

impl SerializedSelection {
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
            collapsed: true,
        }
    }

    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            collapsed: start == end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Selection inside a particular leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDescription {
    pub node_id: String,
    pub selection: SerializedSelection,
}
