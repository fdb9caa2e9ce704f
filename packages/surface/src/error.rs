//! Error types for the surface

use crate::dom::DomKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Unknown DOM node: {0}")]
    UnknownKey(DomKey),

    #[error("Expected an element: {0}")]
    NotAnElement(DomKey),

    #[error("Expected a text node: {0}")]
    NotText(DomKey),

    #[error("Inserting {child} under {parent} would create a cycle")]
    Cycle { parent: DomKey, child: DomKey },

    #[error("Offset {offset} out of range for {key} (length {len})")]
    OffsetOutOfRange { key: DomKey, offset: usize, len: usize },

    #[error("No selection")]
    NoSelection,

    #[error("Selection offset {offset} has no covering text node (text length {len})")]
    SelectionOutOfRange { offset: usize, len: usize },

    #[error("Node is not mounted: {0}")]
    NotMounted(String),
}
