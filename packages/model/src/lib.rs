//! # Strata Model
//!
//! Typed document tree shared by the editor, the surface and the exporters.
//! Pure data: nothing here mutates a tree that is already part of a snapshot.

pub mod attributes;
pub mod error;
pub mod node;
pub mod tree;
pub mod visitor;

pub use attributes::{Attributes, Layout, ListType};
pub use error::ModelError;
pub use node::{
    BlockKind, ContainerNode, InlineRun, LeafBody, Line, Node, NodeRef, TextNode, CONTAINER_TYPE,
};
pub use tree::{ensure_unique_ids, Position};
pub use visitor::{walk_container, walk_node, IdCollector, NodeStats, Visitor};

/// Id of the root container in [`default_document`].
pub const DEFAULT_ROOT_ID: &str = "root";

/// Empty document: a root container holding one empty paragraph.
pub fn default_document() -> ContainerNode {
    ContainerNode::new(DEFAULT_ROOT_ID).with_child(TextNode::paragraph("block-1", ""))
}
