//! # Actions
//!
//! Closed set of intents the editor understands. Every change to a document
//! goes through one of these.
//!
//! ## Semantics
//!
//! ### Insert / Move
//! - Relative to a target node: before, after, or appended inside
//! - `inside` requires a container target
//! - Never produce a duplicate id; a move never lands inside its own subtree
//!
//! ### Update
//! - Shallow: listed fields replace, others are kept
//! - Writing a body (`content`, `children` or `lines`) clears the other two
//!
//! ### Delete
//! - Removes the node and all descendants; the root cannot be deleted
//!
//! ### Sugar
//! - Image, cover and block-type conveniences expand into the actions above
//!   before they are applied, so they share every check

use serde::{Deserialize, Serialize};
use strata_model::{Attributes, BlockKind, ContainerNode, InlineRun, LeafBody, Line, Node, Position};

/// Key on the root container holding the cover image URL.
pub const COVER_IMAGE_KEY: &str = "coverImage";

/// Key on the root container flagging a failed cover upload.
pub const COVER_ERROR_KEY: &str = "coverImageError";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    InsertNode {
        node: Node,
        target_id: String,
        position: Position,
    },

    UpdateNode {
        id: String,
        updates: NodeUpdate,
    },

    UpdateAttributes {
        id: String,
        attributes: Attributes,
        #[serde(default = "default_merge")]
        merge: bool,
    },

    DeleteNode {
        id: String,
    },

    MoveNode {
        id: String,
        target_id: String,
        position: Position,
    },

    /// Bulk replace; recorded even when nothing differs
    ReplaceContainer {
        container: ContainerNode,
    },

    SetBlockType {
        id: String,
        block_type: BlockKind,
    },

    /// Image placeholder shown while its upload is in flight
    InsertImage {
        id: String,
        target_id: String,
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },

    ImageUploaded {
        id: String,
        src: String,
    },

    ImageUploadFailed {
        id: String,
    },

    /// `None` removes the cover
    SetCoverImage {
        src: Option<String>,
    },

    CoverUploadFailed,

    SetActiveNode {
        id: Option<String>,
    },

    Undo,

    Redo,
}

fn default_merge() -> bool {
    true
}

impl Action {
    /// Debug name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::InsertNode { .. } => "INSERT_NODE",
            Action::UpdateNode { .. } => "UPDATE_NODE",
            Action::UpdateAttributes { .. } => "UPDATE_ATTRIBUTES",
            Action::DeleteNode { .. } => "DELETE_NODE",
            Action::MoveNode { .. } => "MOVE_NODE",
            Action::ReplaceContainer { .. } => "REPLACE_CONTAINER",
            Action::SetBlockType { .. } => "SET_BLOCK_TYPE",
            Action::InsertImage { .. } => "INSERT_IMAGE",
            Action::ImageUploaded { .. } => "IMAGE_UPLOADED",
            Action::ImageUploadFailed { .. } => "IMAGE_UPLOAD_FAILED",
            Action::SetCoverImage { .. } => "SET_COVER_IMAGE",
            Action::CoverUploadFailed => "COVER_UPLOAD_FAILED",
            Action::SetActiveNode { .. } => "SET_ACTIVE_NODE",
            Action::Undo => "UNDO",
            Action::Redo => "REDO",
        }
    }

    pub fn insert(node: impl Into<Node>, target_id: impl Into<String>, position: Position) -> Self {
        Action::InsertNode {
            node: node.into(),
            target_id: target_id.into(),
            position,
        }
    }

    pub fn update_content(id: impl Into<String>, content: impl Into<String>) -> Self {
        Action::UpdateNode {
            id: id.into(),
            updates: NodeUpdate::body(LeafBody::Content(content.into())),
        }
    }

    pub fn update_body(id: impl Into<String>, body: LeafBody) -> Self {
        Action::UpdateNode {
            id: id.into(),
            updates: NodeUpdate::body(body),
        }
    }

    pub fn merge_attributes(id: impl Into<String>, attributes: Attributes) -> Self {
        Action::UpdateAttributes {
            id: id.into(),
            attributes,
            merge: true,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Action::DeleteNode { id: id.into() }
    }

    pub fn move_to(id: impl Into<String>, target_id: impl Into<String>, position: Position) -> Self {
        Action::MoveNode {
            id: id.into(),
            target_id: target_id.into(),
            position,
        }
    }

    /// Rewrite convenience actions into the core action they stand for.
    ///
    /// Core actions come back unchanged. `root_id` addresses cover actions.
    pub fn expand(self, root_id: &str) -> Action {
        match self {
            Action::SetBlockType { id, block_type } => Action::UpdateNode {
                id,
                updates: NodeUpdate {
                    block_type: Some(block_type),
                    ..Default::default()
                },
            },
            Action::InsertImage {
                id,
                target_id,
                position,
                alt,
            } => {
                let mut attributes = Attributes::new().with_loading(true);
                attributes.alt = alt;
                Action::InsertNode {
                    node: Node::Leaf(
                        strata_model::TextNode::new(id, BlockKind::Image).with_attributes(attributes),
                    ),
                    target_id,
                    position,
                }
            }
            Action::ImageUploaded { id, src } => Action::merge_attributes(
                id,
                Attributes::new()
                    .with_src(src)
                    .with_loading(false)
                    .with_error(false),
            ),
            Action::ImageUploadFailed { id } => Action::merge_attributes(
                id,
                Attributes::new().with_loading(false).with_error(true),
            ),
            Action::SetCoverImage { src } => Action::merge_attributes(
                root_id,
                Attributes::new()
                    .with_extra(
                        COVER_IMAGE_KEY,
                        src.map(serde_json::Value::String)
                            .unwrap_or(serde_json::Value::Null),
                    )
                    .with_extra(COVER_ERROR_KEY, serde_json::Value::Null),
            ),
            Action::CoverUploadFailed => Action::merge_attributes(
                root_id,
                Attributes::new().with_extra(COVER_ERROR_KEY, serde_json::Value::Bool(true)),
            ),
            core => core,
        }
    }
}

/// Field changes carried by `UPDATE_NODE`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockKind>,

    /// Merged into the existing attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<InlineRun>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<Line>>,
}

impl NodeUpdate {
    pub fn body(body: LeafBody) -> Self {
        let mut update = NodeUpdate::default();
        match body {
            LeafBody::Content(text) => update.content = Some(text),
            LeafBody::Runs(runs) => update.children = Some(runs),
            LeafBody::Lines(lines) => update.lines = Some(lines),
        }
        update
    }

    /// Body to write, by the usual precedence.
    pub fn new_body(&self) -> Option<LeafBody> {
        if let Some(lines) = &self.lines {
            return Some(LeafBody::Lines(lines.clone()));
        }
        if let Some(runs) = &self.children {
            return Some(LeafBody::Runs(runs.clone()));
        }
        self.content.clone().map(LeafBody::Content)
    }

    pub fn touches_text(&self) -> bool {
        self.block_type.is_some()
            || self.content.is_some()
            || self.children.is_some()
            || self.lines.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_wire_format() {
        let action: Action = serde_json::from_value(json!({
            "type": "INSERT_NODE",
            "node": { "id": "p2", "type": "p", "content": "two" },
            "targetId": "p1",
            "position": "after"
        }))
        .unwrap();

        match &action {
            Action::InsertNode { node, target_id, position } => {
                assert_eq!(node.id(), "p2");
                assert_eq!(target_id, "p1");
                assert_eq!(*position, Position::After);
            }
            other => panic!("unexpected action {other:?}"),
        }

        let back: Action = serde_json::from_value(serde_json::to_value(&action).unwrap()).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_update_attributes_merges_by_default() {
        let action: Action = serde_json::from_value(json!({
            "type": "UPDATE_ATTRIBUTES",
            "id": "img1",
            "attributes": { "loading": true }
        }))
        .unwrap();
        assert!(matches!(action, Action::UpdateAttributes { merge: true, .. }));
    }

    #[test]
    fn test_unit_actions() {
        let undo: Action = serde_json::from_value(json!({ "type": "UNDO" })).unwrap();
        assert_eq!(undo, Action::Undo);
        assert_eq!(serde_json::to_value(Action::Redo).unwrap(), json!({ "type": "REDO" }));
    }

    #[test]
    fn test_upload_sugar_expands_to_attribute_updates() {
        let done = Action::ImageUploaded {
            id: "img1".into(),
            src: "https://x/y.png".into(),
        }
        .expand("root");

        match done {
            Action::UpdateAttributes { id, attributes, merge } => {
                assert_eq!(id, "img1");
                assert!(merge);
                assert_eq!(attributes.src.as_deref(), Some("https://x/y.png"));
                assert_eq!(attributes.loading, Some(false));
                assert_eq!(attributes.error, Some(false));
            }
            other => panic!("unexpected expansion {other:?}"),
        }

        let cover = Action::CoverUploadFailed.expand("doc");
        assert!(matches!(cover, Action::UpdateAttributes { ref id, .. } if id == "doc"));
    }

    #[test]
    fn test_node_update_body_precedence() {
        let update = NodeUpdate {
            content: Some("plain".into()),
            children: Some(vec![InlineRun::plain("runs")]),
            ..Default::default()
        };
        assert_eq!(update.new_body(), Some(LeafBody::Runs(vec![InlineRun::plain("runs")])));
        assert!(NodeUpdate::default().new_body().is_none());
    }
}
