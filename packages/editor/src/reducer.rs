//! # Reducer
//!
//! `reduce(state, action)` is a pure function: it reads nothing but its
//! arguments and returns either the next state or the reason the action was
//! ignored. The input state is never modified.
//!
//! Structural actions are validated in full before anything is written, and
//! the write happens on a shallow copy of the active snapshot, so a rejected
//! action cannot leave a half-applied tree behind.

use crate::actions::{Action, NodeUpdate};
use crate::errors::ActionError;
use crate::history::EditorState;
use std::collections::HashSet;
use std::sync::Arc;
use strata_model::{ensure_unique_ids, Attributes, ContainerNode, ModelError, Node, Position};

pub type ReduceResult = Result<EditorState, ActionError>;

/// Apply `action` to `state`.
pub fn reduce(state: &EditorState, action: &Action) -> ReduceResult {
    match action {
        Action::Undo => {
            if !state.can_undo() {
                return Err(ActionError::HistoryBoundary("undo"));
            }
            Ok(state.with_index(state.history_index() - 1))
        }
        Action::Redo => {
            if !state.can_redo() {
                return Err(ActionError::HistoryBoundary("redo"));
            }
            Ok(state.with_index(state.history_index() + 1))
        }
        Action::SetActiveNode { id } => {
            if state.active_node_id() == id.as_deref() {
                return Err(ActionError::Unchanged);
            }
            Ok(state.with_active_node(id.clone()))
        }
        Action::ReplaceContainer { container } => {
            if let Err(ModelError::DuplicateId(id)) = ensure_unique_ids(container) {
                return Err(ActionError::DuplicateId(id));
            }
            Ok(state.commit(Arc::new(container.clone())))
        }
        other => {
            let current = state.current();
            let expanded = other.clone().expand(&current.id);
            let next = apply(current, &expanded)?;
            Ok(state.commit(Arc::new(next)))
        }
    }
}

/// Apply one core structural action to a snapshot, returning the new root.
pub fn apply(root: &ContainerNode, action: &Action) -> Result<ContainerNode, ActionError> {
    match action {
        Action::InsertNode {
            node,
            target_id,
            position,
        } => apply_insert(root, node, target_id, *position),
        Action::UpdateNode { id, updates } => apply_update_node(root, id, updates),
        Action::UpdateAttributes {
            id,
            attributes,
            merge,
        } => apply_update_attributes(root, id, attributes, *merge),
        Action::DeleteNode { id } => apply_delete(root, id),
        Action::MoveNode {
            id,
            target_id,
            position,
        } => apply_move(root, id, target_id, *position),
        Action::ReplaceContainer { container } => Ok(container.clone()),
        other => Err(ActionError::InvalidTarget(format!(
            "{} is not a structural action",
            other.name()
        ))),
    }
}

fn apply_insert(
    root: &ContainerNode,
    node: &Node,
    target_id: &str,
    position: Position,
) -> Result<ContainerNode, ActionError> {
    let target_path = root
        .path_to(target_id)
        .ok_or_else(|| ActionError::NotFound(target_id.to_string()))?;

    validate_new_ids(root, node)?;
    validate_placement(root, &target_path, target_id, position)?;

    let mut next = root.clone();
    place(&mut next, &target_path, position, Arc::new(node.clone()))?;
    Ok(next)
}

fn apply_delete(root: &ContainerNode, id: &str) -> Result<ContainerNode, ActionError> {
    let path = root
        .path_to(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    let (&ix, parent_path) = path
        .split_last()
        .ok_or_else(|| ActionError::InvalidTarget("the root container cannot be deleted".into()))?;

    let mut next = root.clone();
    let parent = next
        .container_at_mut(parent_path)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    parent.children.remove(ix);
    Ok(next)
}

fn apply_move(
    root: &ContainerNode,
    id: &str,
    target_id: &str,
    position: Position,
) -> Result<ContainerNode, ActionError> {
    // validate both ends before touching anything
    let source_path = root
        .path_to(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    let target_path = root
        .path_to(target_id)
        .ok_or_else(|| ActionError::NotFound(target_id.to_string()))?;

    if source_path.is_empty() {
        return Err(ActionError::InvalidTarget("the root container cannot be moved".into()));
    }
    if id == target_id {
        return Err(ActionError::InvalidTarget(format!("cannot move '{id}' relative to itself")));
    }
    if target_path.starts_with(&source_path) {
        return Err(ActionError::InvalidTarget(format!(
            "cannot move '{id}' into its own subtree"
        )));
    }
    validate_placement(root, &target_path, target_id, position)?;

    let mut next = root.clone();
    let (&ix, parent_path) = source_path
        .split_last()
        .ok_or_else(|| ActionError::InvalidTarget(id.to_string()))?;
    let moving = next
        .container_at_mut(parent_path)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?
        .children
        .remove(ix);

    // indices after the removed node shifted; look the target up again
    let target_path = next
        .path_to(target_id)
        .ok_or_else(|| ActionError::NotFound(target_id.to_string()))?;
    place(&mut next, &target_path, position, moving)?;

    if next == *root {
        return Err(ActionError::Unchanged);
    }
    Ok(next)
}

fn apply_update_node(
    root: &ContainerNode,
    id: &str,
    updates: &NodeUpdate,
) -> Result<ContainerNode, ActionError> {
    let path = root
        .path_to(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    let mut node = root
        .node_at(&path)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?
        .to_owned_node();

    match &mut node {
        Node::Container(container) => {
            if updates.touches_text() {
                return Err(ActionError::InvalidTarget(format!(
                    "'{id}' is a container and has no text"
                )));
            }
            if let Some(attributes) = &updates.attributes {
                container.attributes.merge(attributes);
            }
        }
        Node::Leaf(leaf) => {
            if let Some(kind) = &updates.block_type {
                if kind.is_container_tag() {
                    return Err(ActionError::InvalidTarget(format!(
                        "'{id}' is a text block and cannot become a container"
                    )));
                }
                leaf.kind = kind.clone();
            }
            if let Some(attributes) = &updates.attributes {
                leaf.attributes.merge(attributes);
            }
            if let Some(body) = updates.new_body() {
                leaf.set_body(body);
            }
        }
    }

    replace_node(root, &path, node)
}

fn apply_update_attributes(
    root: &ContainerNode,
    id: &str,
    attributes: &Attributes,
    merge: bool,
) -> Result<ContainerNode, ActionError> {
    let path = root
        .path_to(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    let mut node = root
        .node_at(&path)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?
        .to_owned_node();

    let target = node.attributes_mut();
    if merge {
        target.merge(attributes);
    } else {
        *target = attributes.clone();
    }

    replace_node(root, &path, node)
}

/// Write `node` at `path` on a copy of `root`; `Unchanged` if it is equal.
fn replace_node(root: &ContainerNode, path: &[usize], node: Node) -> Result<ContainerNode, ActionError> {
    let unchanged = root
        .node_at(path)
        .map(|old| old.to_owned_node() == node)
        .unwrap_or(false);
    if unchanged {
        return Err(ActionError::Unchanged);
    }

    let mut next = root.clone();
    if path.is_empty() {
        match node {
            Node::Container(container) => next = container,
            Node::Leaf(leaf) => {
                return Err(ActionError::InvalidTarget(format!(
                    "root cannot become leaf '{}'",
                    leaf.id
                )))
            }
        }
    } else {
        let slot = next
            .node_at_mut(path)
            .ok_or_else(|| ActionError::NotFound(node.id().to_string()))?;
        *slot = node;
    }
    Ok(next)
}

fn validate_new_ids(root: &ContainerNode, node: &Node) -> Result<(), ActionError> {
    let mut seen = HashSet::new();
    for id in node.ids() {
        if root.contains_id(&id) || !seen.insert(id.clone()) {
            return Err(ActionError::DuplicateId(id));
        }
    }
    Ok(())
}

fn validate_placement(
    root: &ContainerNode,
    target_path: &[usize],
    target_id: &str,
    position: Position,
) -> Result<(), ActionError> {
    match position {
        Position::Inside => match root.node_at(target_path) {
            Some(target) if target.as_container().is_some() => Ok(()),
            Some(_) => Err(ActionError::InvalidTarget(format!(
                "'{target_id}' is not a container"
            ))),
            None => Err(ActionError::NotFound(target_id.to_string())),
        },
        Position::Before | Position::After if target_path.is_empty() => Err(
            ActionError::InvalidTarget("nothing can be placed beside the root".into()),
        ),
        Position::Before | Position::After => Ok(()),
    }
}

fn place(
    root: &mut ContainerNode,
    target_path: &[usize],
    position: Position,
    node: Arc<Node>,
) -> Result<(), ActionError> {
    let invalid = || ActionError::InvalidTarget("target moved during placement".into());
    match position {
        Position::Inside => {
            let container = root.container_at_mut(target_path).ok_or_else(invalid)?;
            container.children.push(node);
        }
        Position::Before | Position::After => {
            let (&ix, parent_path) = target_path.split_last().ok_or_else(invalid)?;
            let parent = root.container_at_mut(parent_path).ok_or_else(invalid)?;
            let at = if position == Position::After { ix + 1 } else { ix };
            parent.children.insert(at.min(parent.children.len()), node);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_model::{BlockKind, InlineRun, LeafBody, TextNode};

    fn two_paragraphs() -> EditorState {
        EditorState::new(
            ContainerNode::new("root")
                .with_child(TextNode::paragraph("p1", "one"))
                .with_child(ContainerNode::new("box").with_child(TextNode::paragraph("inner", "x")))
                .with_child(TextNode::paragraph("p3", "three")),
        )
        .unwrap()
    }

    fn child_ids(container: &ContainerNode) -> Vec<&str> {
        container.children.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_insert_before_after_inside() {
        let state = two_paragraphs();

        let next = reduce(&state, &Action::insert(TextNode::paragraph("a", ""), "p1", Position::Before)).unwrap();
        assert_eq!(child_ids(next.current()), vec!["a", "p1", "box", "p3"]);

        let next = reduce(&next, &Action::insert(TextNode::paragraph("b", ""), "box", Position::Inside)).unwrap();
        let inner = next.current().find("box").unwrap().as_container().unwrap();
        assert_eq!(child_ids(inner), vec!["inner", "b"]);
        assert_eq!(next.history_index(), 2);
    }

    #[test]
    fn test_insert_inside_leaf_is_invalid() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::insert(TextNode::paragraph("a", ""), "p1", Position::Inside)).unwrap_err();
        assert!(matches!(err, ActionError::InvalidTarget(_)));
    }

    #[test]
    fn test_insert_missing_target() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::insert(TextNode::paragraph("a", ""), "nope", Position::After)).unwrap_err();
        assert_eq!(err, ActionError::NotFound("nope".into()));
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::insert(TextNode::paragraph("inner", ""), "p1", Position::After)).unwrap_err();
        assert_eq!(err, ActionError::DuplicateId("inner".into()));

        let twice = ContainerNode::new("c")
            .with_child(TextNode::paragraph("q", ""))
            .with_child(TextNode::paragraph("q", ""));
        let err = reduce(&state, &Action::insert(twice, "p1", Position::After)).unwrap_err();
        assert_eq!(err, ActionError::DuplicateId("q".into()));
    }

    #[test]
    fn test_insert_beside_root_rejected() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::insert(TextNode::paragraph("a", ""), "root", Position::After)).unwrap_err();
        assert!(matches!(err, ActionError::InvalidTarget(_)));
    }

    #[test]
    fn test_delete_subtree_and_root() {
        let state = two_paragraphs();
        let next = reduce(&state, &Action::delete("box")).unwrap();
        assert!(next.current().find("inner").is_none());

        assert!(matches!(reduce(&state, &Action::delete("root")), Err(ActionError::InvalidTarget(_))));
        assert_eq!(reduce(&state, &Action::delete("missing")).unwrap_err(), ActionError::NotFound("missing".into()));
    }

    #[test]
    fn test_move_keeps_ids_unique() {
        let state = two_paragraphs();
        let next = reduce(&state, &Action::move_to("p3", "inner", Position::Before)).unwrap();

        let root = next.current();
        assert_eq!(child_ids(root), vec!["p1", "box"]);
        let inner = root.find("box").unwrap().as_container().unwrap();
        assert_eq!(child_ids(inner), vec!["p3", "inner"]);
        assert!(root.duplicate_ids().is_empty());
    }

    #[test]
    fn test_move_forward_within_same_parent() {
        let state = two_paragraphs();
        let next = reduce(&state, &Action::move_to("p1", "p3", Position::After)).unwrap();
        assert_eq!(child_ids(next.current()), vec!["box", "p3", "p1"]);
    }

    #[test]
    fn test_move_into_own_subtree_rejected() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::move_to("box", "inner", Position::After)).unwrap_err();
        assert!(matches!(err, ActionError::InvalidTarget(_)));
        let err = reduce(&state, &Action::move_to("box", "box", Position::Inside)).unwrap_err();
        assert!(matches!(err, ActionError::InvalidTarget(_)));
    }

    #[test]
    fn test_move_to_current_place_is_unchanged() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::move_to("p1", "box", Position::Before)).unwrap_err();
        assert_eq!(err, ActionError::Unchanged);
    }

    #[test]
    fn test_update_node_body_replaces_other_fields() {
        let state = two_paragraphs();
        let runs = vec![InlineRun::plain("bold").bold()];
        let next = reduce(&state, &Action::update_body("p1", LeafBody::Runs(runs.clone()))).unwrap();

        let leaf = next.current().find("p1").unwrap().as_leaf().unwrap();
        assert_eq!(leaf.children.as_ref(), Some(&runs));
        assert!(leaf.content.is_none());
    }

    #[test]
    fn test_update_node_same_value_is_unchanged() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::update_content("p1", "one")).unwrap_err();
        assert_eq!(err, ActionError::Unchanged);
    }

    #[test]
    fn test_update_text_on_container_rejected() {
        let state = two_paragraphs();
        let err = reduce(&state, &Action::update_content("box", "x")).unwrap_err();
        assert!(matches!(err, ActionError::InvalidTarget(_)));
    }

    #[test]
    fn test_set_block_type_sugar() {
        let state = two_paragraphs();
        let next = reduce(
            &state,
            &Action::SetBlockType {
                id: "p1".into(),
                block_type: BlockKind::heading(2),
            },
        )
        .unwrap();
        assert_eq!(next.current().find("p1").unwrap().as_leaf().unwrap().kind, BlockKind::Heading(2));
    }

    #[test]
    fn test_set_block_type_container_rejected() {
        let state = two_paragraphs();
        let action: Action = serde_json::from_str(
            r#"{ "type": "SET_BLOCK_TYPE", "id": "p1", "blockType": "container" }"#,
        )
        .unwrap();
        let err = reduce(&state, &action).unwrap_err();
        assert!(matches!(err, ActionError::InvalidTarget(_)));

        let action: Action = serde_json::from_str(
            r#"{ "type": "UPDATE_NODE", "id": "p1", "updates": { "type": "container" } }"#,
        )
        .unwrap();
        assert!(matches!(reduce(&state, &action), Err(ActionError::InvalidTarget(_))));
    }

    #[test]
    fn test_replace_attributes_without_merge() {
        let state = two_paragraphs();
        let state = reduce(&state, &Action::merge_attributes("p1", Attributes::new().with_class_name("a"))).unwrap();
        let next = reduce(
            &state,
            &Action::UpdateAttributes {
                id: "p1".into(),
                attributes: Attributes::new().with_src("x"),
                merge: false,
            },
        )
        .unwrap();
        let attrs = next.current().find("p1").unwrap().attributes();
        assert!(attrs.class_name.is_none());
        assert_eq!(attrs.src.as_deref(), Some("x"));
    }

    #[test]
    fn test_cover_image_targets_root() {
        let state = two_paragraphs();
        let next = reduce(&state, &Action::SetCoverImage { src: Some("c.png".into()) }).unwrap();
        assert_eq!(
            next.current().attributes.extra.get(crate::actions::COVER_IMAGE_KEY),
            Some(&serde_json::json!("c.png"))
        );

        let cleared = reduce(&next, &Action::SetCoverImage { src: None }).unwrap();
        assert!(cleared.current().attributes.extra.is_empty());
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = two_paragraphs();
        let action = Action::move_to("p1", "inner", Position::After);
        let a = reduce(&state, &action).unwrap();
        let b = reduce(&state, &action).unwrap();
        assert_eq!(a.current(), b.current());
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.current().children.len(), 3);
    }

    #[test]
    fn test_undo_redo_boundaries() {
        let state = two_paragraphs();
        assert_eq!(reduce(&state, &Action::Undo).unwrap_err(), ActionError::HistoryBoundary("undo"));
        assert_eq!(reduce(&state, &Action::Redo).unwrap_err(), ActionError::HistoryBoundary("redo"));
    }

    #[test]
    fn test_replace_container_always_recorded() {
        let state = two_paragraphs();
        let same = (**state.current()).clone();
        let next = reduce(&state, &Action::ReplaceContainer { container: same }).unwrap();
        assert_eq!(next.history().len(), 2);
    }

    #[test]
    fn test_replace_container_with_duplicates_rejected() {
        let state = two_paragraphs();
        let bad = ContainerNode::new("root")
            .with_child(TextNode::paragraph("x", ""))
            .with_child(TextNode::paragraph("x", ""));
        assert!(matches!(
            reduce(&state, &Action::ReplaceContainer { container: bad }),
            Err(ActionError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_set_active_node_not_recorded() {
        let state = two_paragraphs();
        let next = reduce(&state, &Action::SetActiveNode { id: Some("p1".into()) }).unwrap();
        assert_eq!(next.active_node_id(), Some("p1"));
        assert_eq!(next.history().len(), 1);
        assert_eq!(
            reduce(&next, &Action::SetActiveNode { id: Some("p1".into()) }).unwrap_err(),
            ActionError::Unchanged
        );
    }
}
