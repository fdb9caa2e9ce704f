//! Id lookup and path addressing.
//!
//! Every lookup is a depth-first pre-order walk that stops at the first
//! match. Paths are child indices from the root; the empty path is the root.
//!
//! The `*_mut` accessors copy each node on the way down that is still shared
//! with another snapshot (`Arc::make_mut`), so writing through them never
//! changes a tree anyone else can see.

use crate::error::ModelError;
use crate::node::{ContainerNode, Node, NodeRef};
use crate::visitor::{walk_container, walk_node, IdCollector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Where a node goes relative to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Before,
    After,
    /// Appended as the target container's last child
    Inside,
}

impl ContainerNode {
    /// First node (root included) whose id matches.
    pub fn find(&self, id: &str) -> Option<NodeRef<'_>> {
        if self.id == id {
            return Some(NodeRef::Container(self));
        }
        for child in &self.children {
            match child.as_ref() {
                Node::Leaf(leaf) if leaf.id == id => return Some(NodeRef::Leaf(leaf)),
                Node::Leaf(_) => {}
                Node::Container(c) => {
                    if let Some(found) = c.find(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Child-index path from this container to the node with `id`.
    pub fn path_to(&self, id: &str) -> Option<Vec<usize>> {
        fn search(container: &ContainerNode, id: &str, path: &mut Vec<usize>) -> bool {
            for (ix, child) in container.children.iter().enumerate() {
                path.push(ix);
                if child.id() == id {
                    return true;
                }
                if let Node::Container(c) = child.as_ref() {
                    if search(c, id, path) {
                        return true;
                    }
                }
                path.pop();
            }
            false
        }

        if self.id == id {
            return Some(Vec::new());
        }
        let mut path = Vec::new();
        search(self, id, &mut path).then_some(path)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<NodeRef<'_>> {
        match path.split_first() {
            None => Some(NodeRef::Container(self)),
            Some((&ix, rest)) => match self.children.get(ix)?.as_ref() {
                Node::Container(c) => c.node_at(rest),
                Node::Leaf(leaf) if rest.is_empty() => Some(NodeRef::Leaf(leaf)),
                Node::Leaf(_) => None,
            },
        }
    }

    /// Container at `path`, copying shared nodes along the way.
    pub fn container_at_mut(&mut self, path: &[usize]) -> Option<&mut ContainerNode> {
        match path.split_first() {
            None => Some(self),
            Some((&ix, rest)) => match Arc::make_mut(self.children.get_mut(ix)?) {
                Node::Container(child) => child.container_at_mut(rest),
                Node::Leaf(_) => None,
            },
        }
    }

    /// Non-root node at `path`, copying shared nodes along the way.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (&last, parent_path) = path.split_last()?;
        let parent = self.container_at_mut(parent_path)?;
        Some(Arc::make_mut(parent.children.get_mut(last)?))
    }

    /// All ids in pre-order, root first.
    pub fn ids(&self) -> Vec<String> {
        let mut collector = IdCollector::default();
        collector.ids.push(self.id.clone());
        walk_container(&mut collector, self);
        collector.ids
    }

    /// Ids that occur more than once, in order of their second occurrence.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.ids() {
            if !seen.insert(id.clone()) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        duplicates
    }
}

impl Node {
    /// Ids of this node and its whole subtree.
    pub fn ids(&self) -> Vec<String> {
        let mut collector = IdCollector::default();
        walk_node(&mut collector, self);
        collector.ids
    }
}

pub fn ensure_unique_ids(root: &ContainerNode) -> Result<(), ModelError> {
    match root.duplicate_ids().into_iter().next() {
        Some(id) => Err(ModelError::DuplicateId(id)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextNode;

    fn sample() -> ContainerNode {
        ContainerNode::new("root")
            .with_child(TextNode::paragraph("p1", "one"))
            .with_child(
                ContainerNode::new("list")
                    .with_child(TextNode::paragraph("a", "a"))
                    .with_child(ContainerNode::new("inner").with_child(TextNode::paragraph("b", "b"))),
            )
            .with_child(TextNode::paragraph("p2", "two"))
    }

    #[test]
    fn test_find_pre_order() {
        let root = sample();
        assert_eq!(root.find("root").unwrap().id(), "root");
        assert_eq!(root.find("b").unwrap().as_leaf().unwrap().plain_text(), "b");
        assert!(root.find("inner").unwrap().as_container().is_some());
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn test_path_round_trip() {
        let root = sample();
        let path = root.path_to("b").unwrap();
        assert_eq!(path, vec![1, 1, 0]);
        assert_eq!(root.node_at(&path).unwrap().id(), "b");
        assert_eq!(root.path_to("root"), Some(vec![]));
        assert_eq!(root.path_to("nope"), None);
        assert!(root.node_at(&[0, 0]).is_none());
    }

    #[test]
    fn test_mut_access_copies_shared_path_only() {
        let original = sample();
        let mut copy = original.clone();

        if let Some(Node::Leaf(leaf)) = copy.node_at_mut(&[1, 1, 0]) {
            leaf.content = Some("changed".into());
        }

        assert_eq!(original.find("b").unwrap().as_leaf().unwrap().plain_text(), "b");
        assert_eq!(copy.find("b").unwrap().as_leaf().unwrap().plain_text(), "changed");
        // untouched siblings are still shared
        assert!(Arc::ptr_eq(&original.children[0], &copy.children[0]));
        assert!(Arc::ptr_eq(&original.children[2], &copy.children[2]));
        assert!(!Arc::ptr_eq(&original.children[1], &copy.children[1]));
    }

    #[test]
    fn test_duplicate_detection() {
        let root = sample();
        assert!(ensure_unique_ids(&root).is_ok());

        let dup = root.with_child(TextNode::paragraph("a", "again"));
        assert_eq!(dup.duplicate_ids(), vec!["a".to_string()]);
        assert!(matches!(ensure_unique_ids(&dup), Err(ModelError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_node_ids_include_subtree() {
        let node: Node = ContainerNode::new("c")
            .with_child(TextNode::paragraph("x", ""))
            .into();
        assert_eq!(node.ids(), vec!["c".to_string(), "x".to_string()]);
    }
}
