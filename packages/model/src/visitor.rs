use crate::node::{ContainerNode, Node, TextNode};

/// Visitor pattern for walking a document tree in pre-order
///
/// Default implementations walk the entire tree. Override specific visit_*
/// methods to act on nodes; call the matching walk_* to keep descending.
pub trait Visitor: Sized {
    fn visit_container(&mut self, container: &ContainerNode) {
        walk_container(self, container);
    }

    fn visit_leaf(&mut self, _leaf: &TextNode) {
        // Leaf node, no children to walk
    }
}

pub fn walk_container<V: Visitor>(visitor: &mut V, container: &ContainerNode) {
    for child in &container.children {
        walk_node(visitor, child);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node {
        Node::Container(c) => visitor.visit_container(c),
        Node::Leaf(l) => visitor.visit_leaf(l),
    }
}

/// Collects every id in pre-order.
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_container(&mut self, container: &ContainerNode) {
        self.ids.push(container.id.clone());
        walk_container(self, container);
    }

    fn visit_leaf(&mut self, leaf: &TextNode) {
        self.ids.push(leaf.id.clone());
    }
}

/// Counts leaves and containers, excluding the visited root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    pub containers: usize,
    pub leaves: usize,
    pub max_depth: usize,
    depth: usize,
}

impl NodeStats {
    pub fn of(root: &ContainerNode) -> Self {
        let mut stats = NodeStats::default();
        walk_container(&mut stats, root);
        stats
    }
}

impl Visitor for NodeStats {
    fn visit_container(&mut self, container: &ContainerNode) {
        self.containers += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        walk_container(self, container);
        self.depth -= 1;
    }

    fn visit_leaf(&mut self, _leaf: &TextNode) {
        self.leaves += 1;
    }
}
