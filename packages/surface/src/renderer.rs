//! # Block Tree Renderer
//!
//! Maps a document tree to a view tree. Each container level adds one to
//! `depth`, which is only used for indentation.

use crate::markup::build_markup;
use serde::Serialize;
use std::fmt::Write;
use strata_model::{BlockKind, ContainerNode, Layout, ListType, Node, TextNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub node_id: String,
    pub depth: usize,
    pub kind: ViewKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewKind {
    Table {
        rows: Vec<BlockView>,
    },
    TableRow {
        cells: Vec<BlockView>,
    },
    FlexRow {
        children: Vec<BlockView>,
    },
    List {
        list_type: ListType,
        items: Vec<BlockView>,
    },
    Container {
        children: Vec<BlockView>,
    },
    LineBreak,
    Media {
        kind: BlockKind,
        src: Option<String>,
        alt: Option<String>,
        loading: bool,
        error: bool,
    },
    /// Editable region; `markup` is what the reconciler writes
    Text {
        kind: BlockKind,
        markup: String,
        class_name: Option<String>,
        placeholder: Option<String>,
    },
}

pub fn render_tree(root: &ContainerNode, read_only: bool) -> BlockView {
    render_container(root, 0, read_only)
}

pub fn render_node(node: &Node, depth: usize, read_only: bool) -> BlockView {
    match node {
        Node::Container(container) => render_container(container, depth, read_only),
        Node::Leaf(leaf) => render_leaf(leaf, depth, read_only),
    }
}

fn render_container(container: &ContainerNode, depth: usize, read_only: bool) -> BlockView {
    let children: Vec<BlockView> = container
        .children
        .iter()
        .map(|child| render_node(child, depth + 1, read_only))
        .collect();

    let kind = match (container.attributes.layout, container.list_type()) {
        (Some(Layout::Table), _) => ViewKind::Table { rows: children },
        (Some(Layout::TableRow), _) => ViewKind::TableRow { cells: children },
        (Some(Layout::Flex), _) => ViewKind::FlexRow { children },
        (None, Some(list_type)) => ViewKind::List {
            list_type,
            items: children,
        },
        (None, None) => ViewKind::Container { children },
    };

    BlockView {
        node_id: container.id.clone(),
        depth,
        kind,
    }
}

fn render_leaf(leaf: &TextNode, depth: usize, read_only: bool) -> BlockView {
    let kind = match &leaf.kind {
        BlockKind::LineBreak => ViewKind::LineBreak,
        kind if kind.is_media() => ViewKind::Media {
            kind: kind.clone(),
            src: leaf.attributes.src.clone(),
            alt: leaf.attributes.alt.clone(),
            loading: leaf.attributes.is_loading(),
            error: leaf.attributes.has_error(),
        },
        kind => ViewKind::Text {
            kind: kind.clone(),
            markup: build_markup(leaf, read_only),
            class_name: leaf.attributes.class_name.clone(),
            placeholder: leaf.attributes.placeholder.clone(),
        },
    };

    BlockView {
        node_id: leaf.id.clone(),
        depth,
        kind,
    }
}

impl BlockView {
    pub fn children(&self) -> &[BlockView] {
        match &self.kind {
            ViewKind::Table { rows } => rows,
            ViewKind::TableRow { cells } => cells,
            ViewKind::FlexRow { children } | ViewKind::Container { children } => children,
            ViewKind::List { items, .. } => items,
            ViewKind::LineBreak | ViewKind::Media { .. } | ViewKind::Text { .. } => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ViewKind::Text { .. })
    }

    pub fn find(&self, node_id: &str) -> Option<&BlockView> {
        if self.node_id == node_id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(node_id))
    }

    /// Editable regions in document order.
    pub fn text_views(&self) -> Vec<&BlockView> {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a BlockView>) {
        if self.is_text() {
            out.push(self);
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }

    fn label(&self) -> String {
        match &self.kind {
            ViewKind::Table { rows } => format!("table ({} rows)", rows.len()),
            ViewKind::TableRow { cells } => format!("row ({} cells)", cells.len()),
            ViewKind::FlexRow { children } => format!("flex ({} items)", children.len()),
            ViewKind::List { list_type, items } => format!("{} ({} items)", list_type.tag(), items.len()),
            ViewKind::Container { children } => format!("container ({} children)", children.len()),
            ViewKind::LineBreak => "br".to_string(),
            ViewKind::Media {
                kind,
                src,
                loading,
                error,
                ..
            } => {
                let status = if *error {
                    "error"
                } else if *loading {
                    "uploading"
                } else {
                    src.as_deref().unwrap_or("no src")
                };
                format!("{} [{}]", kind.tag(), status)
            }
            ViewKind::Text { kind, markup, .. } => format!("{} {:?}", kind.tag(), markup),
        }
    }

    /// Indented one-line-per-block outline.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out);
        out
    }

    fn write_outline(&self, out: &mut String) {
        let _ = writeln!(out, "{}{} {}", "  ".repeat(self.depth), self.node_id, self.label());
        for child in self.children() {
            child.write_outline(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_model::{Attributes, InlineRun};

    #[test]
    fn test_list_detection() {
        let explicit = ContainerNode::new("l1")
            .with_attributes(Attributes::new().with_list_type(ListType::Ordered))
            .with_child(TextNode::paragraph("a", "x"));
        let legacy = ContainerNode::new("l2")
            .with_child(TextNode::new("b", BlockKind::ListItem).with_content("y"))
            .with_child(TextNode::paragraph("c", "z"));
        let plain = ContainerNode::new("c1").with_child(TextNode::paragraph("d", "w"));
        let root = ContainerNode::new("root")
            .with_child(explicit)
            .with_child(legacy)
            .with_child(plain);

        let view = render_tree(&root, false);
        assert!(matches!(
            view.find("l1").unwrap().kind,
            ViewKind::List { list_type: ListType::Ordered, .. }
        ));
        assert!(matches!(
            view.find("l2").unwrap().kind,
            ViewKind::List { list_type: ListType::Unordered, .. }
        ));
        assert!(matches!(view.find("c1").unwrap().kind, ViewKind::Container { .. }));
    }

    #[test]
    fn test_depth_and_layouts() {
        let table = ContainerNode::new("t")
            .with_attributes(Attributes::new().with_layout(Layout::Table))
            .with_child(
                ContainerNode::new("r")
                    .with_attributes(Attributes::new().with_layout(Layout::TableRow))
                    .with_child(TextNode::paragraph("cell", "1")),
            );
        let root = ContainerNode::new("root")
            .with_child(table)
            .with_child(TextNode::new("br1", BlockKind::LineBreak));

        let view = render_tree(&root, false);
        assert_eq!(view.depth, 0);
        assert_eq!(view.find("t").unwrap().depth, 1);
        assert!(matches!(view.find("r").unwrap().kind, ViewKind::TableRow { .. }));
        assert_eq!(view.find("cell").unwrap().depth, 3);
        assert_eq!(view.find("br1").unwrap().kind, ViewKind::LineBreak);
    }

    #[test]
    fn test_media_and_text_views() {
        let root = ContainerNode::new("root")
            .with_child(
                TextNode::new("img1", BlockKind::Image)
                    .with_attributes(Attributes::new().with_loading(true)),
            )
            .with_child(
                TextNode::new("p", BlockKind::heading(2))
                    .with_runs(vec![InlineRun::plain("Title").bold()]),
            );

        let view = render_tree(&root, false);
        assert!(matches!(
            view.find("img1").unwrap().kind,
            ViewKind::Media { loading: true, .. }
        ));
        let texts = view.text_views();
        assert_eq!(texts.len(), 1);
        match &texts[0].kind {
            ViewKind::Text { markup, kind, .. } => {
                assert_eq!(markup, r#"<span class="bold">Title</span>"#);
                assert_eq!(*kind, BlockKind::Heading(2));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn test_view_serializes_with_tag() {
        let root = ContainerNode::new("root").with_child(TextNode::new("br", BlockKind::LineBreak));
        let json = serde_json::to_value(render_tree(&root, false)).unwrap();
        assert_eq!(json["kind"]["view"], "container");
        assert_eq!(json["kind"]["children"][0]["nodeId"], "br");
        assert_eq!(json["kind"]["children"][0]["kind"]["view"], "lineBreak");
    }

    #[test]
    fn test_outline() {
        let root = ContainerNode::new("root").with_child(TextNode::paragraph("p1", "hi"));
        assert_eq!(
            render_tree(&root, false).outline(),
            "root container (1 children)\n  p1 p \"hi\"\n"
        );
    }
}
