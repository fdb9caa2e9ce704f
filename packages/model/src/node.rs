//! # Node Model
//!
//! A document is a tree of [`ContainerNode`]s whose leaves are [`TextNode`]s.
//!
//! ```text
//! container (root)
//! ├── p        "Hello"
//! ├── container (listType: ul)
//! │   ├── li   "one"
//! │   └── li   "two"
//! └── img      (src, loading, error)
//! ```
//!
//! Children are held behind [`Arc`] so that history snapshots share every
//! subtree a mutation did not touch. Nodes are never mutated in place once
//! they are reachable from a snapshot; the editor copies the path it changes.
//!
//! In JSON both variants use the same field names. `type == "container"`
//! decides whether `children` holds nodes or inline runs.

use crate::attributes::{Attributes, ListType};
use crate::error::ModelError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

pub const CONTAINER_TYPE: &str = "container";

/// Leaf block type (`type` field of a text node).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    Blockquote,
    Code,
    ListItem,
    OrderedListItem,
    Image,
    Video,
    LineBreak,
    /// Unknown tags survive a load/save round trip
    Other(String),
}

impl BlockKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "p" | "paragraph" => BlockKind::Paragraph,
            "h1" => BlockKind::Heading(1),
            "h2" => BlockKind::Heading(2),
            "h3" => BlockKind::Heading(3),
            "h4" => BlockKind::Heading(4),
            "h5" => BlockKind::Heading(5),
            "h6" => BlockKind::Heading(6),
            "blockquote" => BlockKind::Blockquote,
            "code" => BlockKind::Code,
            "li" => BlockKind::ListItem,
            "ol" => BlockKind::OrderedListItem,
            "img" | "image" => BlockKind::Image,
            "video" => BlockKind::Video,
            "br" => BlockKind::LineBreak,
            other => BlockKind::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading(level) => match level {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            },
            BlockKind::Blockquote => "blockquote",
            BlockKind::Code => "code",
            BlockKind::ListItem => "li",
            BlockKind::OrderedListItem => "ol",
            BlockKind::Image => "img",
            BlockKind::Video => "video",
            BlockKind::LineBreak => "br",
            BlockKind::Other(tag) => tag,
        }
    }

    pub fn heading(level: u8) -> Self {
        BlockKind::Heading(level.clamp(1, 6))
    }

    /// Member of the list-item family used by the legacy list derivation.
    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockKind::ListItem | BlockKind::OrderedListItem)
    }

    pub fn is_media(&self) -> bool {
        matches!(self, BlockKind::Image | BlockKind::Video)
    }

    /// A leaf tagged `container` would reload as a container and lose its text.
    pub fn is_container_tag(&self) -> bool {
        matches!(self, BlockKind::Other(tag) if tag == CONTAINER_TYPE)
    }

    /// List flavour implied by a list-item type.
    pub fn implied_list_type(&self) -> Option<ListType> {
        match self {
            BlockKind::ListItem => Some(ListType::Unordered),
            BlockKind::OrderedListItem => Some(ListType::Ordered),
            _ => None,
        }
    }
}

impl Serialize for BlockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(BlockKind::from_tag(&tag))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A run of text sharing one formatting specification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineRun {
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Link target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Semantic wrapper tag (`code`, `mark`, `s`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
}

impl InlineRun {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_element_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }

    /// True when the run carries no formatting at all.
    pub fn is_unformatted(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.underline
            && self.class_name.is_none()
            && self.href.is_none()
            && self.element_type.is_none()
    }

    /// Same formatting, ignoring the text.
    pub fn same_format(&self, other: &InlineRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.class_name == other.class_name
            && self.href == other.href
            && self.element_type == other.element_type
    }
}

/// One soft-wrapped line of a multi-line leaf.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Line {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<InlineRun>>,
}

impl Line {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            children: None,
        }
    }

    pub fn runs(children: Vec<InlineRun>) -> Self {
        Self {
            content: None,
            children: Some(children),
        }
    }

    /// Runs win over plain content.
    pub fn plain_text(&self) -> String {
        match &self.children {
            Some(runs) if !runs.is_empty() => runs.iter().map(|r| r.content.as_str()).collect(),
            _ => self.content.clone().unwrap_or_default(),
        }
    }
}

/// The authoritative text of a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafBody {
    Content(String),
    Runs(Vec<InlineRun>),
    Lines(Vec<Line>),
}

impl LeafBody {
    pub fn plain_text(&self) -> String {
        match self {
            LeafBody::Content(text) => text.clone(),
            LeafBody::Runs(runs) => runs.iter().map(|r| r.content.as_str()).collect(),
            LeafBody::Lines(lines) => lines
                .iter()
                .map(Line::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A node holding displayable text (or media).
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub id: String,
    pub kind: BlockKind,
    pub attributes: Attributes,
    pub content: Option<String>,
    pub children: Option<Vec<InlineRun>>,
    pub lines: Option<Vec<Line>>,
}

impl TextNode {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes: Attributes::default(),
            content: None,
            children: None,
            lines: None,
        }
    }

    pub fn paragraph(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockKind::Paragraph).with_content(text)
    }

    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.set_body(LeafBody::Content(text.into()));
        self
    }

    pub fn with_runs(mut self, runs: Vec<InlineRun>) -> Self {
        self.set_body(LeafBody::Runs(runs));
        self
    }

    pub fn with_lines(mut self, lines: Vec<Line>) -> Self {
        self.set_body(LeafBody::Lines(lines));
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Resolve the body by precedence: `lines` > `children` > `content`.
    ///
    /// Empty `lines`/`children` vectors count as unpopulated.
    pub fn body(&self) -> LeafBody {
        if let Some(lines) = self.lines.as_ref().filter(|l| !l.is_empty()) {
            return LeafBody::Lines(lines.clone());
        }
        if let Some(runs) = self.children.as_ref().filter(|r| !r.is_empty()) {
            return LeafBody::Runs(runs.clone());
        }
        LeafBody::Content(self.content.clone().unwrap_or_default())
    }

    /// Replace the body; the two other text fields are cleared.
    pub fn set_body(&mut self, body: LeafBody) {
        self.content = None;
        self.children = None;
        self.lines = None;
        match body {
            LeafBody::Content(text) => self.content = Some(text),
            LeafBody::Runs(runs) => self.children = Some(runs),
            LeafBody::Lines(lines) => self.lines = Some(lines),
        }
    }

    pub fn plain_text(&self) -> String {
        self.body().plain_text()
    }
}

/// A node whose children are other nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerNode {
    pub id: String,
    pub attributes: Attributes,
    pub children: Vec<Arc<Node>>,
}

impl ContainerNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(Arc::new(child.into()));
        self
    }

    pub fn with_children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children
            .extend(children.into_iter().map(|c| Arc::new(c.into())));
        self
    }

    /// List flavour of this container, if it is a list.
    ///
    /// The explicit `listType` attribute wins. Otherwise the first child's
    /// type decides, which keeps documents written before `listType` existed
    /// working. Always computed from the current children.
    pub fn list_type(&self) -> Option<ListType> {
        if let Some(list_type) = self.attributes.list_type {
            return Some(list_type);
        }
        match self.children.first().map(|c| c.as_ref()) {
            Some(Node::Leaf(leaf)) => leaf.kind.implied_list_type(),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.list_type().is_some()
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        match serde_json::from_str::<Node>(json)? {
            Node::Container(container) => Ok(container),
            Node::Leaf(leaf) => Err(ModelError::InvalidNode(format!(
                "document root '{}' must be a container",
                leaf.id
            ))),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&NodeRef::Container(self))?)
    }
}

/// Either kind of node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub enum Node {
    Container(ContainerNode),
    Leaf(TextNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Container(c) => &c.id,
            Node::Leaf(l) => &l.id,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Node::Container(c) => &c.attributes,
            Node::Leaf(l) => &l.attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            Node::Container(c) => &mut c.attributes,
            Node::Leaf(l) => &mut l.attributes,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Container(_))
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            Node::Container(c) => Some(c),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&TextNode> {
        match self {
            Node::Leaf(l) => Some(l),
            Node::Container(_) => None,
        }
    }

    pub fn view(&self) -> NodeRef<'_> {
        match self {
            Node::Container(c) => NodeRef::Container(c),
            Node::Leaf(l) => NodeRef::Leaf(l),
        }
    }
}

impl From<ContainerNode> for Node {
    fn from(container: ContainerNode) -> Self {
        Node::Container(container)
    }
}

impl From<TextNode> for Node {
    fn from(leaf: TextNode) -> Self {
        Node::Leaf(leaf)
    }
}

/// Borrowed view of a node; the document root is a bare [`ContainerNode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Container(&'a ContainerNode),
    Leaf(&'a TextNode),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            NodeRef::Container(c) => &c.id,
            NodeRef::Leaf(l) => &l.id,
        }
    }

    pub fn attributes(&self) -> &'a Attributes {
        match self {
            NodeRef::Container(c) => &c.attributes,
            NodeRef::Leaf(l) => &l.attributes,
        }
    }

    pub fn as_container(&self) -> Option<&'a ContainerNode> {
        match self {
            NodeRef::Container(c) => Some(c),
            NodeRef::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&'a TextNode> {
        match self {
            NodeRef::Leaf(l) => Some(l),
            NodeRef::Container(_) => None,
        }
    }

    pub fn to_owned_node(&self) -> Node {
        match self {
            NodeRef::Container(c) => Node::Container((*c).clone()),
            NodeRef::Leaf(l) => Node::Leaf((*l).clone()),
        }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            NodeRef::Container(c) => {
                map.serialize_entry("id", &c.id)?;
                map.serialize_entry("type", CONTAINER_TYPE)?;
                if !c.attributes.is_empty() {
                    map.serialize_entry("attributes", &c.attributes)?;
                }
                map.serialize_entry("children", &c.children)?;
            }
            NodeRef::Leaf(l) => {
                map.serialize_entry("id", &l.id)?;
                map.serialize_entry("type", &l.kind)?;
                if !l.attributes.is_empty() {
                    map.serialize_entry("attributes", &l.attributes)?;
                }
                if let Some(content) = &l.content {
                    map.serialize_entry("content", content)?;
                }
                if let Some(children) = &l.children {
                    map.serialize_entry("children", children)?;
                }
                if let Some(lines) = &l.lines {
                    map.serialize_entry("lines", lines)?;
                }
            }
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}

impl Serialize for ContainerNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRef::Container(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContainerNode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Node::deserialize(deserializer)? {
            Node::Container(container) => Ok(container),
            Node::Leaf(leaf) => Err(serde::de::Error::custom(format!(
                "expected a container, found '{}' node '{}'",
                leaf.kind.tag(),
                leaf.id
            ))),
        }
    }
}

/// Wire shape shared by both variants.
#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    children: Option<serde_json::Value>,
    #[serde(default)]
    lines: Option<Vec<Line>>,
}

impl TryFrom<RawNode> for Node {
    type Error = ModelError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.id.is_empty() {
            return Err(ModelError::InvalidNode("node id must not be empty".into()));
        }

        if raw.kind == CONTAINER_TYPE {
            let children: Vec<Arc<Node>> = match raw.children {
                Some(value) if !value.is_null() => serde_json::from_value(value)?,
                _ => Vec::new(),
            };
            return Ok(Node::Container(ContainerNode {
                id: raw.id,
                attributes: raw.attributes,
                children,
            }));
        }

        let children: Option<Vec<InlineRun>> = match raw.children {
            Some(value) if !value.is_null() => Some(serde_json::from_value(value)?),
            _ => None,
        };

        Ok(Node::Leaf(TextNode {
            id: raw.id,
            kind: BlockKind::from_tag(&raw.kind),
            attributes: raw.attributes,
            content: raw.content,
            children,
            lines: raw.lines,
        }))
    }
}
