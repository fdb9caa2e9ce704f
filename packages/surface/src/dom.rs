//! # In-memory DOM
//!
//! Arena of element and text nodes with the small slice of browser behavior
//! the surface relies on: `innerHTML` in both directions, focus, and one
//! live selection range.
//!
//! Invariants:
//! - Slots of removed nodes are reused, but a removed node's key stays
//!   invalid: each reuse bumps the slot generation
//! - A node has at most one parent and the tree never has cycles
//! - Text offsets count `char`s, element offsets count children
//! - Selection endpoints always point at live nodes

use crate::error::SurfaceError;
use crate::markup::{escape_attr, escape_text, is_void_element, parse_into};
use std::fmt;

pub type DomResult<T> = Result<T, SurfaceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomKey {
    index: usize,
    generation: u32,
}

impl fmt::Display for DomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomData {
    Element {
        tag: String,
        /// Source order is kept; serialization depends on it
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    data: DomData,
    parent: Option<DomKey>,
    children: Vec<DomKey>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<DomNode>,
}

/// A boundary point: a text node and a char offset, or an element and a
/// child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomPoint {
    pub node: DomKey,
    pub offset: usize,
}

impl DomPoint {
    pub fn new(node: DomKey, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomRange {
    pub start: DomPoint,
    pub end: DomPoint,
}

impl DomRange {
    pub fn new(start: DomPoint, end: DomPoint) -> Self {
        Self { start, end }
    }

    pub fn caret(point: DomPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dom {
    slots: Vec<Slot>,
    free: Vec<usize>,
    focused: Option<DomKey>,
    selection: Option<DomRange>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, data: DomData) -> DomKey {
        let node = DomNode {
            data,
            parent: None,
            children: Vec::new(),
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.node = Some(node);
        DomKey {
            index,
            generation: slot.generation,
        }
    }

    fn node(&self, key: DomKey) -> DomResult<&DomNode> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(SurfaceError::UnknownKey(key))
    }

    fn node_mut(&mut self, key: DomKey) -> DomResult<&mut DomNode> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(SurfaceError::UnknownKey(key))
    }

    /// Nodes currently alive, attached or not.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots ever allocated; bounded by the peak number of live nodes.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> DomKey {
        self.alloc(DomData::Element {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> DomKey {
        self.alloc(DomData::Text(text.into()))
    }

    pub fn is_live(&self, key: DomKey) -> bool {
        self.node(key).is_ok()
    }

    pub fn data(&self, key: DomKey) -> Option<&DomData> {
        self.node(key).ok().map(|n| &n.data)
    }

    pub fn tag(&self, key: DomKey) -> Option<&str> {
        match self.data(key)? {
            DomData::Element { tag, .. } => Some(tag),
            DomData::Text(_) => None,
        }
    }

    pub fn is_text(&self, key: DomKey) -> bool {
        matches!(self.data(key), Some(DomData::Text(_)))
    }

    /// Value of a text node.
    pub fn text(&self, key: DomKey) -> Option<&str> {
        match self.data(key)? {
            DomData::Text(text) => Some(text),
            DomData::Element { .. } => None,
        }
    }

    pub fn children(&self, key: DomKey) -> &[DomKey] {
        self.node(key).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, key: DomKey) -> Option<DomKey> {
        self.node(key).ok()?.parent
    }

    pub fn attribute(&self, key: DomKey, name: &str) -> Option<&str> {
        match self.data(key)? {
            DomData::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            DomData::Text(_) => None,
        }
    }

    pub fn attributes(&self, key: DomKey) -> &[(String, String)] {
        match self.data(key) {
            Some(DomData::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn set_attribute(
        &mut self,
        key: DomKey,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let (name, value) = (name.into(), value.into());
        match &mut self.node_mut(key)?.data {
            DomData::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(n, _)| *n == name) {
                    Some(slot) => slot.1 = value,
                    None => attributes.push((name, value)),
                }
                Ok(())
            }
            DomData::Text(_) => Err(SurfaceError::NotAnElement(key)),
        }
    }

    pub fn remove_attribute(&mut self, key: DomKey, name: &str) -> DomResult<()> {
        match &mut self.node_mut(key)?.data {
            DomData::Element { attributes, .. } => {
                attributes.retain(|(n, _)| n != name);
                Ok(())
            }
            DomData::Text(_) => Err(SurfaceError::NotAnElement(key)),
        }
    }

    /// Inclusive: a node contains itself.
    pub fn contains(&self, ancestor: DomKey, key: DomKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return self.is_live(k);
            }
            current = self.parent(k);
        }
        false
    }

    /// Append `child` to `parent`, moving it if it already has a parent.
    pub fn append_child(&mut self, parent: DomKey, child: DomKey) -> DomResult<()> {
        if !matches!(self.node(parent)?.data, DomData::Element { .. }) {
            return Err(SurfaceError::NotAnElement(parent));
        }
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(SurfaceError::Cycle { parent, child });
        }

        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, key: DomKey) -> DomResult<()> {
        if let Some(parent) = self.node(key)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != key);
        }
        self.node_mut(key)?.parent = None;
        Ok(())
    }

    /// Detach `key` and invalidate its whole subtree.
    pub fn remove(&mut self, key: DomKey) -> DomResult<()> {
        self.detach(key)?;
        self.invalidate(key);

        if self.focused.is_some_and(|f| !self.is_live(f)) {
            self.focused = None;
        }
        if let Some(range) = self.selection {
            if !self.is_live(range.start.node) || !self.is_live(range.end.node) {
                self.selection = None;
            }
        }
        Ok(())
    }

    fn invalidate(&mut self, key: DomKey) {
        let children = self.children(key).to_vec();
        for child in children {
            self.invalidate(child);
        }
        if self.node(key).is_err() {
            return;
        }
        let slot = &mut self.slots[key.index];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
    }

    /// Text nodes under `root` in document order.
    pub fn text_nodes(&self, root: DomKey) -> Vec<DomKey> {
        let mut out = Vec::new();
        self.collect_text_nodes(root, &mut out);
        out
    }

    fn collect_text_nodes(&self, key: DomKey, out: &mut Vec<DomKey>) {
        match self.data(key) {
            Some(DomData::Text(_)) => out.push(key),
            Some(DomData::Element { .. }) => {
                for child in self.children(key) {
                    self.collect_text_nodes(*child, out);
                }
            }
            None => {}
        }
    }

    pub fn text_content(&self, key: DomKey) -> String {
        self.text_nodes(key)
            .into_iter()
            .filter_map(|k| self.text(k))
            .collect()
    }

    /// Length in chars; elements count their whole text.
    pub fn text_len(&self, key: DomKey) -> usize {
        self.text_nodes(key)
            .into_iter()
            .filter_map(|k| self.text(k))
            .map(|t| t.chars().count())
            .sum()
    }

    /// Replace the value of a text node, or all children of an element with
    /// a single text node.
    pub fn set_text(&mut self, key: DomKey, text: impl Into<String>) -> DomResult<()> {
        let text = text.into();
        match &mut self.node_mut(key)?.data {
            DomData::Text(value) => {
                *value = text;
                let len = value.chars().count();
                self.clamp_selection(key, len);
                Ok(())
            }
            DomData::Element { .. } => {
                for child in self.children(key).to_vec() {
                    self.remove(child)?;
                }
                let node = self.create_text(text);
                self.append_child(key, node)
            }
        }
    }

    fn clamp_selection(&mut self, key: DomKey, len: usize) {
        if let Some(range) = self.selection.as_mut() {
            for point in [&mut range.start, &mut range.end] {
                if point.node == key {
                    point.offset = point.offset.min(len);
                }
            }
        }
    }

    /// Insert text at the selection the way a keystroke would, replacing a
    /// selected range inside a single text node. The caret ends up after the
    /// inserted text.
    pub fn type_text(&mut self, text: &str) -> DomResult<()> {
        let range = self.selection.ok_or(SurfaceError::NoSelection)?;
        let key = range.start.node;
        let current = self
            .text(key)
            .ok_or(SurfaceError::NotText(key))?
            .to_string();

        let len = current.chars().count();
        let start = range.start.offset.min(len);
        let end = if range.end.node == key {
            range.end.offset.clamp(start, len)
        } else {
            start
        };

        let mut next: String = current.chars().take(start).collect();
        next.push_str(text);
        next.extend(current.chars().skip(end));

        self.set_text(key, next)?;
        self.selection = Some(DomRange::caret(DomPoint::new(key, start + text.chars().count())));
        Ok(())
    }

    pub fn focus(&mut self, key: DomKey) -> DomResult<()> {
        self.node(key)?;
        self.focused = Some(key);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<DomKey> {
        self.focused
    }

    pub fn has_focus_within(&self, root: DomKey) -> bool {
        self.focused.is_some_and(|f| self.contains(root, f))
    }

    pub fn selection(&self) -> Option<DomRange> {
        self.selection
    }

    pub fn set_selection(&mut self, range: DomRange) -> DomResult<()> {
        for point in [range.start, range.end] {
            let len = self.point_len(point.node)?;
            if point.offset > len {
                return Err(SurfaceError::OffsetOutOfRange {
                    key: point.node,
                    offset: point.offset,
                    len,
                });
            }
        }
        self.selection = Some(range);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Largest valid offset for a boundary point in `key`.
    fn point_len(&self, key: DomKey) -> DomResult<usize> {
        let node = self.node(key)?;
        Ok(match &node.data {
            DomData::Text(text) => text.chars().count(),
            DomData::Element { .. } => node.children.len(),
        })
    }

    /// Topmost ancestor of `key`.
    pub fn root_of(&self, key: DomKey) -> DomKey {
        let mut current = key;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Char offset of `point` within the concatenated text of `root`.
    pub fn point_offset(&self, root: DomKey, point: DomPoint) -> Option<usize> {
        if !self.contains(root, point.node) {
            return None;
        }
        match self.data(point.node)? {
            DomData::Text(text) => {
                let before = self.chars_before(root, point.node)?;
                Some(before + point.offset.min(text.chars().count()))
            }
            DomData::Element { .. } => match self.children(point.node).get(point.offset) {
                Some(child) => self.chars_before(root, *child),
                None => Some(self.chars_before(root, point.node)? + self.text_len(point.node)),
            },
        }
    }

    /// Chars of the text nodes that precede `target` in document order.
    fn chars_before(&self, root: DomKey, target: DomKey) -> Option<usize> {
        fn walk(dom: &Dom, key: DomKey, target: DomKey, count: &mut usize) -> bool {
            if key == target {
                return true;
            }
            match dom.data(key) {
                Some(DomData::Text(text)) => {
                    *count += text.chars().count();
                    false
                }
                Some(DomData::Element { .. }) => dom
                    .children(key)
                    .iter()
                    .any(|child| walk(dom, *child, target, count)),
                None => false,
            }
        }

        let mut count = 0;
        walk(self, root, target, &mut count).then_some(count)
    }

    /// Text currently covered by the selection.
    pub fn range_text(&self) -> Option<String> {
        let range = self.selection?;
        let root = self.root_of(range.start.node);
        let start = self.point_offset(root, range.start)?;
        let end = self.point_offset(root, range.end)?;
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Some(
            self.text_content(root)
                .chars()
                .skip(start)
                .take(end - start)
                .collect(),
        )
    }

    pub fn inner_html(&self, key: DomKey) -> String {
        let mut out = String::new();
        for child in self.children(key) {
            self.write_html(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, key: DomKey) -> String {
        let mut out = String::new();
        self.write_html(key, &mut out);
        out
    }

    fn write_html(&self, key: DomKey, out: &mut String) {
        match self.data(key) {
            Some(DomData::Text(text)) => out.push_str(&escape_text(text)),
            Some(DomData::Element { tag, attributes }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                for child in self.children(key) {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            None => {}
        }
    }

    /// Replace the children of `key` with nodes parsed from `html`.
    ///
    /// A selection endpoint inside the old children collapses to the start
    /// of `key`, as in a browser.
    pub fn set_inner_html(&mut self, key: DomKey, html: &str) -> DomResult<()> {
        if !matches!(self.node(key)?.data, DomData::Element { .. }) {
            return Err(SurfaceError::NotAnElement(key));
        }

        let collapse_to = DomPoint::new(key, 0);
        let selection = self.selection.map(|range| {
            let fix = |p: DomPoint| {
                if self.contains(key, p.node) {
                    collapse_to
                } else {
                    p
                }
            };
            DomRange::new(fix(range.start), fix(range.end))
        });
        let refocus = self.has_focus_within(key);

        for child in self.children(key).to_vec() {
            self.detach(child)?;
            self.invalidate(child);
        }
        parse_into(self, key, html)?;

        self.selection = selection;
        if refocus {
            self.focused = Some(key);
        }
        Ok(())
    }
}
