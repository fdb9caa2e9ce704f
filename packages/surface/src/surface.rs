//! # Editor Surface
//!
//! Mounts the block tree from [`render_tree`] under a root element. Every
//! text view gets an editable region driven by its own
//! [`SurfaceReconciler`]; containers, lists, tables, media and line breaks
//! get plain elements that are reused across syncs while their tag holds.

use crate::dom::{Dom, DomKey};
use crate::error::SurfaceError;
use crate::reconciler::{InputOutcome, RenderOutcome, SurfaceReconciler};
use crate::renderer::{render_tree, BlockView, ViewKind};
use crate::selection;
use std::collections::{BTreeMap, HashSet};
use strata_editor::{Action, ActionSink, SelectionDescription};
use strata_model::{BlockKind, ContainerNode};
use tracing::debug;

const NODE_ID_ATTR: &str = "data-node-id";

/// Counts from one [`EditorSurface::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub mounted: usize,
    pub unmounted: usize,
    pub written: usize,
    pub deferred: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct EditorSurface {
    dom: Dom,
    root: DomKey,
    regions: BTreeMap<String, SurfaceReconciler>,
    /// Elements of every non-text view
    blocks: BTreeMap<String, DomKey>,
    read_only: bool,
}

/// Element used for a leaf's region.
pub fn region_tag(kind: &BlockKind) -> &str {
    match kind {
        BlockKind::Code => "pre",
        BlockKind::ListItem | BlockKind::OrderedListItem => "li",
        BlockKind::Other(_) => "div",
        other => other.tag(),
    }
}

/// Element used for any view.
pub fn view_tag(kind: &ViewKind) -> &str {
    match kind {
        ViewKind::Table { .. } => "table",
        ViewKind::TableRow { .. } => "tr",
        ViewKind::List { list_type, .. } => list_type.tag(),
        ViewKind::FlexRow { .. } | ViewKind::Container { .. } => "div",
        ViewKind::LineBreak => "br",
        ViewKind::Media { kind, .. } => kind.tag(),
        ViewKind::Text { kind, .. } => region_tag(kind),
    }
}

fn set_optional_attribute(
    dom: &mut Dom,
    element: DomKey,
    name: &str,
    value: Option<&str>,
) -> Result<(), SurfaceError> {
    match value {
        Some(value) => dom.set_attribute(element, name, value),
        None => dom.remove_attribute(element, name),
    }
}

fn flag(value: bool) -> Option<&'static str> {
    value.then_some("true")
}

impl EditorSurface {
    pub fn new(read_only: bool) -> Self {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        Self {
            dom,
            root,
            regions: BTreeMap::new(),
            blocks: BTreeMap::new(),
            read_only,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Direct DOM access, as the user's keyboard has.
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn root_element(&self) -> DomKey {
        self.root
    }

    pub fn html(&self) -> String {
        self.dom.inner_html(self.root)
    }

    /// Element mounted for `node_id`, editable or not.
    pub fn element(&self, node_id: &str) -> Option<DomKey> {
        self.regions
            .get(node_id)
            .map(SurfaceReconciler::element)
            .or_else(|| self.blocks.get(node_id).copied())
    }

    pub fn reconciler(&self, node_id: &str) -> Option<&SurfaceReconciler> {
        self.regions.get(node_id)
    }

    /// Ids of the editable regions in document order.
    pub fn mounted_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_regions(self.root, &mut out);
        out
    }

    fn collect_regions<'a>(&'a self, key: DomKey, out: &mut Vec<&'a str>) {
        for &child in self.dom.children(key) {
            match self.dom.attribute(child, NODE_ID_ATTR) {
                Some(id) if self.regions.contains_key(id) => out.push(id),
                _ => self.collect_regions(child, out),
            }
        }
    }

    fn region_mut(&mut self, node_id: &str) -> Result<&mut SurfaceReconciler, SurfaceError> {
        self.regions
            .get_mut(node_id)
            .ok_or_else(|| SurfaceError::NotMounted(node_id.to_string()))
    }

    /// Bring the mounted tree in line with `root`.
    pub fn sync(&mut self, root: &ContainerNode) -> Result<SyncReport, SurfaceError> {
        let view = render_tree(root, self.read_only);
        self.sync_view(&view)
    }

    /// Mount a view tree whose top is the document root.
    pub fn sync_view(&mut self, view: &BlockView) -> Result<SyncReport, SurfaceError> {
        let mut report = SyncReport::default();
        let mut seen = HashSet::new();

        self.dom
            .set_attribute(self.root, NODE_ID_ATTR, view.node_id.as_str())?;
        for child in view.children() {
            // appending moves the element, so this also restores document order
            self.mount(child, self.root, &mut seen, &mut report)?;
        }

        let gone: Vec<String> = self
            .regions
            .keys()
            .chain(self.blocks.keys())
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            self.unmount(&id)?;
            report.unmounted += 1;
        }

        debug!(?report, "surface synced");
        Ok(report)
    }

    fn mount(
        &mut self,
        view: &BlockView,
        parent: DomKey,
        seen: &mut HashSet<String>,
        report: &mut SyncReport,
    ) -> Result<(), SurfaceError> {
        seen.insert(view.node_id.clone());
        match &view.kind {
            ViewKind::Text {
                markup,
                class_name,
                placeholder,
                ..
            } => {
                let element = self.mount_region(view, report)?;
                self.dom.append_child(parent, element)?;
                set_optional_attribute(&mut self.dom, element, "class", class_name.as_deref())?;
                set_optional_attribute(
                    &mut self.dom,
                    element,
                    "data-placeholder",
                    placeholder.as_deref(),
                )?;

                let region = self
                    .regions
                    .get_mut(&view.node_id)
                    .ok_or_else(|| SurfaceError::NotMounted(view.node_id.clone()))?;
                let outcome = region.render_markup(&mut self.dom, markup)?;
                match outcome {
                    RenderOutcome::Written => report.written += 1,
                    RenderOutcome::Deferred => report.deferred += 1,
                    RenderOutcome::Skipped => report.skipped += 1,
                    RenderOutcome::Unchanged => {}
                }
            }
            kind => {
                let element = self.mount_block(view, report)?;
                self.dom.append_child(parent, element)?;
                self.decorate(element, kind)?;
                for child in view.children() {
                    self.mount(child, element, seen, report)?;
                }
            }
        }
        Ok(())
    }

    /// Region for a text view, remounted when its tag changes.
    fn mount_region(&mut self, view: &BlockView, report: &mut SyncReport) -> Result<DomKey, SurfaceError> {
        let tag = view_tag(&view.kind);
        let id = view.node_id.as_str();

        if self.blocks.contains_key(id) {
            self.unmount(id)?;
            report.unmounted += 1;
        }
        let stale = self
            .regions
            .get(id)
            .is_some_and(|r| self.dom.tag(r.element()) != Some(tag));
        if stale {
            self.unmount(id)?;
            report.unmounted += 1;
        }

        if let Some(region) = self.regions.get(id) {
            return Ok(region.element());
        }
        let element = self.dom.create_element(tag);
        let reconciler = SurfaceReconciler::new(&mut self.dom, element, id, self.read_only)?;
        self.regions.insert(id.to_string(), reconciler);
        report.mounted += 1;
        Ok(element)
    }

    /// Element for a non-text view. A tag change swaps the element and
    /// carries its children over so their regions survive.
    fn mount_block(&mut self, view: &BlockView, report: &mut SyncReport) -> Result<DomKey, SurfaceError> {
        let tag = view_tag(&view.kind);
        let id = view.node_id.as_str();

        if self.regions.contains_key(id) {
            self.unmount(id)?;
            report.unmounted += 1;
        }

        let existing = self.blocks.get(id).copied();
        if let Some(element) = existing {
            if self.dom.tag(element) == Some(tag) {
                return Ok(element);
            }
        }

        let element = self.dom.create_element(tag);
        self.dom.set_attribute(element, NODE_ID_ATTR, id)?;
        if let Some(old) = existing.filter(|old| self.dom.is_live(*old)) {
            for child in self.dom.children(old).to_vec() {
                self.dom.append_child(element, child)?;
            }
            self.dom.remove(old)?;
            report.unmounted += 1;
        }
        self.blocks.insert(id.to_string(), element);
        report.mounted += 1;
        Ok(element)
    }

    fn decorate(&mut self, element: DomKey, kind: &ViewKind) -> Result<(), SurfaceError> {
        match kind {
            ViewKind::FlexRow { .. } => self.dom.set_attribute(element, "class", "flex-row"),
            ViewKind::Media {
                src,
                alt,
                loading,
                error,
                ..
            } => {
                set_optional_attribute(&mut self.dom, element, "src", src.as_deref())?;
                set_optional_attribute(&mut self.dom, element, "alt", alt.as_deref())?;
                set_optional_attribute(&mut self.dom, element, "data-loading", flag(*loading))?;
                set_optional_attribute(&mut self.dom, element, "data-error", flag(*error))
            }
            _ => Ok(()),
        }
    }

    fn unmount(&mut self, node_id: &str) -> Result<(), SurfaceError> {
        let element = match self.regions.remove(node_id) {
            Some(region) => Some(region.element()),
            None => self.blocks.remove(node_id),
        };
        // an ancestor that went first already took this element with it
        if let Some(element) = element.filter(|el| self.dom.is_live(*el)) {
            self.dom.remove(element)?;
        }
        Ok(())
    }

    /// Focus a region and make its leaf the active node.
    pub fn focus(&mut self, node_id: &str, sink: &mut impl ActionSink) -> Result<(), SurfaceError> {
        let element = self
            .regions
            .get(node_id)
            .map(SurfaceReconciler::element)
            .ok_or_else(|| SurfaceError::NotMounted(node_id.to_string()))?;
        self.dom.focus(element)?;
        sink.dispatch_action(Action::SetActiveNode {
            id: Some(node_id.to_string()),
        });
        Ok(())
    }

    pub fn handle_input(
        &mut self,
        node_id: &str,
        sink: &mut impl ActionSink,
    ) -> Result<InputOutcome, SurfaceError> {
        let region = self
            .regions
            .get_mut(node_id)
            .ok_or_else(|| SurfaceError::NotMounted(node_id.to_string()))?;
        Ok(region.handle_input(&self.dom, sink))
    }

    pub fn composition_start(&mut self, node_id: &str) -> Result<(), SurfaceError> {
        self.region_mut(node_id)?.composition_start();
        Ok(())
    }

    pub fn composition_end(&mut self, node_id: &str) -> Result<RenderOutcome, SurfaceError> {
        let region = self
            .regions
            .get_mut(node_id)
            .ok_or_else(|| SurfaceError::NotMounted(node_id.to_string()))?;
        region.composition_end(&mut self.dom)
    }

    /// Selection of the focused region, as offsets into its text.
    pub fn selection_description(&self) -> Option<SelectionDescription> {
        let region = self
            .regions
            .values()
            .find(|r| self.dom.has_focus_within(r.element()))?;
        let saved = selection::save(&self.dom, region.element())?;
        Some(SelectionDescription {
            node_id: region.node_id().to_string(),
            selection: saved,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Toggle editability; markup differences show up on the next sync.
    pub fn set_read_only(&mut self, read_only: bool) -> Result<(), SurfaceError> {
        self.read_only = read_only;
        for region in self.regions.values_mut() {
            region.set_read_only(&mut self.dom, read_only)?;
        }
        Ok(())
    }
}
