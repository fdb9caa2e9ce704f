//! # Surface Reconciler
//!
//! Keeps one editable region equal to `build_markup` of its leaf.
//!
//! ```text
//!            composition_start
//!   ┌──────┐ ─────────────────→ ┌───────────┐
//!   │ Idle │                    │ Composing │   render → deferred
//!   └──────┘ ←───────────────── └───────────┘
//!     │  ↑     composition_end (pending write runs now)
//!     │  │
//!     │  │ next render: skipped if it matches the region, else written
//!     ↓  │
//!   ┌─────────────────────┐
//!   │ PreservingSelection │   entered on input that committed
//!   └─────────────────────┘
//! ```
//!
//! A render while idle saves the selection (if the region has focus),
//! overwrites the region and restores the selection. Restore failures are
//! logged and dropped.

use crate::dom::{Dom, DomKey, DomResult};
use crate::markup::{build_markup, read_leaf_body};
use crate::selection;
use strata_editor::{Action, ActionSink};
use strata_model::TextNode;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Idle,
    Composing,
    /// The region already shows what the engine just committed
    PreservingSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Written,
    Unchanged,
    /// Held back until composition ends
    Deferred,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Forwarded,
    /// The region's body equals the stored one
    Unchanged,
    ReadOnly,
}

#[derive(Debug)]
pub struct SurfaceReconciler {
    node_id: String,
    element: DomKey,
    state: ReconcileState,
    read_only: bool,
    pending: Option<String>,
}

impl SurfaceReconciler {
    /// Take over `element` as the editable region of `node_id`.
    pub fn new(dom: &mut Dom, element: DomKey, node_id: impl Into<String>, read_only: bool) -> DomResult<Self> {
        let node_id = node_id.into();
        dom.set_attribute(element, "data-node-id", node_id.as_str())?;
        let mut reconciler = Self {
            node_id,
            element,
            state: ReconcileState::Idle,
            read_only,
            pending: None,
        };
        reconciler.set_read_only(dom, read_only)?;
        Ok(reconciler)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn element(&self) -> DomKey {
        self.element
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, dom: &mut Dom, read_only: bool) -> DomResult<()> {
        self.read_only = read_only;
        let editable = if read_only { "false" } else { "true" };
        dom.set_attribute(self.element, "contenteditable", editable)
    }

    /// Bring the region in line with `node`.
    pub fn render(&mut self, dom: &mut Dom, node: &TextNode) -> DomResult<RenderOutcome> {
        let markup = build_markup(node, self.read_only);
        self.render_markup(dom, &markup)
    }

    /// Bring the region in line with markup already built for its leaf.
    pub fn render_markup(&mut self, dom: &mut Dom, markup: &str) -> DomResult<RenderOutcome> {
        match self.state {
            ReconcileState::Composing => {
                self.pending = Some(markup.to_string());
                Ok(RenderOutcome::Deferred)
            }
            ReconcileState::PreservingSelection => {
                self.state = ReconcileState::Idle;
                // only the echo of the user's own edit is skipped
                if dom.inner_html(self.element) == markup {
                    debug!(node_id = %self.node_id, "render skipped after input");
                    return Ok(RenderOutcome::Skipped);
                }
                self.write(dom, markup)
            }
            ReconcileState::Idle => self.write(dom, markup),
        }
    }

    fn write(&mut self, dom: &mut Dom, markup: &str) -> DomResult<RenderOutcome> {
        if dom.inner_html(self.element) == markup {
            return Ok(RenderOutcome::Unchanged);
        }

        let saved = if dom.has_focus_within(self.element) {
            selection::save(dom, self.element)
        } else {
            None
        };

        dom.set_inner_html(self.element, markup)?;

        if let Some(saved) = saved {
            if let Err(err) = selection::restore(dom, self.element, &saved) {
                warn!(node_id = %self.node_id, error = %err, "could not restore selection");
            }
        }
        Ok(RenderOutcome::Written)
    }

    pub fn composition_start(&mut self) {
        self.state = ReconcileState::Composing;
    }

    /// Leave composition and run any render that was held back.
    pub fn composition_end(&mut self, dom: &mut Dom) -> DomResult<RenderOutcome> {
        if self.state != ReconcileState::Composing {
            return Ok(RenderOutcome::Unchanged);
        }
        self.state = ReconcileState::Idle;
        match self.pending.take() {
            Some(markup) => self.write(dom, &markup),
            None => Ok(RenderOutcome::Unchanged),
        }
    }

    /// Forward what the user typed into the region to the engine.
    ///
    /// While composing the text is forwarded but the region stays untouched
    /// until composition ends.
    pub fn handle_input(&mut self, dom: &Dom, sink: &mut impl ActionSink) -> InputOutcome {
        if self.read_only {
            return InputOutcome::ReadOnly;
        }

        let body = read_leaf_body(dom, self.element);
        let action = Action::update_body(self.node_id.as_str(), body);

        if self.state == ReconcileState::Composing {
            return if sink.dispatch_action(action) {
                InputOutcome::Forwarded
            } else {
                InputOutcome::Unchanged
            };
        }

        self.state = ReconcileState::PreservingSelection;
        if sink.dispatch_action(action) {
            InputOutcome::Forwarded
        } else {
            // nothing committed, so no render is coming to skip
            self.state = ReconcileState::Idle;
            InputOutcome::Unchanged
        }
    }
}
