//! # Editor Store
//!
//! Owns the single [`EditorState`] of a mounted editor. Everything the host
//! and the surface do to a document goes through [`Editor::dispatch`].
//!
//! Dispatch never fails: an action the reducer rejects is reported as
//! [`DispatchOutcome::Ignored`] and the state keeps its identity.

use crate::actions::Action;
use crate::config::EditorConfig;
use crate::errors::{ActionError, EditorError};
use crate::history::EditorState;
use crate::reducer::reduce;
use crate::selection::SelectionDescription;
use std::fmt;
use std::sync::Arc;
use strata_model::{ContainerNode, NodeRef};
use tracing::debug;

/// What a dispatch did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new snapshot was appended
    Committed { history_index: usize },
    /// Undo or redo moved the index
    Moved { history_index: usize },
    /// Non-document state changed (active node)
    Updated,
    Ignored(ActionError),
}

impl DispatchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, DispatchOutcome::Committed { .. })
    }

    /// Whether the active snapshot is a different one than before.
    pub fn changed_document(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Committed { .. } | DispatchOutcome::Moved { .. }
        )
    }
}

/// Anything that accepts actions; implemented by [`Editor`].
///
/// Returns whether the action changed the document.
pub trait ActionSink {
    fn dispatch_action(&mut self, action: Action) -> bool;
}

pub type ChangeListener = Box<dyn FnMut(&EditorState)>;

pub struct Editor {
    state: EditorState,
    config: EditorConfig,
    selection: Option<SelectionDescription>,
    on_change: Option<ChangeListener>,
    version: u64,
}

impl Editor {
    pub fn new(container: ContainerNode, config: EditorConfig) -> Result<Self, EditorError> {
        let state = EditorState::new(container)?.with_history_limit(config.history_limit);
        Ok(Self {
            state,
            config,
            selection: None,
            on_change: None,
            version: 0,
        })
    }

    /// Mount a document given as JSON.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, EditorError> {
        let container = ContainerNode::from_json(json)?;
        Self::new(container, config)
    }

    /// Called after every dispatch that changes the active snapshot.
    pub fn on_change(&mut self, listener: impl FnMut(&EditorState) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        let outcome = match reduce(&self.state, &action) {
            Ok(next) => {
                let outcome = match action {
                    Action::Undo | Action::Redo => DispatchOutcome::Moved {
                        history_index: next.history_index(),
                    },
                    Action::SetActiveNode { .. } => DispatchOutcome::Updated,
                    _ => DispatchOutcome::Committed {
                        history_index: next.history_index(),
                    },
                };
                self.state = next;
                outcome
            }
            Err(err) => DispatchOutcome::Ignored(err),
        };

        match &outcome {
            DispatchOutcome::Ignored(reason) => {
                debug!(action = action.name(), %reason, "action ignored");
            }
            DispatchOutcome::Committed { history_index } | DispatchOutcome::Moved { history_index } => {
                self.version += 1;
                debug!(action = action.name(), history_index, "action applied");
                if let Some(listener) = self.on_change.as_mut() {
                    listener(&self.state);
                }
            }
            DispatchOutcome::Updated => {
                debug!(action = action.name(), "active node changed");
            }
        }
        outcome
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn container(&self) -> &Arc<ContainerNode> {
        self.state.current()
    }

    pub fn active_node_id(&self) -> Option<&str> {
        self.state.active_node_id()
    }

    pub fn active_node(&self) -> Option<NodeRef<'_>> {
        self.state.active_node()
    }

    pub fn selection(&self) -> Option<&SelectionDescription> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<SelectionDescription>) {
        self.selection = selection;
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
    }

    /// Bumped every time the active snapshot changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.container().to_json_pretty()?)
    }
}

impl ActionSink for Editor {
    fn dispatch_action(&mut self, action: Action) -> bool {
        self.dispatch(action).changed_document()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            state: EditorState::default(),
            config: EditorConfig::default(),
            selection: None,
            on_change: None,
            version: 0,
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("history_index", &self.state.history_index())
            .field("history_len", &self.state.history().len())
            .field("config", &self.config)
            .field("version", &self.version)
            .finish()
    }
}
