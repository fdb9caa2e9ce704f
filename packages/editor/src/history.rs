//! # Editor State and History
//!
//! The state is a list of whole-document snapshots plus an index pointing
//! at the active one.
//!
//! ## Design
//!
//! - A committed change truncates everything after the index, appends the
//!   new snapshot and moves the index to it
//! - Undo/redo only move the index; the list itself is left alone
//! - Snapshots share unchanged subtrees, so keeping many of them is cheap
//! - Optional limit: the oldest snapshot is dropped once it is exceeded
//!
//! ```text
//!  history: [s0] [s1] [s2] [s3]
//!                      ^ index        commit(s4) → [s0] [s1] [s2] [s4]
//! ```

use std::sync::Arc;
use strata_model::{ensure_unique_ids, ContainerNode, ModelError, NodeRef};

/// Default number of snapshots kept (0 = unlimited)
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct EditorState {
    history: Vec<Arc<ContainerNode>>,
    history_index: usize,
    active_node_id: Option<String>,
    history_limit: usize,
}

impl EditorState {
    /// Create the state for a freshly mounted document.
    pub fn new(container: ContainerNode) -> Result<Self, ModelError> {
        ensure_unique_ids(&container)?;
        Ok(Self {
            history: vec![Arc::new(container)],
            history_index: 0,
            active_node_id: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.trim();
        self
    }

    /// Active snapshot.
    pub fn current(&self) -> &Arc<ContainerNode> {
        &self.history[self.history_index]
    }

    pub fn history(&self) -> &[Arc<ContainerNode>] {
        &self.history
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn active_node_id(&self) -> Option<&str> {
        self.active_node_id.as_deref()
    }

    /// The active node, if its id still resolves.
    pub fn active_node(&self) -> Option<NodeRef<'_>> {
        self.active_node_id
            .as_deref()
            .and_then(|id| self.current().find(id))
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    /// New state with `next` appended after the active snapshot.
    pub(crate) fn commit(&self, next: Arc<ContainerNode>) -> EditorState {
        let mut history = self.history[..=self.history_index].to_vec();
        history.push(next);

        let mut state = EditorState {
            history_index: history.len() - 1,
            history,
            active_node_id: self.active_node_id.clone(),
            history_limit: self.history_limit,
        };
        state.trim();
        state
    }

    pub(crate) fn with_index(&self, history_index: usize) -> EditorState {
        EditorState {
            history: self.history.clone(),
            history_index: history_index.min(self.history.len() - 1),
            active_node_id: self.active_node_id.clone(),
            history_limit: self.history_limit,
        }
    }

    pub(crate) fn with_active_node(&self, id: Option<String>) -> EditorState {
        EditorState {
            history: self.history.clone(),
            history_index: self.history_index,
            active_node_id: id,
            history_limit: self.history_limit,
        }
    }

    fn trim(&mut self) {
        if self.history_limit == 0 {
            return;
        }
        // never drop the snapshot the index points at
        while self.history.len() > self.history_limit.max(1) && self.history_index > 0 {
            self.history.remove(0);
            self.history_index -= 1;
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            history: vec![Arc::new(strata_model::default_document())],
            history_index: 0,
            active_node_id: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_model::TextNode;

    fn doc(text: &str) -> Arc<ContainerNode> {
        Arc::new(ContainerNode::new("root").with_child(TextNode::paragraph("p", text)))
    }

    #[test]
    fn test_state_creation() {
        let state = EditorState::new(ContainerNode::new("root")).unwrap();
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history_index(), 0);
        assert!(!state.can_undo());
        assert!(!state.can_redo());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let container = ContainerNode::new("root")
            .with_child(TextNode::paragraph("p", "a"))
            .with_child(TextNode::paragraph("p", "b"));
        assert!(matches!(EditorState::new(container), Err(ModelError::DuplicateId(_))));
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let state = EditorState::default()
            .commit(doc("1"))
            .commit(doc("2"))
            .with_index(1);
        assert!(state.can_redo());

        let state = state.commit(doc("3"));
        assert_eq!(state.history().len(), 3);
        assert_eq!(state.history_index(), 2);
        assert!(!state.can_redo());
        assert_eq!(state.current().find("p").unwrap().as_leaf().unwrap().plain_text(), "3");
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut state = EditorState::default().with_history_limit(3);
        for i in 0..5 {
            state = state.commit(doc(&i.to_string()));
        }
        assert_eq!(state.history().len(), 3);
        assert_eq!(state.history_index(), 2);
        assert_eq!(state.current().find("p").unwrap().as_leaf().unwrap().plain_text(), "4");
    }

    #[test]
    fn test_dangling_active_node_is_tolerated() {
        let state = EditorState::default().with_active_node(Some("gone".into()));
        assert_eq!(state.active_node_id(), Some("gone"));
        assert!(state.active_node().is_none());
    }
}
