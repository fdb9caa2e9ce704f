//! Error types for the editor

use strata_model::ModelError;
use thiserror::Error;

/// Why an action was not applied.
///
/// None of these ever escape [`crate::Editor::dispatch`]; they are reported
/// as [`crate::DispatchOutcome::Ignored`] and leave the state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Action did not change the document")]
    Unchanged,

    #[error("Nothing to {0}")]
    HistoryBoundary(&'static str),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
