//! Error types for the node model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
