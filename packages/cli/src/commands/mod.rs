pub mod export;
pub mod init;
pub mod inspect;
pub mod replay;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::{Context, Result};
use std::path::Path;
use strata_model::ContainerNode;

/// Read a document JSON file.
pub fn load_document(path: &Path) -> Result<ContainerNode> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    ContainerNode::from_json(&content).with_context(|| format!("Invalid document {}", path.display()))
}
