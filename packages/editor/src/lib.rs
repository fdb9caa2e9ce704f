//! # Strata Editor
//!
//! Mutation engine for block documents: actions, a pure reducer and a
//! snapshot history with undo/redo.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ surface: DOM input → Action                 │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor::dispatch                    │
//! │  - reduce(state, action) → state'           │
//! │  - validate before any write                │
//! │  - commit snapshot / move history index     │
//! │  - notify on_change                         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: ContainerNode snapshot (shared Arcs) │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots are values**: a committed tree is never written to again
//! 2. **Dispatch never fails**: rejected actions leave the state as it was
//! 3. **Uploads are actions**: async work ends in an ordinary dispatch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strata_editor::{Action, Editor, EditorConfig};
//! use strata_model::{Position, TextNode};
//!
//! let mut editor = Editor::new(strata_model::default_document(), EditorConfig::default())?;
//!
//! editor.dispatch(Action::insert(
//!     TextNode::paragraph("p2", "Hello"),
//!     "block-1",
//!     Position::After,
//! ));
//! editor.dispatch(Action::Undo);
//! ```

mod actions;
mod config;
mod errors;
mod history;
mod reducer;
mod selection;
mod store;
pub mod upload;

pub use actions::{Action, NodeUpdate, COVER_ERROR_KEY, COVER_IMAGE_KEY};
pub use config::EditorConfig;
pub use errors::{ActionError, EditorError};
pub use history::{EditorState, DEFAULT_HISTORY_LIMIT};
pub use reducer::{apply, reduce, ReduceResult};
pub use selection::{SelectionDescription, SerializedSelection};
pub use store::{ActionSink, ChangeListener, DispatchOutcome, Editor};
pub use upload::{UploadError, UploadFile, Uploader};

// Re-export model types used in the public API
pub use strata_model::{ContainerNode, Node, Position, TextNode};
