//! # Strata Surface
//!
//! Editable view of a document: an in-memory DOM, the markup each leaf
//! renders to, the selection codec and the reconciler that keeps regions in
//! sync with the engine without clobbering the user's typing.
//!
//! ## Flow
//!
//! ```text
//! Editor snapshot ──render_tree──→ BlockView
//!                                     │
//!                 EditorSurface::sync_view: element per view,
//!                                     │  SurfaceReconciler per text view
//!                                     │  build_markup → Dom::set_inner_html
//!                                     │  selection save/restore
//!                                     ↓
//! user input ──handle_input──→ read_leaf_body → Action::UpdateNode → Editor
//! ```

pub mod dom;
pub mod error;
pub mod markup;
pub mod markup_lexer;
pub mod reconciler;
pub mod renderer;
pub mod selection;
pub mod surface;

pub use dom::{Dom, DomData, DomKey, DomPoint, DomRange};
pub use error::SurfaceError;
pub use markup::{body_markup, build_markup, escape_text, read_leaf_body, unescape};
pub use reconciler::{InputOutcome, ReconcileState, RenderOutcome, SurfaceReconciler};
pub use renderer::{render_node, render_tree, BlockView, ViewKind};
pub use surface::{region_tag, view_tag, EditorSurface, SyncReport};
