//! Static HTML export of Strata documents.
//!
//! The exported markup is what a read-only surface shows, minus the editing
//! attributes: containers become `div`s, derived lists become `ul`/`ol`,
//! table layouts become real tables and each leaf keeps its semantic tag.

mod compiler;

pub use compiler::{compile_to_html, CompileError, CompileOptions};

#[cfg(test)]
mod tests;
