//! AST definitions and utilities for parsed markdown documents.
//!
//!     The element tree is the contract between the parser and every
//!     rendering backend. Each node is one variant of [`Element`], carrying
//!     only the fields its kind needs; container kinds own their children as
//!     ordered vectors, so sibling order is part of the tree itself and
//!     destruction is structural (no free routines anywhere).
//!
//! Ownership
//!
//!     Every node produced by the parser is reachable from exactly one
//!     parent. Link and image nodes own their label subtree through the
//!     [`Link`] descriptor; footnote references own a clone of the
//!     resolved note content, so renderers never consult the resolver tables.
//!
//! Modules
//!
//! - `element` - the node type definitions
//! - `snapshot` - a plain-text tree rendering used by tests and debugging

pub mod element;
pub mod snapshot;

pub use element::{text_of, Document, Element, HeadingLevel, Link};
pub use snapshot::tree_string;
