//! The markdown engine: element tree, extension flags, resolution passes,
//! and the ordered-choice grammar.

pub mod ast;
pub mod extensions;
pub mod notes;
pub mod peg;
pub mod references;

pub use ast::{text_of, Document, Element, HeadingLevel, Link};
pub use extensions::Extensions;
pub use notes::{resolve_notes, NoteDef, NoteTable};
pub use peg::parse;
pub use references::{normalize_label, resolve_references, ReferenceDef, ReferenceTable};
