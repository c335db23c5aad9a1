//! # mdpeg-parser
//!
//! A markdown parser built as an ordered-choice (PEG-style) recognizer.
//!
//! The pipeline is strictly sequential: resolve link-reference definitions,
//! resolve footnote definitions (footnote bodies may themselves contain
//! links, so they get the reference table), then parse the document into a
//! typed element tree. Rendering lives in a separate crate and may walk the
//! same tree any number of times; nothing here is mutated after parsing.
//!
//! The grammar is total: there is no parse-error outcome. Input that fails
//! every applicable rule degrades to literal text, so `parse` always returns
//! a valid tree for any finite input, including the empty string.
//!
//! For the testing conventions used throughout the crate, see the
//! integration tests under `tests/`.

#![allow(rustdoc::invalid_html_tags)]

pub mod markdown;

pub use markdown::{
    parse, resolve_notes, resolve_references, text_of, Document, Element, Extensions, HeadingLevel,
    Link, NoteTable, ReferenceTable,
};
