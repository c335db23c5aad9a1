//! Rendering backends for parsed markdown documents
//!
//!     This crate turns the element tree produced by `mdpeg-parser` into
//!     concrete output: HTML fragments, LaTeX body text, groff mm input,
//!     and styled text runs for rich-text consumers.
//!
//! Architecture
//!
//!     - Format trait: uniform interface for the string-producing formats
//!     - FormatRegistry: selection of a format by name
//!     - Format implementations: one module per backend under formats/
//!     - styles: the attribute model driving the styled-run backend
//!
//!     Rendering is pure and total: a writer walks the immutable tree and
//!     appends to its output; the same document always renders to the same
//!     bytes, and an empty document renders to empty output in every
//!     backend.
//!
//!     The styled-run backend sits outside the Format trait because its
//!     output is a run sequence, not a string; see formats/styled.rs.
//!
//! The convenience entry points at the crate root (`to_html` and friends)
//! run the whole pipeline: resolve references, resolve notes, parse, and
//! render.

pub mod error;
pub mod format;
pub mod formats;
pub mod registry;
pub mod styles;

pub use error::FormatError;
pub use format::{Format, OutputFormat};
pub use formats::groff::{write_groff_mm, GroffMmFormat};
pub use formats::html::{write_html, HtmlFormat};
pub use formats::latex::{write_latex, LatexFormat};
pub use formats::styled::{write_styled, StyledRun};
pub use registry::FormatRegistry;
pub use styles::{StyleAttributes, StyleSheet};

use mdpeg_parser::{parse, resolve_notes, resolve_references, Document, Extensions};

/// Run the parsing pipeline: resolve references, resolve notes, parse.
pub fn parse_document(text: &str, extensions: Extensions) -> Document {
    let references = resolve_references(text, extensions);
    let notes = resolve_notes(text, extensions, &references);
    parse(text, extensions, &references, &notes)
}

/// Render an already parsed document in the given format.
pub fn render(doc: &Document, format: OutputFormat) -> String {
    match format {
        OutputFormat::Html => write_html(doc),
        OutputFormat::Latex => write_latex(doc),
        OutputFormat::GroffMm => write_groff_mm(doc),
    }
}

/// Parse markdown source and render it as an HTML fragment.
pub fn to_html(text: &str, extensions: Extensions) -> String {
    write_html(&parse_document(text, extensions))
}

/// Parse markdown source and render it as LaTeX body text.
pub fn to_latex(text: &str, extensions: Extensions) -> String {
    write_latex(&parse_document(text, extensions))
}

/// Parse markdown source and render it as groff mm input.
pub fn to_groff_mm(text: &str, extensions: Extensions) -> String {
    write_groff_mm(&parse_document(text, extensions))
}

/// Parse markdown source and render it as styled runs with the default
/// style sheet.
pub fn to_styled_runs(text: &str, extensions: Extensions) -> Vec<StyledRun> {
    write_styled(&parse_document(text, extensions), &StyleSheet::default())
}
