//! Format trait definition
//!
//! This module defines the core trait that all text output formats
//! implement. The trait provides a uniform interface for turning a parsed
//! document into a rendered string; the styled-run backend has its own API
//! in [`crate::formats::styled`] because its output is not a string.

use crate::error::FormatError;
use mdpeg_parser::Document;

/// Trait for text output formats
///
/// Implementors render a Document into one concrete markup language.
/// Rendering is pure: the same document always produces the same string.
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "html", "latex", "groff-mm")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// Render a document into this format
    ///
    /// Default implementation returns NotSupported error.
    /// Formats that support rendering should override this method.
    fn render(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support rendering",
            self.name()
        )))
    }
}

/// The built-in text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Latex,
    GroffMm,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Latex => "latex",
            OutputFormat::GroffMm => "groff-mm",
        }
    }
}
