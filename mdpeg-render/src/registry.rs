//! Format registry for format discovery and selection
//!
//! Provides a centralized registry for the available output formats, so
//! callers can pick one by name (for example from a command-line argument)
//! without matching on format types themselves.

use crate::error::FormatError;
use crate::format::Format;
use crate::formats::groff::GroffMmFormat;
use crate::formats::html::HtmlFormat;
use crate::formats::latex::LatexFormat;
use std::collections::HashMap;

/// Registry of output formats
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// A registry with every built-in format registered.
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register(HtmlFormat);
        registry.register(LatexFormat);
        registry.register(GroffMmFormat);
        registry
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Names of all registered formats, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtin_formats()
    }
}
