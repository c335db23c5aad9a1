//! Error types for rendering operations

use std::fmt;

/// Errors that can occur when selecting or driving an output format
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// No format registered under the requested name
    FormatNotFound(String),
    /// The format exists but does not support the requested operation
    NotSupported(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => {
                write!(f, "Format not found: {}", name)
            }
            FormatError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
