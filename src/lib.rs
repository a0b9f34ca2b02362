//! # Codesplit - grammar-driven source segmentation
//!
//! Splits a source file into its structural components (imports, top-level
//! declarations, types, methods, functions, comments) exactly where the
//! language's own grammar puts the boundaries.
//!
//! Codesplit provides:
//! - Pluggable tree-sitter grammar adapters behind one language-agnostic walker
//! - Leading comment attachment under a configurable blank-line threshold
//! - A flat, ordered component list with index-based parent links
//! - Record and text-slice formatters that reassemble the document losslessly

pub mod document;
pub mod component;
pub mod adapter;
pub mod parser;
pub mod walker;
pub mod attach;
pub mod assembler;
pub mod segment;
pub mod output;
pub mod config;
pub mod discover;
pub mod ui;

use std::sync::OnceLock;

// Re-exports for convenient access
pub use adapter::{GrammarAdapter, LanguageRegistry, default_registry};
pub use component::{ByteRange, Component, ComponentKind, LineRange};
pub use document::SourceDocument;
pub use segment::{SegmentOptions, Segmentation, Segmenter};

/// Result type alias for Codesplit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Codesplit operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unparsable document: {0}")]
    UnparsableDocument(String),

    /// The assembled component list broke one of its structural guarantees.
    /// The offending list is kept for diagnostics.
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        message: String,
        components: Vec<Component>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn unsupported(language: impl Into<String>) -> Self {
        Error::UnsupportedLanguage(language.into())
    }

    pub fn unparsable(reason: impl Into<String>) -> Self {
        Error::UnparsableDocument(reason.into())
    }

    /// True for errors that point at a defect rather than at bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::InvariantViolation { .. })
    }
}

static DEFAULT_SEGMENTER: OnceLock<Segmenter> = OnceLock::new();

/// Segment `source` with the built-in language registry.
///
/// `language` may be a language name (`python`), an alias (`py`), or a file
/// extension with or without the leading dot.
pub fn segment(source: &[u8], language: &str, options: &SegmentOptions) -> Result<Vec<Component>> {
    DEFAULT_SEGMENTER
        .get_or_init(Segmenter::default)
        .segment(source, language, options)
}
