//! Grammar Adapter Framework
//!
//! Each language provides a tree-sitter grammar and a mapping from its node
//! kinds onto the uniform `ComponentKind` model. The walker never sees
//! language-specific logic.

pub mod framework;
pub mod c;
pub mod cpp;
pub mod python;
pub mod javascript;
pub mod typescript;
pub mod java;
pub mod rust;
pub mod go;

pub use framework::{
    Classification, GrammarAdapter, LanguageRegistry, Scope, SyntaxUnit, default_registry,
};
