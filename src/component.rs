//! Component types - the uniform output model
//!
//! Every grammar is mapped onto seven component kinds:
//! - `Import`: import, include, use
//! - `TopLevelDeclaration`: module-level variables, constants, macros, packages
//! - `TypeDefinition`: class, struct, interface, enum, trait, impl
//! - `Method`: function nested directly under a type definition
//! - `Function`: free function
//! - `Comment`: standalone comment or documentation block
//! - `Other`: region the parser could not interpret

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Semantic category of a component, independent of any grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Import, include, use, require
    Import,
    /// Variable, constant, macro, package clause at module level
    #[serde(rename = "declaration")]
    TopLevelDeclaration,
    /// Class, struct, interface, enum, trait, impl, type alias
    #[serde(rename = "type")]
    TypeDefinition,
    /// Function nested under a type definition
    Method,
    /// Free function
    Function,
    /// Standalone comment or docstring
    Comment,
    /// Parser error region
    Other,
}

impl ComponentKind {
    /// Get the string representation of the component kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Import => "import",
            ComponentKind::TopLevelDeclaration => "declaration",
            ComponentKind::TypeDefinition => "type",
            ComponentKind::Method => "method",
            ComponentKind::Function => "function",
            ComponentKind::Comment => "comment",
            ComponentKind::Other => "other",
        }
    }

    /// Get all component kinds
    pub fn all() -> &'static [ComponentKind] {
        &[
            ComponentKind::Import,
            ComponentKind::TopLevelDeclaration,
            ComponentKind::TypeDefinition,
            ComponentKind::Method,
            ComponentKind::Function,
            ComponentKind::Comment,
            ComponentKind::Other,
        ]
    }
}

impl FromStr for ComponentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "import" | "include" | "use" | "require" => Ok(ComponentKind::Import),
            "declaration" | "decl" | "toplevel" | "top_level_declaration" | "var" | "const" => {
                Ok(ComponentKind::TopLevelDeclaration)
            }
            "type" | "typedefinition" | "type_definition" | "class" | "struct" | "interface"
            | "enum" | "trait" => Ok(ComponentKind::TypeDefinition),
            "method" => Ok(ComponentKind::Method),
            "function" | "fn" | "func" | "def" => Ok(ComponentKind::Function),
            "comment" | "doc" => Ok(ComponentKind::Comment),
            "other" | "error" => Ok(ComponentKind::Other),
            _ => Err(Error::InvalidConfig(format!("Unknown component kind: {}", s))),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Half-open byte range `[start, end)` into the owning document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, other: &ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Inclusive, 1-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One unit of segmentation output.
///
/// Components copy ranges out of the syntax tree and never hold node
/// handles, so a component list outlives the tree it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    /// Declared identifier, when the grammar exposes one
    pub name: Option<String>,
    pub bytes: ByteRange,
    pub lines: LineRange,
    /// Nesting level, 0 for top-level
    pub depth: usize,
    /// Index of the enclosing component in the same list
    pub parent: Option<usize>,
    /// Preceding comment block attached to this component
    pub leading_comment: Option<ByteRange>,
    /// Grammar-specific node kind, kept for diagnostics
    pub node_kind: String,
}

impl Component {
    pub fn new(kind: ComponentKind, bytes: ByteRange, lines: LineRange) -> Self {
        Self {
            kind,
            name: None,
            bytes,
            lines,
            depth: 0,
            parent: None,
            leading_comment: None,
            node_kind: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: usize, depth: usize) -> Self {
        self.parent = Some(parent);
        self.depth = depth;
        self
    }

    pub fn with_leading_comment(mut self, range: ByteRange) -> Self {
        self.leading_comment = Some(range);
        self
    }

    pub fn with_node_kind(mut self, node_kind: impl Into<String>) -> Self {
        self.node_kind = node_kind.into();
        self
    }

    /// Range from the start of the leading comment (if any) to the end of the component
    pub fn extended_range(&self) -> ByteRange {
        match self.leading_comment {
            Some(comment) => ByteRange::new(comment.start.min(self.bytes.start), self.bytes.end),
            None => self.bytes,
        }
    }

    /// Human-readable label: `kind name` or just `kind`
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.kind, name),
            None => self.kind.to_string(),
        }
    }
}
