//! Rust grammar adapter
//!
//! Outer attributes (`#[...]`) are siblings of the item they decorate and
//! are glued onto it. Inline modules and `extern` blocks are structural;
//! `impl` and `trait` bodies hold methods.

use super::framework::{Classification, GrammarAdapter, Scope, field_text, named_child_of_kind};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// Rust grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct RustAdapter;

impl RustAdapter {
    /// Create a new Rust adapter
    pub fn new() -> Self {
        Self
    }

    fn macro_of(node: Node) -> Option<Node> {
        match node.kind() {
            "macro_invocation" => Some(node),
            "expression_statement" => named_child_of_kind(node, &["macro_invocation"]),
            _ => None,
        }
    }
}

impl GrammarAdapter for RustAdapter {
    fn language_name(&self) -> &str {
        "rust"
    }

    fn aliases(&self) -> &[&str] {
        &["rs"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["rs"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn classify(&self, node: Node, _source: &[u8], scope: Scope) -> Option<Classification> {
        let kind = match (scope, node.kind()) {
            (Scope::TypeBody, "function_item" | "function_signature_item") => ComponentKind::Method,
            (Scope::TypeBody, _) => return None,
            (_, "use_declaration" | "extern_crate_declaration") => ComponentKind::Import,
            (_, "function_item" | "function_signature_item") => ComponentKind::Function,
            (
                _,
                "struct_item" | "enum_item" | "union_item" | "trait_item" | "impl_item" | "type_item",
            ) => ComponentKind::TypeDefinition,
            (_, "const_item" | "static_item" | "macro_definition" | "macro_invocation") => {
                ComponentKind::TopLevelDeclaration
            }
            (_, "mod_item") if node.child_by_field_name("body").is_some() => {
                return Some(Classification::Structural);
            }
            (_, "mod_item") => ComponentKind::TopLevelDeclaration,
            (_, "foreign_mod_item" | "declaration_list") => return Some(Classification::Structural),
            (_, "expression_statement") if Self::macro_of(node).is_some() => {
                ComponentKind::TopLevelDeclaration
            }
            _ => return None,
        };
        Some(Classification::Component(kind))
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        match node.kind() {
            "impl_item" => {
                let ty = field_text(node, "type", source)?;
                match field_text(node, "trait", source) {
                    Some(tr) => Some(format!("{tr} for {ty}")),
                    None => Some(ty),
                }
            }
            "use_declaration" => field_text(node, "argument", source),
            "macro_invocation" | "expression_statement" => {
                let invocation = Self::macro_of(node)?;
                field_text(invocation, "macro", source).map(|m| format!("{m}!"))
            }
            _ => field_text(node, "name", source),
        }
    }

    fn is_comment(&self, node: Node) -> bool {
        matches!(node.kind(), "line_comment" | "block_comment")
    }

    /// `//!` and `/*! */` document the enclosing module
    fn is_docstring(&self, node: Node) -> bool {
        self.is_comment(node) && node.child_by_field_name("inner").is_some()
    }

    fn is_attribute(&self, node: Node) -> bool {
        node.kind() == "attribute_item"
    }

    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "impl_item" | "trait_item" => node.child_by_field_name("body"),
            _ => None,
        }
    }
}
