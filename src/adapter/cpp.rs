//! C++ grammar adapter
//!
//! Builds on the C mapping. Classes, structs and unions get a member body
//! whose function definitions and declarations become methods; namespaces
//! and `extern "C"` blocks are structural; templates take the kind of the
//! declaration they wrap.

use super::c::{PREPROCESSOR_BRANCHES, c_name, classify_c, declares_function};
use super::framework::{Classification, GrammarAdapter, Scope, field_text};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// C++ grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct CppAdapter;

impl CppAdapter {
    /// Create a new C++ adapter
    pub fn new() -> Self {
        Self
    }

    /// The declaration wrapped by `template <...>`
    fn template_inner<'t>(node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|c| c.kind() != "template_parameter_list" && c.kind() != "requires_clause");
        inner
    }

    fn classify_member(node: Node) -> Option<Classification> {
        if PREPROCESSOR_BRANCHES.contains(&node.kind()) {
            return Some(Classification::Structural);
        }
        let is_method = match node.kind() {
            "function_definition" => true,
            "field_declaration" | "declaration" => declares_function(node),
            "template_declaration" => {
                Self::template_inner(node).is_some_and(|inner| Self::classify_member(inner).is_some())
            }
            _ => false,
        };
        is_method.then_some(Classification::Component(ComponentKind::Method))
    }
}

impl GrammarAdapter for CppAdapter {
    fn language_name(&self) -> &str {
        "cpp"
    }

    fn aliases(&self) -> &[&str] {
        &["c++", "cxx"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["cpp", "cc", "cxx", "hpp", "hh", "hxx", "h"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn classify(&self, node: Node, source: &[u8], scope: Scope) -> Option<Classification> {
        if scope == Scope::TypeBody {
            return Self::classify_member(node);
        }
        let kind = match node.kind() {
            "class_specifier" => ComponentKind::TypeDefinition,
            "alias_declaration" | "concept_definition" => ComponentKind::TypeDefinition,
            "using_declaration" => ComponentKind::Import,
            "namespace_alias_definition" | "static_assert_declaration" => {
                ComponentKind::TopLevelDeclaration
            }
            "namespace_definition" => return Some(Classification::Structural),
            "template_declaration" => {
                let inner = Self::template_inner(node)?;
                return match self.classify(inner, source, scope) {
                    Some(Classification::Structural) | None => {
                        Some(Classification::Component(ComponentKind::TopLevelDeclaration))
                    }
                    component => component,
                };
            }
            _ => return classify_c(node, scope),
        };
        Some(Classification::Component(kind))
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        match node.kind() {
            "template_declaration" => self.extract_name(Self::template_inner(node)?, source),
            "using_declaration" => {
                let mut cursor = node.walk();
                let target = node.named_children(&mut cursor).last();
                Some(target?.utf8_text(source).ok()?.to_string())
            }
            "namespace_alias_definition" => field_text(node, "name", source),
            _ => c_name(node, source),
        }
    }

    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "template_declaration" => self.type_body(Self::template_inner(node)?),
            "class_specifier" | "struct_specifier" | "union_specifier" => node.child_by_field_name("body"),
            _ => None,
        }
    }
}
