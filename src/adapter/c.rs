//! C grammar adapter
//!
//! Preprocessor conditionals are structural: their branches are visited as
//! if they were written at file level. A bare `struct S { ... };` shows up as
//! a specifier followed by a sibling `;`, which the default sibling gluing
//! folds back into the definition.

use super::framework::{Classification, GrammarAdapter, Scope, field_text, unquote};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// C grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct CAdapter;

impl CAdapter {
    /// Create a new C adapter
    pub fn new() -> Self {
        Self
    }
}

/// Node kinds that only wrap other top-level items
pub(super) const PREPROCESSOR_BRANCHES: &[&str] = &[
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
];

/// Follow a declarator chain (`*name`, `name[4]`, `name(args)`, `name = 1`)
/// down to the declared identifier.
pub(super) fn declarator_name(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node;
    loop {
        match current.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "qualified_identifier"
            | "destructor_name" | "operator_name" | "primitive_type" => {
                return Some(current.utf8_text(source).ok()?.to_string());
            }
            _ => current = current.child_by_field_name("declarator")?,
        }
    }
}

/// True when the declarator chain of `node` contains a function declarator
pub(super) fn declares_function(node: Node) -> bool {
    let mut current = node.child_by_field_name("declarator");
    while let Some(declarator) = current {
        if declarator.kind() == "function_declarator" {
            return true;
        }
        current = declarator.child_by_field_name("declarator");
    }
    false
}

/// Classification shared by C and C++.
pub(super) fn classify_c(node: Node, scope: Scope) -> Option<Classification> {
    if PREPROCESSOR_BRANCHES.contains(&node.kind()) {
        return Some(Classification::Structural);
    }
    if scope == Scope::TypeBody {
        return None;
    }
    let kind = match node.kind() {
        "preproc_include" => ComponentKind::Import,
        "function_definition" => ComponentKind::Function,
        "declaration" | "preproc_def" | "preproc_function_def" => ComponentKind::TopLevelDeclaration,
        "type_definition" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
            ComponentKind::TypeDefinition
        }
        "linkage_specification" | "declaration_list" => return Some(Classification::Structural),
        _ => return None,
    };
    Some(Classification::Component(kind))
}

/// Name shared by C and C++.
pub(super) fn c_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "preproc_include" => field_text(node, "path", source).map(|p| unquote(&p)),
        "preproc_def" | "preproc_function_def" => field_text(node, "name", source),
        "function_definition" | "declaration" | "type_definition" | "field_declaration" => {
            declarator_name(node.child_by_field_name("declarator")?, source)
        }
        _ => field_text(node, "name", source),
    }
}

impl GrammarAdapter for CAdapter {
    fn language_name(&self) -> &str {
        "c"
    }

    fn file_extensions(&self) -> &[&str] {
        &["c", "h"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_c::LANGUAGE.into()
    }

    fn classify(&self, node: Node, _source: &[u8], scope: Scope) -> Option<Classification> {
        classify_c(node, scope)
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        c_name(node, source)
    }

    /// C types carry no methods
    fn type_body<'t>(&self, _node: Node<'t>) -> Option<Node<'t>> {
        None
    }
}
