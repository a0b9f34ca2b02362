//! Python grammar adapter
//!
//! Classes are keyword-and-indentation delimited; their members live in the
//! `block` under the `body` field. Decorators are wrapped together with the
//! definition in a `decorated_definition`, so no sibling gluing is needed.

use super::framework::{Classification, GrammarAdapter, Scope, field_text, named_child_of_kind, unquote};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// Python grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAdapter;

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Self {
        Self
    }

    /// The definition inside a `decorated_definition`, or the node itself
    fn unwrap_decorated<'t>(node: Node<'t>) -> Node<'t> {
        if node.kind() == "decorated_definition" {
            node.child_by_field_name("definition").unwrap_or(node)
        } else {
            node
        }
    }

    fn is_assignment(node: Node) -> bool {
        node.kind() == "expression_statement"
            && node
                .named_child(0)
                .is_some_and(|c| matches!(c.kind(), "assignment" | "augmented_assignment"))
    }
}

impl GrammarAdapter for PythonAdapter {
    fn language_name(&self) -> &str {
        "python"
    }

    fn aliases(&self) -> &[&str] {
        &["py", "python3"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["py", "pyi"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn classify(&self, node: Node, _source: &[u8], scope: Scope) -> Option<Classification> {
        let definition = Self::unwrap_decorated(node);
        let kind = match (scope, definition.kind()) {
            (Scope::TypeBody, "function_definition") => ComponentKind::Method,
            (Scope::TypeBody, _) => return None,
            (_, "import_statement" | "import_from_statement" | "future_import_statement") => {
                ComponentKind::Import
            }
            (_, "function_definition") => ComponentKind::Function,
            (_, "class_definition" | "type_alias_statement") => ComponentKind::TypeDefinition,
            _ if Self::is_assignment(node) => ComponentKind::TopLevelDeclaration,
            _ => return None,
        };
        Some(Classification::Component(kind))
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        let node = Self::unwrap_decorated(node);
        match node.kind() {
            "function_definition" | "class_definition" => field_text(node, "name", source),
            "type_alias_statement" => field_text(node, "left", source),
            "import_statement" => field_text(node, "name", source),
            "import_from_statement" => field_text(node, "module_name", source),
            "future_import_statement" => Some("__future__".to_string()),
            "expression_statement" => {
                let assignment = named_child_of_kind(node, &["assignment", "augmented_assignment"])?;
                field_text(assignment, "left", source)
            }
            _ => None,
        }
        .map(|name| unquote(&name))
    }

    fn is_docstring(&self, node: Node) -> bool {
        node.kind() == "expression_statement"
            && node.named_child_count() == 1
            && node
                .named_child(0)
                .is_some_and(|c| matches!(c.kind(), "string" | "concatenated_string"))
    }

    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let definition = Self::unwrap_decorated(node);
        (definition.kind() == "class_definition")
            .then(|| definition.child_by_field_name("body"))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::segment::{SegmentOptions, Segmenter};

    fn segment(source: &str) -> Vec<crate::Component> {
        Segmenter::default()
            .segment(source.as_bytes(), "python", &SegmentOptions::default())
            .unwrap()
    }

    #[test]
    fn test_module_layout() {
        let source = r#"import os
from typing import List

MAX = 10

def hello():
    print("hello")

class Foo:
    def bar(self):
        pass

def world():
    pass
"#;
        let components = segment(source);
        let summary: Vec<_> = components
            .iter()
            .map(|c| (c.kind, c.name.as_deref(), c.depth))
            .collect();

        assert_eq!(
            summary,
            vec![
                (ComponentKind::Import, Some("os"), 0),
                (ComponentKind::Import, Some("typing"), 0),
                (ComponentKind::TopLevelDeclaration, Some("MAX"), 0),
                (ComponentKind::Function, Some("hello"), 0),
                (ComponentKind::TypeDefinition, Some("Foo"), 0),
                (ComponentKind::Method, Some("bar"), 1),
                (ComponentKind::Function, Some("world"), 0),
            ]
        );
    }

    #[test]
    fn test_decorated_method_and_docstring() {
        let source = "class Foo:\n    \"\"\"Doc.\"\"\"\n\n    @property\n    def bar(self):\n        return 1\n";
        let components = segment(source);

        assert_eq!(components[0].kind, ComponentKind::TypeDefinition);
        let docstring = &components[1];
        assert_eq!(docstring.kind, ComponentKind::Comment);
        assert_eq!(docstring.parent, Some(0));

        let method = &components[2];
        assert_eq!(method.kind, ComponentKind::Method);
        assert_eq!(method.name.as_deref(), Some("bar"));
        assert!(source[method.bytes.start..].starts_with("@property"));
        assert_eq!(method.leading_comment, None);
    }

    #[test]
    fn test_module_docstring_is_not_attached() {
        let source = "\"\"\"Module docs.\"\"\"\ndef main():\n    pass\n";
        let components = segment(source);
        assert_eq!(components[0].kind, ComponentKind::Comment);
        assert_eq!(components[1].kind, ComponentKind::Function);
        assert_eq!(components[1].leading_comment, None);
    }
}
