//! Java grammar adapter

use super::framework::{Classification, GrammarAdapter, Scope, field_text, named_child_of_kind};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// Java grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaAdapter;

impl JavaAdapter {
    /// Create a new Java adapter
    pub fn new() -> Self {
        Self
    }
}

impl GrammarAdapter for JavaAdapter {
    fn language_name(&self) -> &str {
        "java"
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn classify(&self, node: Node, _source: &[u8], scope: Scope) -> Option<Classification> {
        let kind = match (scope, node.kind()) {
            (
                Scope::TypeBody,
                "method_declaration"
                | "constructor_declaration"
                | "compact_constructor_declaration"
                | "annotation_type_element_declaration",
            ) => ComponentKind::Method,
            // methods of an enum follow its constants in a nested list
            (Scope::TypeBody, "enum_body_declarations") => return Some(Classification::Structural),
            (Scope::TypeBody, _) => return None,
            (_, "package_declaration" | "module_declaration") => ComponentKind::TopLevelDeclaration,
            (_, "import_declaration") => ComponentKind::Import,
            (
                _,
                "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "record_declaration"
                | "annotation_type_declaration",
            ) => ComponentKind::TypeDefinition,
            _ => return None,
        };
        Some(Classification::Component(kind))
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        match node.kind() {
            "package_declaration" | "import_declaration" => {
                let path = named_child_of_kind(node, &["scoped_identifier", "identifier"])?;
                Some(path.utf8_text(source).ok()?.to_string())
            }
            _ => field_text(node, "name", source),
        }
    }

    fn is_comment(&self, node: Node) -> bool {
        matches!(node.kind(), "line_comment" | "block_comment")
    }
}

#[cfg(test)]
mod tests {
    use crate::component::ComponentKind;
    use crate::segment::{SegmentOptions, Segmenter};

    #[test]
    fn test_class_and_enum() {
        let source = r#"package com.example;

import java.util.List;

/**
 * Greets people.
 */
public class Greeter {
    private final String name;

    public Greeter(String name) {
        this.name = name;
    }

    // Says hello.
    public String greet() {
        return "hi " + name;
    }
}

enum Mode {
    ON, OFF;

    boolean enabled() { return this == ON; }
}
"#;
        let components = Segmenter::default()
            .segment(source.as_bytes(), "java", &SegmentOptions::default())
            .unwrap();
        let summary: Vec<_> = components
            .iter()
            .map(|c| (c.kind, c.name.as_deref(), c.depth))
            .collect();

        assert_eq!(
            summary,
            vec![
                (ComponentKind::TopLevelDeclaration, Some("com.example"), 0),
                (ComponentKind::Import, Some("java.util.List"), 0),
                (ComponentKind::TypeDefinition, Some("Greeter"), 0),
                (ComponentKind::Method, Some("Greeter"), 1),
                (ComponentKind::Method, Some("greet"), 1),
                (ComponentKind::TypeDefinition, Some("Mode"), 0),
                (ComponentKind::Method, Some("enabled"), 1),
            ]
        );

        assert!(components[2].leading_comment.is_some());
        assert!(components[4].leading_comment.is_some());
        assert_eq!(components[3].leading_comment, None);
    }
}
