//! JavaScript grammar adapter (JSX included)
//!
//! The classification helpers here are shared with the TypeScript adapter,
//! whose grammar extends this one.

use super::framework::{Classification, GrammarAdapter, Scope, field_text, named_child_of_kind, unquote};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// JavaScript grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptAdapter;

impl JavaScriptAdapter {
    /// Create a new JavaScript adapter
    pub fn new() -> Self {
        Self
    }
}

/// True for function-valued expressions: arrows, function and generator expressions
pub(super) fn is_function_value(node: Node) -> bool {
    node.is_named()
        && matches!(
            node.kind(),
            "arrow_function" | "function_expression" | "function" | "generator_function"
        )
}

fn is_class_value(node: Node) -> bool {
    node.is_named() && node.kind() == "class"
}

fn is_require_call(node: Node, source: &[u8]) -> bool {
    node.kind() == "call_expression"
        && node
            .child_by_field_name("function")
            .is_some_and(|f| f.utf8_text(source).is_ok_and(|t| t == "require"))
}

/// First declarator of a `let`/`const`/`var` declaration
fn first_declarator(node: Node) -> Option<Node> {
    named_child_of_kind(node, &["variable_declarator"])
}

/// Kind implied by the value bound in a variable declaration
fn declaration_kind(node: Node, source: &[u8]) -> ComponentKind {
    let value = first_declarator(node).and_then(|d| d.child_by_field_name("value"));
    match value {
        Some(v) if is_function_value(v) => ComponentKind::Function,
        Some(v) if is_class_value(v) => ComponentKind::TypeDefinition,
        Some(v) if is_require_call(v, source) => ComponentKind::Import,
        _ => ComponentKind::TopLevelDeclaration,
    }
}

/// Classification shared by JavaScript and TypeScript.
pub(super) fn classify_script(node: Node, source: &[u8], scope: Scope) -> Option<Classification> {
    let kind = match (scope, node.kind()) {
        (Scope::TypeBody, "method_definition") => ComponentKind::Method,
        (Scope::TypeBody, "field_definition" | "public_field_definition") => {
            let value = node.child_by_field_name("value")?;
            if !is_function_value(value) {
                return None;
            }
            ComponentKind::Method
        }
        (Scope::TypeBody, _) => return None,
        (_, "import_statement") => ComponentKind::Import,
        (_, "export_statement") => {
            if node.child_by_field_name("source").is_some() {
                ComponentKind::Import
            } else if let Some(declaration) = node.child_by_field_name("declaration") {
                match classify_script(declaration, source, scope) {
                    Some(Classification::Component(kind)) => kind,
                    other => return other.or(Some(Classification::Component(ComponentKind::TopLevelDeclaration))),
                }
            } else {
                // `export default <expression>`, including anonymous classes and functions
                match node.child_by_field_name("value") {
                    Some(value) if is_function_value(value) => ComponentKind::Function,
                    Some(value) if is_class_value(value) => ComponentKind::TypeDefinition,
                    _ => ComponentKind::TopLevelDeclaration,
                }
            }
        }
        (_, "function_declaration" | "generator_function_declaration") => ComponentKind::Function,
        (_, "class_declaration") => ComponentKind::TypeDefinition,
        (_, "lexical_declaration" | "variable_declaration") => declaration_kind(node, source),
        _ => return None,
    };
    Some(Classification::Component(kind))
}

/// Name shared by JavaScript and TypeScript.
pub(super) fn script_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "export_statement" => {
            if let Some(declaration) = node.child_by_field_name("declaration") {
                return script_name(declaration, source);
            }
            if let Some(value) = node.child_by_field_name("value") {
                return (is_function_value(value) || is_class_value(value))
                    .then(|| field_text(value, "name", source))
                    .flatten();
            }
            field_text(node, "source", source).map(|s| unquote(&s))
        }
        "import_statement" => field_text(node, "source", source).map(|s| unquote(&s)),
        "lexical_declaration" | "variable_declaration" => {
            let declarator = first_declarator(node)?;
            let value = declarator.child_by_field_name("value");
            match value {
                Some(v) if is_require_call(v, source) => {
                    let arguments = v.child_by_field_name("arguments")?;
                    let module = named_child_of_kind(arguments, &["string", "template_string"])?;
                    Some(unquote(module.utf8_text(source).ok()?))
                }
                _ => field_text(declarator, "name", source),
            }
        }
        "field_definition" => field_text(node, "property", source),
        "public_field_definition" => field_text(node, "name", source),
        _ => field_text(node, "name", source),
    }
}

/// Member container shared by JavaScript and TypeScript.
pub(super) fn script_type_body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "export_statement" => match node.child_by_field_name("declaration") {
            Some(declaration) => script_type_body(declaration),
            None => {
                let value = node.child_by_field_name("value")?;
                is_class_value(value).then(|| value.child_by_field_name("body")).flatten()
            }
        },
        "lexical_declaration" | "variable_declaration" => {
            let value = first_declarator(node)?.child_by_field_name("value")?;
            is_class_value(value).then(|| value.child_by_field_name("body")).flatten()
        }
        _ => node.child_by_field_name("body"),
    }
}

impl GrammarAdapter for JavaScriptAdapter {
    fn language_name(&self) -> &str {
        "javascript"
    }

    fn aliases(&self) -> &[&str] {
        &["js", "node", "ecmascript"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_javascript::LANGUAGE.into()
    }

    fn classify(&self, node: Node, source: &[u8], scope: Scope) -> Option<Classification> {
        classify_script(node, source, scope)
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        script_name(node, source)
    }

    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        script_type_body(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::component::ComponentKind;
    use crate::segment::{SegmentOptions, Segmenter};

    fn summarize(source: &str, language: &str) -> Vec<(ComponentKind, Option<String>, usize)> {
        Segmenter::default()
            .segment(source.as_bytes(), language, &SegmentOptions::default())
            .unwrap()
            .into_iter()
            .map(|c| (c.kind, c.name, c.depth))
            .collect()
    }

    #[test]
    fn test_module_layout() {
        let source = r#"import React from "react";
const fs = require("fs");

const LIMIT = 3;

export function render() {
  return <div>hi</div>;
}

const handler = (event) => event;

class Widget {
  constructor() {}
  draw() {}
}
"#;
        let summary = summarize(source, "jsx");
        assert_eq!(
            summary,
            vec![
                (ComponentKind::Import, Some("react".to_string()), 0),
                (ComponentKind::Import, Some("fs".to_string()), 0),
                (ComponentKind::TopLevelDeclaration, Some("LIMIT".to_string()), 0),
                (ComponentKind::Function, Some("render".to_string()), 0),
                (ComponentKind::Function, Some("handler".to_string()), 0),
                (ComponentKind::TypeDefinition, Some("Widget".to_string()), 0),
                (ComponentKind::Method, Some("constructor".to_string()), 1),
                (ComponentKind::Method, Some("draw".to_string()), 1),
            ]
        );
    }

    #[test]
    fn test_anonymous_default_exports() {
        assert_eq!(
            summarize("export default class {\n  m() {}\n}\n", "js"),
            vec![
                (ComponentKind::TypeDefinition, None, 0),
                (ComponentKind::Method, Some("m".to_string()), 1),
            ]
        );
        assert_eq!(
            summarize("export default function () {}\n", "js"),
            vec![(ComponentKind::Function, None, 0)]
        );
        assert_eq!(
            summarize("export default class Store {}\n", "js"),
            vec![(ComponentKind::TypeDefinition, Some("Store".to_string()), 0)]
        );
        assert_eq!(
            summarize("export default 42;\n", "js"),
            vec![(ComponentKind::TopLevelDeclaration, None, 0)]
        );
    }

    #[test]
    fn test_jsdoc_attaches_to_function() {
        let source = "/** Adds. */\nfunction add(a, b) { return a + b; }\n";
        let components = crate::segment(source.as_bytes(), "js", &SegmentOptions::default()).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].leading_comment.map(|r| r.start), Some(0));
    }
}
