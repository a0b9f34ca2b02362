//! TypeScript and TSX grammar adapter
//!
//! Extends the JavaScript mapping with interfaces, enums, type aliases,
//! ambient declarations and namespaces. Member decorators are siblings of
//! the member inside `class_body` and get glued onto it.

use super::framework::{Classification, GrammarAdapter, Scope, field_text, named_child_of_kind};
use super::javascript::{classify_script, script_name, script_type_body};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// TypeScript grammar adapter; one instance per dialect
#[derive(Debug, Clone, Copy)]
pub struct TypeScriptAdapter {
    tsx: bool,
}

impl TypeScriptAdapter {
    /// Plain `.ts` dialect
    pub fn typescript() -> Self {
        Self { tsx: false }
    }

    /// `.tsx` dialect with JSX expressions
    pub fn tsx() -> Self {
        Self { tsx: true }
    }

    /// The declaration wrapped by `declare ...`
    fn ambient_inner<'t>(node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let inner = node.named_children(&mut cursor).next();
        inner
    }
}

impl Default for TypeScriptAdapter {
    fn default() -> Self {
        Self::typescript()
    }
}

impl GrammarAdapter for TypeScriptAdapter {
    fn language_name(&self) -> &str {
        if self.tsx { "tsx" } else { "typescript" }
    }

    fn aliases(&self) -> &[&str] {
        if self.tsx { &[] } else { &["ts"] }
    }

    fn file_extensions(&self) -> &[&str] {
        if self.tsx { &["tsx"] } else { &["ts", "mts", "cts"] }
    }

    fn grammar(&self) -> Language {
        if self.tsx {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
    }

    fn classify(&self, node: Node, source: &[u8], scope: Scope) -> Option<Classification> {
        let kind = match (scope, node.kind()) {
            (Scope::TypeBody, "method_signature" | "abstract_method_signature") => ComponentKind::Method,
            (Scope::TypeBody, _) => return classify_script(node, source, scope),
            (
                _,
                "interface_declaration"
                | "abstract_class_declaration"
                | "enum_declaration"
                | "type_alias_declaration",
            ) => ComponentKind::TypeDefinition,
            (_, "function_signature") => ComponentKind::Function,
            (_, "import_alias") => ComponentKind::Import,
            (_, "internal_module" | "module" | "statement_block") => return Some(Classification::Structural),
            (_, "expression_statement") => {
                named_child_of_kind(node, &["internal_module"])?;
                return Some(Classification::Structural);
            }
            (_, "ambient_declaration") => {
                let inner = Self::ambient_inner(node)?;
                if inner.kind() == "statement_block" {
                    return Some(Classification::Structural);
                }
                return self
                    .classify(inner, source, scope)
                    .or(Some(Classification::Component(ComponentKind::TopLevelDeclaration)));
            }
            (_, "export_statement") => {
                if let Some(declaration) = node.child_by_field_name("declaration") {
                    if let Some(classification) = self.classify(declaration, source, scope) {
                        return Some(classification);
                    }
                }
                return classify_script(node, source, scope);
            }
            _ => return classify_script(node, source, scope),
        };
        Some(Classification::Component(kind))
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        match node.kind() {
            "ambient_declaration" => self.extract_name(Self::ambient_inner(node)?, source),
            "export_statement" => match node.child_by_field_name("declaration") {
                Some(declaration) => self.extract_name(declaration, source),
                None => script_name(node, source),
            },
            "import_alias" => {
                let alias = named_child_of_kind(node, &["identifier"])?;
                Some(alias.utf8_text(source).ok()?.to_string())
            }
            "function_signature" | "interface_declaration" | "abstract_class_declaration"
            | "enum_declaration" | "type_alias_declaration" | "method_signature"
            | "abstract_method_signature" => field_text(node, "name", source),
            _ => script_name(node, source),
        }
    }

    fn is_attribute(&self, node: Node) -> bool {
        node.kind() == "decorator"
    }

    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "ambient_declaration" => self.type_body(Self::ambient_inner(node)?),
            "export_statement" => match node.child_by_field_name("declaration") {
                Some(declaration) => self.type_body(declaration),
                None => script_type_body(node),
            },
            "interface_declaration" | "abstract_class_declaration" | "class_declaration" => {
                node.child_by_field_name("body")
            }
            "enum_declaration" | "type_alias_declaration" => None,
            _ => script_type_body(node),
        }
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
    fn test_types_and_interfaces() {
        let source = r#"import { x } from "./x";

export interface Shape {
  area(): number;
  name: string;
}

type Id = string;

enum Color { Red, Green }

export abstract class Base implements Shape {
  abstract area(): number;
  get name(): string { return "base"; }
}

declare function ext(a: number): void;
"#;
        let summary = summarize(source, "ts");
        assert_eq!(
            summary,
            vec![
                (ComponentKind::Import, Some("./x".to_string()), 0),
                (ComponentKind::TypeDefinition, Some("Shape".to_string()), 0),
                (ComponentKind::Method, Some("area".to_string()), 1),
                (ComponentKind::TypeDefinition, Some("Id".to_string()), 0),
                (ComponentKind::TypeDefinition, Some("Color".to_string()), 0),
                (ComponentKind::TypeDefinition, Some("Base".to_string()), 0),
                (ComponentKind::Method, Some("area".to_string()), 1),
                (ComponentKind::Method, Some("name".to_string()), 1),
                (ComponentKind::Function, Some("ext".to_string()), 0),
            ]
        );
    }

    #[test]
    fn test_namespace_is_flattened() {
        let source = "namespace Geo {\n  export function area() { return 0; }\n}\n";
        let summary = summarize(source, "typescript");
        assert_eq!(summary, vec![(ComponentKind::Function, Some("area".to_string()), 0)]);
    }

    #[test]
    fn test_anonymous_default_class() {
        let source = "export default class {\n  run(): void {}\n}\n";
        let summary = summarize(source, "typescript");
        assert_eq!(
            summary,
            vec![
                (ComponentKind::TypeDefinition, None, 0),
                (ComponentKind::Method, Some("run".to_string()), 1),
            ]
        );
    }

    #[test]
    fn test_tsx_component() {
        let source = "export const App = () => <main>hello</main>;\n";
        let summary = summarize(source, "tsx");
        assert_eq!(summary, vec![(ComponentKind::Function, Some("App".to_string()), 0)]);
    }
}
