//! Go grammar adapter
//!
//! Go methods are declared at file level with a receiver, so they stay
//! top-level functions. Only interface types have a member body.

use super::framework::{Classification, GrammarAdapter, Scope, field_text, named_child_of_kind, unquote};
use crate::component::ComponentKind;
use tree_sitter::{Language, Node};

/// Go grammar adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct GoAdapter;

impl GoAdapter {
    /// Create a new Go adapter
    pub fn new() -> Self {
        Self
    }

    /// The single spec of an ungrouped declaration (`type T ...`, `var x ...`)
    fn single_spec<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let specs: Vec<Node<'t>> = node
            .named_children(&mut cursor)
            .filter(|c| kinds.contains(&c.kind()))
            .collect();
        match specs.as_slice() {
            [spec] => Some(*spec),
            _ => None,
        }
    }

    /// First spec of a possibly grouped declaration
    fn first_spec<'t>(node: Node<'t>, spec: &str, list: &str) -> Option<Node<'t>> {
        named_child_of_kind(node, &[spec]).or_else(|| {
            let group = named_child_of_kind(node, &[list])?;
            named_child_of_kind(group, &[spec])
        })
    }
}

impl GrammarAdapter for GoAdapter {
    fn language_name(&self) -> &str {
        "go"
    }

    fn aliases(&self) -> &[&str] {
        &["golang"]
    }

    fn file_extensions(&self) -> &[&str] {
        &["go"]
    }

    fn grammar(&self) -> Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn classify(&self, node: Node, _source: &[u8], scope: Scope) -> Option<Classification> {
        let kind = match (scope, node.kind()) {
            (Scope::TypeBody, "method_elem" | "method_spec") => ComponentKind::Method,
            (Scope::TypeBody, _) => return None,
            (_, "package_clause" | "const_declaration" | "var_declaration") => {
                ComponentKind::TopLevelDeclaration
            }
            (_, "import_declaration") => ComponentKind::Import,
            (_, "function_declaration" | "method_declaration") => ComponentKind::Function,
            (_, "type_declaration") => ComponentKind::TypeDefinition,
            _ => return None,
        };
        Some(Classification::Component(kind))
    }

    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String> {
        match node.kind() {
            "package_clause" => {
                let name = named_child_of_kind(node, &["package_identifier"])?;
                Some(name.utf8_text(source).ok()?.to_string())
            }
            "import_declaration" => {
                let spec = Self::first_spec(node, "import_spec", "import_spec_list")?;
                field_text(spec, "path", source).map(|p| unquote(&p))
            }
            "type_declaration" => {
                let spec = named_child_of_kind(node, &["type_spec", "type_alias"])?;
                field_text(spec, "name", source)
            }
            "const_declaration" => {
                let spec = named_child_of_kind(node, &["const_spec"])?;
                field_text(spec, "name", source)
            }
            "var_declaration" => {
                let spec = Self::first_spec(node, "var_spec", "var_spec_list")?;
                field_text(spec, "name", source)
            }
            _ => field_text(node, "name", source),
        }
    }

    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "type_declaration" {
            return None;
        }
        let spec = Self::single_spec(node, &["type_spec"])?;
        let ty = spec.child_by_field_name("type")?;
        (ty.kind() == "interface_type").then_some(ty)
    }
}

#[cfg(test)]
mod tests {
    use crate::component::ComponentKind;
    use crate::segment::{SegmentOptions, Segmenter};

    #[test]
    fn test_file_layout() {
        let source = r#"package main

import (
	"fmt"
	"os"
)

const Version = "1.0"

// Shape has an area.
type Shape interface {
	Area() float64
	Name() string
}

type Square struct {
	side float64
}

func (s Square) Area() float64 {
	return s.side * s.side
}

func main() {
	fmt.Println(os.Args)
}
"#;
        let components = Segmenter::default()
            .segment(source.as_bytes(), "go", &SegmentOptions::default())
            .unwrap();
        let summary: Vec<_> = components
            .iter()
            .map(|c| (c.kind, c.name.as_deref(), c.depth))
            .collect();

        assert_eq!(
            summary,
            vec![
                (ComponentKind::TopLevelDeclaration, Some("main"), 0),
                (ComponentKind::Import, Some("fmt"), 0),
                (ComponentKind::TopLevelDeclaration, Some("Version"), 0),
                (ComponentKind::TypeDefinition, Some("Shape"), 0),
                (ComponentKind::Method, Some("Area"), 1),
                (ComponentKind::Method, Some("Name"), 1),
                (ComponentKind::TypeDefinition, Some("Square"), 0),
                (ComponentKind::Function, Some("Area"), 0),
                (ComponentKind::Function, Some("main"), 0),
            ]
        );
        assert!(components[3].leading_comment.is_some());
    }
}
