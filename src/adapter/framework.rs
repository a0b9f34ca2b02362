//! Core adapter framework
//!
//! Defines the trait every grammar adapter implements, the registry that
//! selects one per input, and the small tree helpers adapters share.

use crate::component::ComponentKind;
use crate::{Error, Result};
use std::path::Path;
use tree_sitter::{Language, Node};

/// Which container a node is being classified in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Direct content of the file, or of a structural wrapper at file level
    TopLevel,
    /// Member list of a top-level type definition
    TypeBody,
}

/// What the walker should do with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Emit a component of this kind
    Component(ComponentKind),
    /// Walk through the node, visiting its children at the same depth
    Structural,
}

/// A node plus the byte range it occupies once sibling decorations
/// (attributes, decorators, a trailing `;`) are glued onto it.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxUnit<'t> {
    pub node: Node<'t>,
    pub start: usize,
    pub end: usize,
}

impl<'t> SyntaxUnit<'t> {
    pub fn of(node: Node<'t>) -> Self {
        Self {
            node,
            start: node.start_byte(),
            end: node.end_byte(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Trait for grammar adapters
///
/// Each adapter is responsible for:
/// 1. Identifying the inputs it handles (names, aliases, extensions)
/// 2. Providing the tree-sitter grammar
/// 3. Mapping grammar node kinds onto `ComponentKind`
/// 4. Naming components and normalizing sibling order
///
/// Adapters are stateless; one instance serves every document.
pub trait GrammarAdapter: Send + Sync {
    /// Get the language name (canonical identifier)
    fn language_name(&self) -> &str;

    /// Alternative identifiers accepted as language hints
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Get file extensions this adapter handles
    fn file_extensions(&self) -> &[&str];

    /// Check if this adapter can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            self.file_extensions().contains(&ext.as_str())
        } else {
            false
        }
    }

    /// Check if a name, alias or extension (with or without dot) selects this adapter
    fn matches_hint(&self, hint: &str) -> bool {
        let hint = hint.trim().trim_start_matches('.').to_ascii_lowercase();
        self.language_name().eq_ignore_ascii_case(&hint)
            || self.aliases().contains(&hint.as_str())
            || self.file_extensions().contains(&hint.as_str())
    }

    /// The tree-sitter grammar for this language
    fn grammar(&self) -> Language;

    /// Map a node onto a component kind, a structural wrapper, or nothing
    fn classify(&self, node: Node, source: &[u8], scope: Scope) -> Option<Classification>;

    /// Declared identifier of a classified node
    fn extract_name(&self, node: Node, source: &[u8]) -> Option<String>;

    fn is_comment(&self, node: Node) -> bool {
        node.kind() == "comment"
    }

    /// Documentation that describes its enclosing scope rather than the
    /// next declaration (Python docstrings, Rust inner doc comments).
    fn is_docstring(&self, _node: Node) -> bool {
        false
    }

    /// Sibling nodes that belong to the following declaration
    fn is_attribute(&self, _node: Node) -> bool {
        false
    }

    /// Member container of a type definition, if it can hold methods
    fn type_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("body")
    }

    /// Children of `node` in textual order, with attributes glued forward
    /// and a trailing `;` glued back.
    fn children_in_source_order<'t>(&self, node: Node<'t>) -> Vec<SyntaxUnit<'t>> {
        glue_units(node, |n| self.is_attribute(n), |n| self.is_comment(n))
    }
}

/// Registry of grammar adapters
#[derive(Default)]
pub struct LanguageRegistry {
    adapters: Vec<Box<dyn GrammarAdapter>>,
}

impl LanguageRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. Earlier registrations win on shared hints.
    pub fn register(&mut self, adapter: impl GrammarAdapter + 'static) {
        self.adapters.push(Box::new(adapter));
    }

    /// Resolve a language name, alias, extension or file path to its adapter
    pub fn resolve(&self, hint: &str) -> Result<&dyn GrammarAdapter> {
        self.candidates(hint)
            .into_iter()
            .next()
            .ok_or_else(|| Error::unsupported(hint))
    }

    /// Every adapter claiming `hint`, in registration order
    pub fn candidates(&self, hint: &str) -> Vec<&dyn GrammarAdapter> {
        let direct: Vec<&dyn GrammarAdapter> = self
            .adapters
            .iter()
            .filter(|a| a.matches_hint(hint))
            .map(|a| a.as_ref())
            .collect();
        if !direct.is_empty() {
            return direct;
        }
        let path = Path::new(hint);
        self.adapters
            .iter()
            .filter(|a| a.can_handle(path))
            .map(|a| a.as_ref())
            .collect()
    }

    /// Find an adapter for a file
    pub fn resolve_path(&self, path: &Path) -> Result<&dyn GrammarAdapter> {
        self.adapters
            .iter()
            .find(|a| a.can_handle(path))
            .map(|a| a.as_ref())
            .ok_or_else(|| Error::unsupported(path.display().to_string()))
    }

    /// Get all registered adapters
    pub fn adapters(&self) -> &[Box<dyn GrammarAdapter>] {
        &self.adapters
    }
}

/// Create a default registry with all built-in adapters
pub fn default_registry() -> LanguageRegistry {
    let mut registry = LanguageRegistry::new();
    // C before C++ so `.h` resolves to C, with C++ as the fallback candidate
    registry.register(super::c::CAdapter::new());
    registry.register(super::cpp::CppAdapter::new());
    registry.register(super::python::PythonAdapter::new());
    registry.register(super::javascript::JavaScriptAdapter::new());
    registry.register(super::typescript::TypeScriptAdapter::typescript());
    registry.register(super::typescript::TypeScriptAdapter::tsx());
    registry.register(super::java::JavaAdapter::new());
    registry.register(super::rust::RustAdapter::new());
    registry.register(super::go::GoAdapter::new());
    registry
}

/// Split `node`'s children into units. Nodes matching `is_prefix` are held
/// (together with any comments between them) and glued onto the next
/// declaration; an anonymous `;` directly after a declaration is glued onto it.
pub fn glue_units<'t>(
    node: Node<'t>,
    is_prefix: impl Fn(Node<'t>) -> bool,
    is_comment: impl Fn(Node<'t>) -> bool,
) -> Vec<SyntaxUnit<'t>> {
    let mut cursor = node.walk();
    let mut units: Vec<SyntaxUnit<'t>> = Vec::with_capacity(node.child_count());
    let mut pending: Vec<Node<'t>> = Vec::new();

    for child in node.children(&mut cursor) {
        if child.is_named() && is_prefix(child) {
            pending.push(child);
            continue;
        }
        if is_comment(child) {
            if pending.is_empty() {
                units.push(SyntaxUnit::of(child));
            } else {
                pending.push(child);
            }
            continue;
        }
        if !child.is_named() && child.kind() == ";" && pending.is_empty() {
            if let Some(last) = units.last_mut() {
                if last.node.is_named() && !is_comment(last.node) && last.end <= child.start_byte() {
                    last.end = child.end_byte();
                    continue;
                }
            }
        }
        match pending.first() {
            Some(first) if child.is_named() => {
                units.push(SyntaxUnit {
                    node: child,
                    start: first.start_byte(),
                    end: child.end_byte(),
                });
                pending.clear();
            }
            _ => {
                units.extend(pending.drain(..).map(SyntaxUnit::of));
                units.push(SyntaxUnit::of(child));
            }
        }
    }
    units.extend(pending.into_iter().map(SyntaxUnit::of));
    units
}

/// UTF-8 text of a node
pub fn node_text<'s>(node: Node, source: &'s [u8]) -> Option<&'s str> {
    node.utf8_text(source).ok()
}

/// Text of a named field, trimmed
pub fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    let child = node.child_by_field_name(field)?;
    let text = node_text(child, source)?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// First named child with one of the given kinds
pub fn named_child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| kinds.contains(&c.kind()));
    found
}

/// Strip quoting from module paths such as `"os"`, `<stdio.h>` or `'./x'`
pub fn unquote(text: &str) -> String {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '<' | '>'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct TestAdapter;

    impl GrammarAdapter for TestAdapter {
        fn language_name(&self) -> &str { "test" }
        fn aliases(&self) -> &[&str] { &["tst"] }
        fn file_extensions(&self) -> &[&str] { &["test"] }
        fn grammar(&self) -> Language { tree_sitter_python::LANGUAGE.into() }
        fn classify(&self, _node: Node, _source: &[u8], _scope: Scope) -> Option<Classification> { None }
        fn extract_name(&self, _node: Node, _source: &[u8]) -> Option<String> { None }
    }

    #[test]
    fn test_registry() {
        let mut registry = LanguageRegistry::new();
        registry.register(TestAdapter);

        assert!(registry.resolve_path(&PathBuf::from("foo.test")).is_ok());
        assert!(registry.resolve_path(&PathBuf::from("foo.other")).is_err());
        assert!(registry.resolve("test").is_ok());
        assert!(registry.resolve("TST").is_ok());
        assert!(registry.resolve(".test").is_ok());
        assert!(registry.resolve("dir/foo.test").is_ok());
        assert!(matches!(registry.resolve("other"), Err(Error::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_default_registry_hints() {
        let registry = default_registry();
        assert_eq!(registry.resolve("py").unwrap().language_name(), "python");
        assert_eq!(registry.resolve(".tsx").unwrap().language_name(), "tsx");
        assert_eq!(registry.resolve("c++").unwrap().language_name(), "cpp");
        assert_eq!(registry.resolve("src/main.rs").unwrap().language_name(), "rust");
        assert_eq!(registry.resolve("jsx").unwrap().language_name(), "javascript");

        let header: Vec<_> = registry.candidates("h").iter().map(|a| a.language_name().to_string()).collect();
        assert_eq!(header, vec!["c", "cpp"]);
    }

    #[test]
    fn test_glue_attributes_and_semicolon() {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_rust::LANGUAGE.into()).unwrap();
        let source = "#[derive(Debug)]\n#[allow(dead_code)]\nstruct A;\nfn b() {}\n";
        let tree = parser.parse(source, None).unwrap();

        let units = glue_units(
            tree.root_node(),
            |n| n.kind() == "attribute_item",
            |n| n.kind() == "line_comment",
        );
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].node.kind(), "struct_item");
        assert_eq!(units[0].start, 0);
        assert_eq!(units[1].node.kind(), "function_item");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"os\""), "os");
        assert_eq!(unquote("<stdio.h>"), "stdio.h");
    }
}
