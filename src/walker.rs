//! Source-order tree walker
//!
//! Flattens the syntax tree into a pre-order list of `WalkItem`s: component
//! candidates, comments, and barriers (unmapped siblings that are not
//! emitted but still separate a comment from the next component). Structural
//! wrappers contribute their children at their own depth. A top-level type
//! definition is entered exactly one level deep to collect its methods.
//! Units with syntax errors become `Other` spans around whatever complete
//! declarations can be recovered from them.

use crate::adapter::{Classification, GrammarAdapter, Scope, SyntaxUnit};
use crate::component::{ByteRange, ComponentKind};
use tree_sitter::Node;

/// What a walked unit contributes to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRole {
    Component {
        kind: ComponentKind,
        name: Option<String>,
    },
    Comment {
        /// Documents the enclosing scope; never attached forward
        docstring: bool,
    },
    /// Unmapped sibling: not emitted, breaks comment adjacency
    Barrier,
}

/// One sibling in a scope, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkItem {
    pub role: ItemRole,
    pub range: ByteRange,
    pub depth: usize,
    /// Index (into the item list) of the enclosing type definition
    pub parent: Option<usize>,
    pub node_kind: String,
}

impl WalkItem {
    pub fn is_component(&self) -> bool {
        matches!(self.role, ItemRole::Component { .. })
    }

    pub fn is_attachable_comment(&self) -> bool {
        matches!(self.role, ItemRole::Comment { docstring: false })
    }
}

/// Walks one tree with one adapter.
pub struct TreeWalker<'a> {
    adapter: &'a dyn GrammarAdapter,
    source: &'a [u8],
    items: Vec<WalkItem>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(adapter: &'a dyn GrammarAdapter, source: &'a [u8]) -> Self {
        Self {
            adapter,
            source,
            items: Vec::new(),
        }
    }

    /// Walk from the root and return the items in source order.
    pub fn walk(mut self, root: Node) -> Vec<WalkItem> {
        if root.is_error() {
            let unit = SyntaxUnit::of(root);
            if !unit.is_empty() {
                self.visit_broken(unit, 0, None, Scope::TopLevel);
            }
            return self.items;
        }
        self.visit_children(root, 0, None, Scope::TopLevel);
        self.items
    }

    fn visit_children(&mut self, node: Node, depth: usize, parent: Option<usize>, scope: Scope) {
        for unit in self.adapter.children_in_source_order(node) {
            self.visit_unit(unit, depth, parent, scope);
        }
    }

    fn visit_unit(&mut self, unit: SyntaxUnit, depth: usize, parent: Option<usize>, scope: Scope) {
        let node = unit.node;
        if unit.is_empty() || node.is_missing() {
            return;
        }
        if self.adapter.is_comment(node) || self.adapter.is_docstring(node) {
            let docstring = self.adapter.is_docstring(node);
            self.push(unit, ItemRole::Comment { docstring }, depth, parent);
            return;
        }
        if node.is_error() {
            self.visit_broken(unit, depth, parent, scope);
            return;
        }

        match self.adapter.classify(node, self.source, scope) {
            Some(Classification::Structural) => self.visit_children(node, depth, parent, scope),
            Some(Classification::Component(kind)) => {
                if scope == Scope::TypeBody && kind != ComponentKind::Method {
                    if node.has_error() {
                        self.visit_broken(unit, depth, parent, scope);
                    } else {
                        self.push(unit, ItemRole::Barrier, depth, parent);
                    }
                    return;
                }
                let body = if kind == ComponentKind::TypeDefinition && scope == Scope::TopLevel {
                    self.adapter.type_body(node)
                } else {
                    None
                };
                // a type whose errors all sit inside its body keeps its valid members
                if node.has_error() && !body.is_some_and(|body| !header_has_error(node, body)) {
                    self.visit_broken(unit, depth, parent, scope);
                    return;
                }
                let name = self.adapter.extract_name(node, self.source);
                let index = self.push(unit, ItemRole::Component { kind, name }, depth, parent);
                if let Some(body) = body {
                    self.visit_members(node, body, depth + 1, index);
                }
            }
            None if node.has_error() => self.visit_broken(unit, depth, parent, scope),
            None => {
                if node.is_named() || !self.is_blank(unit) {
                    self.push(unit, ItemRole::Barrier, depth, parent);
                }
            }
        }
    }

    /// Emit a unit that contains syntax errors. Complete declarations that
    /// error recovery folded into it are emitted as usual; the rest of the
    /// unit becomes `Other` spans around them.
    fn visit_broken(&mut self, unit: SyntaxUnit, depth: usize, parent: Option<usize>, scope: Scope) {
        let column = unit.node.start_position().column;
        let mut recovered = Vec::new();
        self.recover(unit.node, column, scope, &mut recovered);

        let mut cursor = unit.start;
        for inner in recovered {
            self.push_other_span(unit.node, cursor, inner.start, depth, parent);
            self.visit_unit(inner, depth, parent, scope);
            cursor = inner.end;
        }
        self.push_other_span(unit.node, cursor, unit.end, depth, parent);
    }

    /// Collect error-free declarations below `node` that belong to `scope`.
    /// Direct children of an error node always qualify. Deeper ones must
    /// open their own line at `column`, the indentation of the broken unit,
    /// so declarations nested by the author stay inside it.
    fn recover<'t>(&self, node: Node<'t>, column: usize, scope: Scope, out: &mut Vec<SyntaxUnit<'t>>) {
        for unit in self.adapter.children_in_source_order(node) {
            let child = unit.node;
            if unit.is_empty() || child.is_missing() || self.adapter.is_comment(child) {
                continue;
            }
            let aligned = node.is_error() || self.opens_line_at(child, column);
            if aligned && !child.has_error() && self.belongs_to(child, scope) {
                out.push(unit);
            } else if child.child_count() > 0 {
                self.recover(child, column, scope, out);
            }
        }
    }

    fn belongs_to(&self, node: Node, scope: Scope) -> bool {
        match self.adapter.classify(node, self.source, scope) {
            Some(Classification::Component(kind)) => scope == Scope::TopLevel || kind == ComponentKind::Method,
            _ => false,
        }
    }

    fn opens_line_at(&self, node: Node, column: usize) -> bool {
        let start = node.start_byte();
        node.start_position().column == column
            && self
                .source
                .get(start - column.min(start)..start)
                .is_some_and(|indent| indent.iter().all(|b| *b == b' ' || *b == b'\t'))
    }

    /// Visit the children of a type definition along the path down to its
    /// member body. Header tokens become barriers, the body is walked in
    /// `TypeBody` scope.
    fn visit_members(&mut self, node: Node, body: Node, depth: usize, parent: usize) {
        for unit in self.adapter.children_in_source_order(node) {
            let child = unit.node;
            if child == body {
                self.visit_children(body, depth, Some(parent), Scope::TypeBody);
            } else if child.start_byte() <= body.start_byte()
                && body.end_byte() <= child.end_byte()
                && child.child_count() > 0
            {
                self.visit_members(child, body, depth, parent);
            } else if unit.is_empty() || child.is_missing() {
                continue;
            } else if self.adapter.is_comment(child) {
                let docstring = self.adapter.is_docstring(child);
                self.push(unit, ItemRole::Comment { docstring }, depth, Some(parent));
            } else if child.is_named() || !self.is_blank(unit) {
                self.push(unit, ItemRole::Barrier, depth, Some(parent));
            }
        }
    }

    fn is_blank(&self, unit: SyntaxUnit) -> bool {
        self.source
            .get(unit.start..unit.end)
            .is_none_or(|bytes| bytes.iter().all(u8::is_ascii_whitespace))
    }

    /// Push `start..end` of a broken unit as `Other`, trimmed of surrounding
    /// whitespace. Blank spans are dropped.
    fn push_other_span(&mut self, node: Node, start: usize, end: usize, depth: usize, parent: Option<usize>) {
        let Some(bytes) = self.source.get(start..end) else {
            return;
        };
        let Some(first) = bytes.iter().position(|b| !b.is_ascii_whitespace()) else {
            return;
        };
        let last = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).unwrap_or(first);
        let role = ItemRole::Component {
            kind: ComponentKind::Other,
            name: None,
        };
        let unit = SyntaxUnit {
            node,
            start: start + first,
            end: start + last + 1,
        };
        self.push(unit, role, depth, parent);
    }

    fn push(&mut self, unit: SyntaxUnit, role: ItemRole, depth: usize, parent: Option<usize>) -> usize {
        self.items.push(WalkItem {
            role,
            range: ByteRange::new(unit.start, unit.end),
            depth,
            parent,
            node_kind: unit.node.kind().to_string(),
        });
        self.items.len() - 1
    }
}

/// True when some error in `node` lies outside `body`.
fn header_has_error(node: Node, body: Node) -> bool {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().any(|child| {
        if child == body {
            false
        } else if child.start_byte() <= body.start_byte() && body.end_byte() <= child.end_byte() && child.child_count() > 0 {
            header_has_error(child, body)
        } else {
            child.has_error() || child.is_missing()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::python::PythonAdapter;
    use crate::adapter::rust::RustAdapter;
    use crate::document::SourceDocument;
    use crate::parser::parse_document;

    fn walk(adapter: &dyn GrammarAdapter, source: &str) -> Vec<WalkItem> {
        let document = SourceDocument::from_text(source, adapter.language_name());
        let tree = parse_document(&document, adapter).unwrap();
        TreeWalker::new(adapter, document.bytes()).walk(tree.root_node())
    }

    #[test]
    fn test_barriers_between_components() {
        let items = walk(&PythonAdapter::new(), "# note\nprint(1)\ndef f():\n    pass\n");
        let roles: Vec<_> = items.iter().map(|i| &i.role).collect();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0], &ItemRole::Comment { docstring: false });
        assert_eq!(roles[1], &ItemRole::Barrier);
        assert!(matches!(roles[2], ItemRole::Component { kind: ComponentKind::Function, .. }));
    }

    #[test]
    fn test_type_members_link_to_type() {
        let source = "impl A {\n    const N: u8 = 1;\n    fn a(&self) {}\n}\n";
        let items = walk(&RustAdapter::new(), source);
        let method = items
            .iter()
            .find(|i| matches!(i.role, ItemRole::Component { kind: ComponentKind::Method, .. }))
            .unwrap();
        assert_eq!(method.depth, 1);
        assert_eq!(method.parent, Some(0));
        assert!(items.iter().any(|i| i.node_kind == "const_item" && i.role == ItemRole::Barrier));
    }

    #[test]
    fn test_nested_function_stays_inside_broken_function() {
        let source = "def outer():\n    def inner():\n        pass\n    return 1)\n";
        let items = walk(&PythonAdapter::new(), source);
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].role,
            ItemRole::Component {
                kind: ComponentKind::Other,
                name: None
            }
        );
        assert_eq!(items[0].range, ByteRange::new(0, source.trim_end().len()));
    }

    #[test]
    fn test_nested_functions_are_not_listed() {
        let items = walk(&PythonAdapter::new(), "def outer():\n    def inner():\n        pass\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].depth, 0);
    }
}
