//! Tree-sitter parsing
//!
//! A grammar that fails to load, or a parse that yields no tree at all, is a
//! total failure (`UnparsableDocument`). Error and missing nodes inside an
//! otherwise produced tree are not failures; they are reported here for
//! diagnostics and turned into `Other` components by the walker.

use crate::adapter::GrammarAdapter;
use crate::component::ByteRange;
use crate::document::SourceDocument;
use crate::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parse a document with the adapter's grammar.
pub fn parse_document(document: &SourceDocument, adapter: &dyn GrammarAdapter) -> Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&adapter.grammar()).map_err(|e| {
        Error::unparsable(format!(
            "failed to load {} grammar: {}",
            adapter.language_name(),
            e
        ))
    })?;

    parser.parse(document.bytes(), None).ok_or_else(|| {
        Error::unparsable(format!(
            "{} parser produced no tree",
            adapter.language_name()
        ))
    })
}

/// Byte ranges of every error and missing node under `node`, outermost first.
pub fn error_ranges(node: Node) -> Vec<ByteRange> {
    let mut ranges = Vec::new();
    if node.has_error() {
        collect_errors(node, &mut ranges);
    }
    ranges
}

fn collect_errors(node: Node, ranges: &mut Vec<ByteRange>) {
    if node.is_error() || node.is_missing() {
        ranges.push(ByteRange::new(node.start_byte(), node.end_byte()));
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            collect_errors(child, ranges);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::python::PythonAdapter;

    #[test]
    fn test_parse_clean_document() {
        let document = SourceDocument::from_text("def f():\n    return 1\n", "python");
        let tree = parse_document(&document, &PythonAdapter::new()).unwrap();
        assert_eq!(tree.root_node().kind(), "module");
        assert!(error_ranges(tree.root_node()).is_empty());
    }

    #[test]
    fn test_error_ranges_reported() {
        let document = SourceDocument::from_text("def f(:\n    pass\n", "python");
        let tree = parse_document(&document, &PythonAdapter::new()).unwrap();
        assert!(!error_ranges(tree.root_node()).is_empty());
    }
}
