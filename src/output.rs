//! Output formatting
//!
//! Pure transforms from a component list into what callers consume:
//! serializable records, extracted text slices, and gap/component pieces
//! that put the original document back together.

use crate::Result;
use crate::component::{ByteRange, Component, ComponentKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keep only components of the given kinds.
///
/// Parent indices are remapped into the filtered list; a parent that was
/// filtered out becomes `None`. Depth is left as segmented.
pub fn filter_kinds(components: &[Component], kinds: &BTreeSet<ComponentKind>) -> Vec<Component> {
    let mut remap: Vec<Option<usize>> = vec![None; components.len()];
    let mut kept = Vec::new();

    for (index, component) in components.iter().enumerate() {
        if !kinds.contains(&component.kind) {
            continue;
        }
        let mut component = component.clone();
        component.parent = component.parent.and_then(|p| remap.get(p).copied().flatten());
        remap[index] = Some(kept.len());
        kept.push(component);
    }
    kept
}

/// Flat, serializable view of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub index: usize,
    pub kind: ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub depth: usize,
    pub parent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_comment: Option<ByteRange>,
}

pub fn to_records(components: &[Component]) -> Vec<ComponentRecord> {
    components
        .iter()
        .enumerate()
        .map(|(index, c)| ComponentRecord {
            index,
            kind: c.kind,
            name: c.name.clone(),
            start_byte: c.bytes.start,
            end_byte: c.bytes.end,
            start_line: c.lines.start,
            end_line: c.lines.end,
            depth: c.depth,
            parent: c.parent,
            leading_comment: c.leading_comment,
        })
        .collect()
}

/// Text of one component, as written by `split`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSlice {
    pub index: usize,
    pub kind: ComponentKind,
    pub name: Option<String>,
    pub text: String,
}

/// Extract each component's text. With `include_leading_comment` the slice
/// starts at the attached comment instead of the component itself.
pub fn to_slices(source: &str, components: &[Component], include_leading_comment: bool) -> Vec<TextSlice> {
    components
        .iter()
        .enumerate()
        .map(|(index, c)| {
            let range = if include_leading_comment {
                c.extended_range()
            } else {
                c.bytes
            };
            TextSlice {
                index,
                kind: c.kind,
                name: c.name.clone(),
                text: source.get(range.start..range.end).unwrap_or_default().to_string(),
            }
        })
        .collect()
}

/// A contiguous run of the document: either a component or the bytes
/// between components (whitespace, attached comments, unmapped code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Gap(ByteRange),
    Component { index: usize, range: ByteRange },
}

impl Piece {
    pub fn range(&self) -> ByteRange {
        match self {
            Piece::Gap(range) => *range,
            Piece::Component { range, .. } => *range,
        }
    }
}

/// Cut a document of `len` bytes into ordered pieces around its outermost
/// components. Components nested inside an earlier piece are skipped.
pub fn pieces(len: usize, components: &[Component]) -> Vec<Piece> {
    let mut out = Vec::new();
    let mut cursor = 0;

    for (index, component) in components.iter().enumerate() {
        let range = component.bytes;
        if range.start < cursor || range.end > len {
            continue;
        }
        if range.start > cursor {
            out.push(Piece::Gap(ByteRange::new(cursor, range.start)));
        }
        out.push(Piece::Component { index, range });
        cursor = range.end;
    }
    if cursor < len {
        out.push(Piece::Gap(ByteRange::new(cursor, len)));
    }
    out
}

/// Concatenate the pieces back into text.
pub fn reassemble(source: &str, pieces: &[Piece]) -> String {
    let mut text = String::with_capacity(source.len());
    for piece in pieces {
        let range = piece.range();
        text.push_str(source.get(range.start..range.end).unwrap_or_default());
    }
    text
}

/// Pretty-printed JSON array of records.
pub fn render_json(records: &[ComponentRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::LineRange;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "// a\nclass A { m() {} }\nfunction f() {}\n";

    fn components() -> Vec<Component> {
        vec![
            Component::new(ComponentKind::TypeDefinition, ByteRange::new(5, 23), LineRange::new(2, 2))
                .with_name("A")
                .with_leading_comment(ByteRange::new(0, 4)),
            Component::new(ComponentKind::Method, ByteRange::new(15, 21), LineRange::new(2, 2))
                .with_name("m")
                .with_parent(0, 1),
            Component::new(ComponentKind::Function, ByteRange::new(24, 39), LineRange::new(3, 3)).with_name("f"),
        ]
    }

    #[test]
    fn test_filter_remaps_parents() {
        let only_methods: BTreeSet<_> = [ComponentKind::Method].into_iter().collect();
        let filtered = filter_kinds(&components(), &only_methods);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].parent, None);
        assert_eq!(filtered[0].depth, 1);

        let types_and_methods: BTreeSet<_> = [ComponentKind::TypeDefinition, ComponentKind::Method]
            .into_iter()
            .collect();
        let filtered = filter_kinds(&components(), &types_and_methods);
        assert_eq!(filtered[1].parent, Some(0));
    }

    #[test]
    fn test_slices_with_and_without_comments() {
        let with = to_slices(SOURCE, &components(), true);
        assert_eq!(with[0].text, "// a\nclass A { m() {} }");
        let without = to_slices(SOURCE, &components(), false);
        assert_eq!(without[0].text, "class A { m() {} }");
        assert_eq!(without[1].text, "m() {}");
    }

    #[test]
    fn test_pieces_reassemble_document() {
        let pieces = pieces(SOURCE.len(), &components());
        let indices: Vec<_> = pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Component { index, .. } => Some(*index),
                Piece::Gap(_) => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(reassemble(SOURCE, &pieces), SOURCE);
    }

    #[test]
    fn test_records_render_as_json() {
        let records = to_records(&components());
        assert_eq!(records[1].parent, Some(0));
        assert_eq!(records[2].start_line, 3);

        let json = render_json(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "type");
        assert_eq!(value[0]["leading_comment"]["end"], 4);
        assert!(value[2].get("leading_comment").is_none());
    }
}
