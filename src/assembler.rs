//! Component assembly and invariant validation
//!
//! Turns walk items plus attachments into the final flat component list and
//! checks the structural guarantees callers rely on before handing it out.

use crate::attach::Attachments;
use crate::component::{Component, ComponentKind};
use crate::document::SourceDocument;
use crate::walker::{ItemRole, WalkItem};
use crate::{Error, Result};

pub struct ComponentAssembler<'d> {
    document: &'d SourceDocument<'d>,
}

impl<'d> ComponentAssembler<'d> {
    pub fn new(document: &'d SourceDocument<'d>) -> Self {
        Self { document }
    }

    /// Build and validate the component list.
    pub fn assemble(&self, items: &[WalkItem], attachments: &Attachments) -> Result<Vec<Component>> {
        let components = self.build(items, attachments);
        match validate(self.document, &components) {
            Ok(()) => Ok(components),
            Err(message) => Err(Error::InvariantViolation { message, components }),
        }
    }

    fn build(&self, items: &[WalkItem], attachments: &Attachments) -> Vec<Component> {
        let mut components = Vec::with_capacity(items.len());
        let mut index_of_item: Vec<Option<usize>> = vec![None; items.len()];

        for (i, item) in items.iter().enumerate() {
            let (kind, name) = match &item.role {
                ItemRole::Component { kind, name } => (*kind, name.clone()),
                ItemRole::Comment { .. } if !attachments.claimed.get(i).copied().unwrap_or(false) => {
                    (ComponentKind::Comment, None)
                }
                _ => continue,
            };

            let lines = self.document.lines().line_range(item.range);
            let mut component = Component::new(kind, item.range, lines).with_node_kind(item.node_kind.clone());
            component.name = name;
            component.depth = item.depth;
            component.parent = item.parent.and_then(|p| index_of_item[p]);
            if let Some(Some(range)) = attachments.leading.get(i) {
                component.leading_comment = Some(*range);
            }

            index_of_item[i] = Some(components.len());
            components.push(component);
        }
        components
    }
}

/// Check every structural guarantee of a component list.
pub fn validate(document: &SourceDocument, components: &[Component]) -> std::result::Result<(), String> {
    let len = document.len();
    let mut last_child_end: Vec<Option<usize>> = vec![None; components.len()];
    let mut last_top_end: Option<usize> = None;

    for (index, component) in components.iter().enumerate() {
        let range = component.bytes;
        if range.is_empty() || range.end > len {
            return Err(format!("component {index} has invalid range {}..{}", range.start, range.end));
        }

        let previous_end = match component.parent {
            None => {
                if component.depth != 0 {
                    return Err(format!("component {index} has depth {} but no parent", component.depth));
                }
                &mut last_top_end
            }
            Some(parent) => {
                let Some(owner) = components.get(parent).filter(|_| parent < index) else {
                    return Err(format!("component {index} points at parent {parent} that does not precede it"));
                };
                if owner.depth + 1 != component.depth {
                    return Err(format!("component {index} is not one level below its parent {parent}"));
                }
                if !owner.bytes.contains(&range) {
                    return Err(format!("component {index} escapes its parent {parent}"));
                }
                &mut last_child_end[parent]
            }
        };

        if previous_end.is_some_and(|end| end > range.start) {
            return Err(format!("component {index} overlaps or precedes its previous sibling"));
        }
        *previous_end = Some(range.end);

        if let Some(comment) = component.leading_comment {
            if comment.is_empty() || comment.end > range.start {
                return Err(format!("leading comment of component {index} does not precede it"));
            }
            let ancestors = ancestors_of(components, index);
            let clash = components
                .iter()
                .enumerate()
                .find(|(other, c)| *other != index && !ancestors.contains(other) && c.bytes.overlaps(&comment));
            if let Some((other, _)) = clash {
                return Err(format!("leading comment of component {index} overlaps component {other}"));
            }
        }
    }
    Ok(())
}

fn ancestors_of(components: &[Component], index: usize) -> Vec<usize> {
    let mut ancestors = Vec::new();
    let mut current = components[index].parent;
    while let Some(parent) = current {
        if ancestors.contains(&parent) {
            break;
        }
        ancestors.push(parent);
        current = components.get(parent).and_then(|c| c.parent);
    }
    ancestors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ByteRange, LineRange};

    fn component(kind: ComponentKind, start: usize, end: usize) -> Component {
        Component::new(kind, ByteRange::new(start, end), LineRange::new(1, 1))
    }

    #[test]
    fn test_valid_nesting() {
        let document = SourceDocument::from_text("class A { f() {} g() {} }", "javascript");
        let components = vec![
            component(ComponentKind::TypeDefinition, 0, 25),
            component(ComponentKind::Method, 10, 16).with_parent(0, 1),
            component(ComponentKind::Method, 17, 23).with_parent(0, 1),
        ];
        assert_eq!(validate(&document, &components), Ok(()));
    }

    #[test]
    fn test_overlapping_siblings_rejected() {
        let document = SourceDocument::from_text("0123456789", "c");
        let components = vec![
            component(ComponentKind::Function, 0, 5),
            component(ComponentKind::Function, 4, 8),
        ];
        assert!(validate(&document, &components).unwrap_err().contains("overlaps"));
    }

    #[test]
    fn test_child_outside_parent_rejected() {
        let document = SourceDocument::from_text("0123456789", "c");
        let components = vec![
            component(ComponentKind::TypeDefinition, 0, 5),
            component(ComponentKind::Method, 3, 7).with_parent(0, 1),
        ];
        assert!(validate(&document, &components).unwrap_err().contains("escapes"));
    }

    #[test]
    fn test_leading_comment_overlap_rejected() {
        let document = SourceDocument::from_text("0123456789", "c");
        let components = vec![
            component(ComponentKind::Function, 0, 4),
            component(ComponentKind::Function, 5, 9).with_leading_comment(ByteRange::new(2, 5)),
        ];
        assert!(validate(&document, &components).unwrap_err().contains("overlaps component 0"));
    }

    #[test]
    fn test_violation_keeps_components() {
        let document = SourceDocument::from_text("0123456789", "c");
        let items = vec![
            WalkItem {
                role: ItemRole::Component { kind: ComponentKind::Function, name: None },
                range: ByteRange::new(0, 6),
                depth: 0,
                parent: None,
                node_kind: "x".to_string(),
            },
            WalkItem {
                role: ItemRole::Component { kind: ComponentKind::Function, name: None },
                range: ByteRange::new(5, 9),
                depth: 0,
                parent: None,
                node_kind: "x".to_string(),
            },
        ];
        let err = ComponentAssembler::new(&document)
            .assemble(&items, &Attachments::none(items.len()))
            .unwrap_err();
        match err {
            Error::InvariantViolation { components, .. } => assert_eq!(components.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
