//! Leading comment attachment
//!
//! A component claims the run of comments directly above it when every gap
//! in the run is whitespace with at most `max_blank_lines` blank lines, no
//! other sibling interrupts the run, and none of the comments is a docstring
//! or trails the sibling before it on the same line.

use crate::component::ByteRange;
use crate::document::SourceDocument;
use crate::walker::{ItemRole, WalkItem};

/// Per-item attachment results, indexed like the walk items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    /// Leading comment range for each component item
    pub leading: Vec<Option<ByteRange>>,
    /// Comment items absorbed into some component's leading comment
    pub claimed: Vec<bool>,
}

impl Attachments {
    /// No comment attached anywhere
    pub fn none(len: usize) -> Self {
        Self {
            leading: vec![None; len],
            claimed: vec![false; len],
        }
    }

    /// Detach the leading comment of `items[component]`, turning its
    /// comments back into standalone items.
    pub fn release(&mut self, items: &[WalkItem], component: usize) {
        let Some(range) = self.leading.get_mut(component).and_then(Option::take) else {
            return;
        };
        for (index, item) in items.iter().enumerate() {
            if item.is_attachable_comment() && range.contains(&item.range) {
                self.claimed[index] = false;
            }
        }
    }
}

pub struct CommentAttacher<'d> {
    document: &'d SourceDocument<'d>,
    max_blank_lines: usize,
}

impl<'d> CommentAttacher<'d> {
    pub fn new(document: &'d SourceDocument<'d>, max_blank_lines: usize) -> Self {
        Self {
            document,
            max_blank_lines,
        }
    }

    pub fn attach(&self, items: &[WalkItem]) -> Attachments {
        let mut attachments = Attachments::none(items.len());

        for (index, item) in items.iter().enumerate() {
            if !item.is_component() {
                continue;
            }
            let run = self.comment_run(items, index);
            let (Some(&first), Some(&last)) = (run.last(), run.first()) else {
                continue;
            };
            for &comment in &run {
                attachments.claimed[comment] = true;
            }
            attachments.leading[index] = Some(ByteRange::new(items[first].range.start, items[last].range.end));
        }
        attachments
    }

    /// Comment items attached to `items[index]`, nearest first.
    fn comment_run(&self, items: &[WalkItem], index: usize) -> Vec<usize> {
        let mut run = Vec::new();
        let mut anchor = items[index].range.start;
        let mut current = index;

        while let Some(candidate) = previous_sibling(items, current) {
            let comment = &items[candidate];
            if !comment.is_attachable_comment() {
                break;
            }
            match self.document.blank_lines_between(comment.range.end, anchor) {
                Some(blank) if blank <= self.max_blank_lines => {}
                _ => break,
            }
            if self.is_trailing(items, candidate) {
                break;
            }
            run.push(candidate);
            anchor = comment.range.start;
            current = candidate;
        }
        run
    }

    /// A comment that shares its line with the end of an earlier non-comment
    /// sibling belongs to that sibling. Comments in between on the same line
    /// are looked through.
    fn is_trailing(&self, items: &[WalkItem], comment: usize) -> bool {
        let line = self.document.line_of(items[comment].range.start);
        let mut current = comment;
        while let Some(prev) = previous_sibling(items, current) {
            if self.document.last_line_of(items[prev].range) != line {
                return false;
            }
            if !matches!(items[prev].role, ItemRole::Comment { .. }) {
                return true;
            }
            current = prev;
        }
        false
    }
}

/// Nearest earlier item in the same scope. Items nested deeper (members of
/// an earlier type) are skipped; reaching a shallower item ends the scope.
pub fn previous_sibling(items: &[WalkItem], index: usize) -> Option<usize> {
    let depth = items[index].depth;
    let parent = items[index].parent;
    for candidate in (0..index).rev() {
        let item = &items[candidate];
        if item.depth > depth {
            continue;
        }
        if item.depth < depth || item.parent != parent {
            return None;
        }
        return Some(candidate);
    }
    None
}
