//! Segmentation pipeline
//!
//! Registry lookup, parse, walk, attach, assemble, filter. Each call works on
//! its own document and tree; the segmenter itself is read-only and can be
//! shared across threads.

use crate::adapter::{GrammarAdapter, LanguageRegistry, default_registry};
use crate::assembler::ComponentAssembler;
use crate::attach::{Attachments, CommentAttacher};
use crate::component::{Component, ComponentKind};
use crate::document::SourceDocument;
use crate::output::filter_kinds;
use crate::parser::{error_ranges, parse_document};
use crate::walker::{ItemRole, TreeWalker};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tree_sitter::Tree;

/// Caller-facing knobs for one segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentOptions {
    /// Kinds to keep in the output (default: all)
    pub include_kinds: BTreeSet<ComponentKind>,
    /// Attach preceding comments to components (default: true)
    pub attach_comments: bool,
    /// Blank lines tolerated between a comment and its component (default: 1)
    pub max_blank_lines_for_attachment: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            include_kinds: ComponentKind::all().iter().copied().collect(),
            attach_comments: true,
            max_blank_lines_for_attachment: 1,
        }
    }
}

impl SegmentOptions {
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.include_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_attach_comments(mut self, attach: bool) -> Self {
        self.attach_comments = attach;
        self
    }

    pub fn with_max_blank_lines(mut self, max: usize) -> Self {
        self.max_blank_lines_for_attachment = max;
        self
    }

    /// True when no kind is filtered out
    pub fn includes_all_kinds(&self) -> bool {
        ComponentKind::all().iter().all(|k| self.include_kinds.contains(k))
    }
}

/// Result of segmenting with alternate-grammar fallback.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Language whose grammar produced the components
    pub language: String,
    pub components: Vec<Component>,
    /// False when the chosen grammar still reported error nodes
    pub clean: bool,
}

/// Runs the segmentation pipeline against a language registry.
pub struct Segmenter {
    registry: LanguageRegistry,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl Segmenter {
    pub fn new(registry: LanguageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Segment `source` with the adapter resolved from `language`.
    pub fn segment(&self, source: &[u8], language: &str, options: &SegmentOptions) -> Result<Vec<Component>> {
        let adapter = self.registry.resolve(language)?;
        let document = SourceDocument::new(source, adapter.language_name())?;
        self.segment_document(&document, adapter, options)
    }

    /// Segment an already constructed document.
    pub fn segment_document(
        &self,
        document: &SourceDocument,
        adapter: &dyn GrammarAdapter,
        options: &SegmentOptions,
    ) -> Result<Vec<Component>> {
        let tree = parse_document(document, adapter)?;
        self.run(document, adapter, &tree, options)
    }

    /// Try every adapter claiming `hint` and keep the first whose parse is
    /// free of errors, falling back to the first candidate otherwise.
    /// This is how `.h` files are retried as C++ when C rejects them.
    pub fn segment_with_fallback(&self, source: &[u8], hint: &str, options: &SegmentOptions) -> Result<Segmentation> {
        let candidates = self.registry.candidates(hint);
        let Some(primary) = candidates.first().copied() else {
            return Err(Error::unsupported(hint));
        };
        let document = SourceDocument::new(source, primary.language_name())?;

        let mut first: Option<(&dyn GrammarAdapter, Tree)> = None;
        for adapter in &candidates {
            let tree = parse_document(&document, *adapter)?;
            if !tree.root_node().has_error() {
                let components = self.run(&document, *adapter, &tree, options)?;
                return Ok(Segmentation {
                    language: adapter.language_name().to_string(),
                    components,
                    clean: true,
                });
            }
            if candidates.len() > 1 {
                tracing::debug!("{} grammar reported errors for {}", adapter.language_name(), hint);
            }
            if first.is_none() {
                first = Some((*adapter, tree));
            }
        }

        let (adapter, tree) = first.ok_or_else(|| Error::unsupported(hint))?;
        if candidates.len() > 1 {
            tracing::warn!(
                "no grammar parsed {} cleanly; keeping {}",
                hint,
                adapter.language_name()
            );
        }
        let components = self.run(&document, adapter, &tree, options)?;
        Ok(Segmentation {
            language: adapter.language_name().to_string(),
            components,
            clean: false,
        })
    }

    fn run(
        &self,
        document: &SourceDocument,
        adapter: &dyn GrammarAdapter,
        tree: &Tree,
        options: &SegmentOptions,
    ) -> Result<Vec<Component>> {
        let root = tree.root_node();
        let errors = error_ranges(root);
        let items = TreeWalker::new(adapter, document.bytes()).walk(root);

        let mut attachments = if options.attach_comments {
            CommentAttacher::new(document, options.max_blank_lines_for_attachment).attach(&items)
        } else {
            Attachments::none(items.len())
        };
        // comments of components that will be filtered out stay visible
        if !options.includes_all_kinds() {
            for (index, item) in items.iter().enumerate() {
                if let ItemRole::Component { kind, .. } = &item.role {
                    if !options.include_kinds.contains(kind) {
                        attachments.release(&items, index);
                    }
                }
            }
        }
        let components = ComponentAssembler::new(document).assemble(&items, &attachments)?;

        tracing::debug!(
            "segmented {} bytes of {}: {} items, {} components, {} error regions",
            document.len(),
            adapter.language_name(),
            items.len(),
            components.len(),
            errors.len()
        );

        if options.includes_all_kinds() {
            Ok(components)
        } else {
            Ok(filter_kinds(&components, &options.include_kinds))
        }
    }
}
