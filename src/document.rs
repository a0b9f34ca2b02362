//! Source documents and their line index
//!
//! A `SourceDocument` is the immutable input to one segmentation pass. The
//! line index is built once on construction and answers byte-offset to line
//! queries by binary search.

use crate::component::{ByteRange, LineRange};
use crate::{Error, Result};

/// Byte offsets at which each line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: text.len(),
        }
    }

    /// 1-based line containing `offset`. Offsets past the end map to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// Inclusive line span of a half-open byte range.
    pub fn line_range(&self, range: ByteRange) -> LineRange {
        let start = self.line_of(range.start);
        let end = if range.end > range.start {
            self.line_of(range.end - 1)
        } else {
            start
        };
        LineRange::new(start, end)
    }

    /// Number of lines in the document
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// One file's source bytes, language and line index.
#[derive(Debug, Clone)]
pub struct SourceDocument<'a> {
    text: &'a str,
    language: String,
    lines: LineIndex,
}

impl<'a> SourceDocument<'a> {
    /// Wrap raw bytes. Fails when the bytes are not UTF-8, since grammar
    /// ranges could otherwise split characters.
    pub fn new(source: &'a [u8], language: impl Into<String>) -> Result<Self> {
        let text = std::str::from_utf8(source)
            .map_err(|e| Error::unparsable(format!("source is not valid UTF-8: {e}")))?;
        Ok(Self::from_text(text, language))
    }

    pub fn from_text(text: &'a str, language: impl Into<String>) -> Self {
        Self {
            text,
            language: language.into(),
            lines: LineIndex::new(text),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    /// Line of the last byte inside `range`
    pub fn last_line_of(&self, range: ByteRange) -> usize {
        self.lines.line_range(range).end
    }

    pub fn slice(&self, range: ByteRange) -> Option<&'a str> {
        self.text.get(range.start..range.end)
    }

    /// Count the blank lines separating `end` from `next_start`, or `None`
    /// when anything other than whitespace sits between them.
    pub fn blank_lines_between(&self, end: usize, next_start: usize) -> Option<usize> {
        let gap = self.text.get(end..next_start)?;
        if !gap.chars().all(char::is_whitespace) {
            return None;
        }
        let last = self.line_of(end.saturating_sub(1));
        let next = self.line_of(next_start);
        Some(next.saturating_sub(last + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(6), 3);
        assert_eq!(index.line_of(7), 4);
        assert_eq!(index.line_of(100), 4);
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_line_range_excludes_trailing_newline() {
        let index = LineIndex::new("fn a() {}\nfn b() {}\n");
        assert_eq!(index.line_range(ByteRange::new(0, 10)), LineRange::new(1, 1));
        assert_eq!(index.line_range(ByteRange::new(0, 11)), LineRange::new(1, 2));
    }

    #[test]
    fn test_blank_lines_between() {
        let doc = SourceDocument::from_text("// c\n\n\nint x;", "c");
        assert_eq!(doc.blank_lines_between(4, 7), Some(2));

        let doc = SourceDocument::from_text("// c\nint x;", "c");
        assert_eq!(doc.blank_lines_between(4, 5), Some(0));

        let doc = SourceDocument::from_text("/* c */ int x;", "c");
        assert_eq!(doc.blank_lines_between(7, 8), Some(0));

        let doc = SourceDocument::from_text("// c\n;\nint x;", "c");
        assert_eq!(doc.blank_lines_between(4, 7), None);
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let err = SourceDocument::new(&[0xff, 0xfe], "c").unwrap_err();
        assert!(matches!(err, Error::UnparsableDocument(_)));
    }
}
