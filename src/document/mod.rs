//! Line-oriented view of a Markdown document
//!
//! Architecture: Value Object - A Document is built once from raw text and never mutated
//! - Lines are produced by splitting on `'\n'` only, so a trailing newline yields a final empty line
//! - Carriage returns stay on the line and are removed by edge trimming during classification
//! - All line indices handed out are 0-indexed and only meaningful for this document

pub mod classify;
pub mod regions;

pub use classify::{classify, is_list_item, looks_like_list_marker, trim_line, LineKind};
pub use regions::{fence_spans, frontmatter_close, list_spans, FenceSpan, FenceSpans, ListSpans, Region};

/// An immutable sequence of lines borrowed from the raw document text
#[derive(Debug, Clone)]
pub struct Document<'a> {
    content: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    /// Split raw content into lines. Empty content is a single empty line.
    pub fn new(content: &'a str) -> Self {
        Self { content, lines: content.split('\n').collect() }
    }

    /// The raw text the document was built from
    pub fn content(&self) -> &'a str {
        self.content
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Line at a 0-indexed position
    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    /// Number of lines; never zero
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the final line
    pub fn last_index(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Classification of the line at `index`; out-of-range lines are blank
    pub fn kind(&self, index: usize) -> LineKind {
        self.line(index).map(classify).unwrap_or(LineKind::Blank)
    }

    /// Whether the line at `index` is empty after trimming
    pub fn is_blank(&self, index: usize) -> bool {
        self.line(index).map_or(true, |line| trim_line(line).is_empty())
    }

    /// Whether the line at `index` is an ordered or unordered list item
    pub fn is_list_item(&self, index: usize) -> bool {
        self.line(index).is_some_and(is_list_item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_one_blank_line() {
        let doc = Document::new("");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.last_index(), 0);
        assert!(doc.is_blank(0));
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let doc = Document::new("# Title\nbody\n");
        assert_eq!(doc.lines(), &["# Title", "body", ""]);
        assert_eq!(doc.kind(0), LineKind::Heading);
        assert_eq!(doc.kind(2), LineKind::Blank);
    }

    #[test]
    fn test_carriage_returns_are_kept_on_lines() {
        let doc = Document::new("---\r\ntitle: x\r\n---\r\n");
        assert_eq!(doc.line(0), Some("---\r"));
        assert_eq!(doc.kind(0), LineKind::FrontmatterDelimiter);
        assert_eq!(doc.content(), "---\r\ntitle: x\r\n---\r\n");
    }

    #[test]
    fn test_out_of_range_access() {
        let doc = Document::new("text");
        assert_eq!(doc.line(5), None);
        assert!(doc.is_blank(5));
        assert!(!doc.is_list_item(5));
    }
}
