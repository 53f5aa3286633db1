//! Region scanning over a classified document
//!
//! Each scan is a single forward pass. Fence and list scans are exposed as
//! iterators so a rule can walk spans without materialising them all.

use super::{Document, LineKind};
use serde::{Deserialize, Serialize};

/// Half-open range of line indices `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "regions are never empty");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Index of the final line inside the region
    pub fn last(&self) -> usize {
        self.end - 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// A fenced code block from its opening delimiter through its close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FenceSpan {
    pub region: Region,
    /// False when the document ended before a closing delimiter
    pub terminated: bool,
}

impl FenceSpan {
    /// Index of the opening delimiter
    pub fn open(&self) -> usize {
        self.region.start
    }

    /// Index of the closing delimiter, or the document's last line when unterminated
    pub fn close(&self) -> usize {
        self.region.last()
    }
}

/// Index of the line closing the frontmatter: the first bare `---` after line 0
pub fn frontmatter_close(document: &Document<'_>) -> Option<usize> {
    (1..document.line_count())
        .find(|&index| document.kind(index) == LineKind::FrontmatterDelimiter)
}

/// Iterate fence spans in document order
pub fn fence_spans<'d, 'a>(document: &'d Document<'a>) -> FenceSpans<'d, 'a> {
    FenceSpans { document, next: 0 }
}

/// Iterate maximal runs of list-item lines in document order
pub fn list_spans<'d, 'a>(document: &'d Document<'a>) -> ListSpans<'d, 'a> {
    ListSpans { document, next: 0 }
}

/// Iterator produced by [`fence_spans`]
#[derive(Debug)]
pub struct FenceSpans<'d, 'a> {
    document: &'d Document<'a>,
    next: usize,
}

impl Iterator for FenceSpans<'_, '_> {
    type Item = FenceSpan;

    fn next(&mut self) -> Option<FenceSpan> {
        let doc = self.document;
        let count = doc.line_count();

        let open = (self.next..count).find(|&i| doc.kind(i) == LineKind::FenceDelimiter)?;
        let close = (open + 1..count).find(|&j| doc.kind(j) == LineKind::FenceDelimiter);

        let span = match close {
            Some(close) => FenceSpan { region: Region::new(open, close + 1), terminated: true },
            None => FenceSpan { region: Region::new(open, count), terminated: false },
        };

        // Resume after the close so it is never mistaken for an opener
        self.next = span.region.end;
        Some(span)
    }
}

/// Iterator produced by [`list_spans`]
#[derive(Debug)]
pub struct ListSpans<'d, 'a> {
    document: &'d Document<'a>,
    next: usize,
}

impl Iterator for ListSpans<'_, '_> {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        let doc = self.document;
        let count = doc.line_count();

        let start = (self.next..count).find(|&i| doc.is_list_item(i))?;
        let end = (start + 1..count).find(|&j| !doc.is_list_item(j)).unwrap_or(count);

        self.next = end;
        Some(Region::new(start, end))
    }
}
