//! Stateless line classification
//!
//! Each line maps to exactly one [`LineKind`]; the first matching check wins:
//! triple dash, bare fence, unordered item, ordered item, heading, blank, other.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Ordered list item, tested against the untrimmed line
    static ref ORDERED_ITEM: Regex =
        Regex::new(r"^[\s\x{FEFF}]*[0-9]+\.[\s\x{FEFF}]").expect("ordered list pattern is valid");

    /// Any list marker followed by whitespace, tested against the trimmed line
    static ref LIST_MARKER: Regex =
        Regex::new(r"^(?:[-*]|[0-9]+\.)[\s\x{FEFF}]").expect("list marker pattern is valid");
}

const TRIPLE_DASH: &str = "---";
const FENCE: &str = "```";
const BOM: char = '\u{feff}';

/// Structural role of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// A bare `---`. Only its position decides whether it opens or closes frontmatter.
    FrontmatterDelimiter,
    /// A bare triple-backtick line. Fences carrying an info string are `Other`.
    FenceDelimiter,
    UnorderedListItem,
    OrderedListItem,
    Heading,
    Blank,
    Other,
}

impl LineKind {
    pub fn is_list_item(self) -> bool {
        matches!(self, Self::UnorderedListItem | Self::OrderedListItem)
    }
}

/// Strip edge whitespace, counting a byte order mark as whitespace
pub fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == BOM)
}

/// Classify a raw line
pub fn classify(line: &str) -> LineKind {
    let trimmed = trim_line(line);

    if trimmed == TRIPLE_DASH {
        LineKind::FrontmatterDelimiter
    } else if trimmed == FENCE {
        LineKind::FenceDelimiter
    } else if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
        LineKind::UnorderedListItem
    } else if ORDERED_ITEM.is_match(line) {
        LineKind::OrderedListItem
    } else if trimmed.starts_with('#') {
        LineKind::Heading
    } else if trimmed.is_empty() {
        LineKind::Blank
    } else {
        LineKind::Other
    }
}

/// Whether a line is an ordered or unordered list item
pub fn is_list_item(line: &str) -> bool {
    classify(line).is_list_item()
}

/// Looser list test used to suppress "missing blank line before list".
///
/// Also accepts a marker followed by any whitespace (`-\tx`), which
/// [`classify`] does not treat as a list item.
pub fn looks_like_list_marker(line: &str) -> bool {
    LIST_MARKER.is_match(trim_line(line)) || is_list_item(line)
}
