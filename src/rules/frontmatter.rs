//! Frontmatter closure rule
//!
//! Only presence and closure are checked; the YAML between the delimiters is never parsed.

use super::DocumentRule;
use crate::document::{frontmatter_close, Document};
use crate::domain::violations::{RuleId, Violation};

/// Exact prefix a document must start with to open frontmatter
const OPENING: &str = "---\n";

pub const MISSING_OPENING: &str = "File does not start with proper YAML frontmatter";
pub const NOT_CLOSED: &str = "YAML frontmatter not properly closed";

/// Requires a `---` first line and a later closing `---` line
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterClosureRule;

impl DocumentRule for FrontmatterClosureRule {
    fn id(&self) -> RuleId {
        RuleId::FrontmatterClosure
    }

    fn description(&self) -> &'static str {
        "Documents must open with YAML frontmatter that is closed by a later `---` line"
    }

    fn explanation(&self) -> &'static str {
        "The raw file must begin with exactly `---` followed by a line break, and some \
         later line must consist of `---` alone. The two checks are independent, so a \
         file may fail either or both. Frontmatter content is not validated.\n\n\
         Passes:\n  ---\n  title: Guide\n  ---\n\n\
         Fails:\n  # Guide   (no frontmatter at all)"
    }

    fn check(&self, document: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !document.content().starts_with(OPENING) {
            violations.push(Violation::new(self.id(), 1, MISSING_OPENING));
        }

        if frontmatter_close(document).is_none() {
            violations.push(Violation::new(self.id(), 1, NOT_CLOSED));
        }

        violations
    }
}
