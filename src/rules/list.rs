//! Blank lines around lists
//!
//! The "after" message reports the 0-indexed number of the line following the
//! list, which reads as the last list line when taken as 1-indexed. Fence
//! messages report the 1-indexed line instead; both formats are relied upon by
//! existing users and stay as they are.

use super::DocumentRule;
use crate::document::{list_spans, looks_like_list_marker, trim_line, Document};
use crate::domain::violations::{RuleId, Violation};

/// Requires a blank line before and after each run of list items
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSpacingRule;

impl DocumentRule for ListSpacingRule {
    fn id(&self) -> RuleId {
        RuleId::ListSpacing
    }

    fn description(&self) -> &'static str {
        "Lists must be surrounded by blank lines"
    }

    fn explanation(&self) -> &'static str {
        "A run of consecutive list items (`- `, `* ` or `N. `, mixed freely) needs a \
         blank line above it unless the line above already looks like a list item, and \
         a blank line below it unless the next line is a heading or the file ends.\n\n\
         Passes:\n  Intro\n\n  - one\n  - two\n\n  Outro\n\n\
         Fails:\n  Intro\n  - one\n  - two\n  Outro"
    }

    fn check(&self, document: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for span in list_spans(document) {
            let start = span.start;

            if start > 0 {
                let previous = start - 1;
                let suppressed = document.line(previous).is_some_and(looks_like_list_marker);

                if !document.is_blank(previous) && !suppressed {
                    violations.push(Violation::new(
                        self.id(),
                        start + 1,
                        format!("Missing blank line before list at line {}", start + 1),
                    ));
                }
            }

            // `end` is the first line after the list, if the document goes on
            if let Some(next) = document.line(span.end) {
                let next = trim_line(next);
                if !next.is_empty() && !next.starts_with('#') {
                    violations.push(Violation::new(
                        self.id(),
                        span.end,
                        format!("Missing blank line after list at line {}", span.end),
                    ));
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(lines: &[&str]) -> Vec<String> {
        let content = lines.join("\n");
        ListSpacingRule
            .check(&Document::new(&content))
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn test_padded_list_is_clean() {
        assert!(messages(&["para", "", "- a", "- b", "", "para"]).is_empty());
    }

    #[test]
    fn test_list_squeezed_between_paragraphs() {
        assert_eq!(
            messages(&["para", "- item1", "- item2", "more text"]),
            vec!["Missing blank line before list at line 2", "Missing blank line after list at line 3"]
        );
    }

    #[test]
    fn test_heading_after_list_is_allowed() {
        assert!(messages(&["", "- a", "## Next"]).is_empty());
    }

    #[test]
    fn test_list_at_document_edges() {
        assert!(messages(&["- a", "- b"]).is_empty());
        assert!(messages(&["1. a", "2. b", ""]).is_empty());
    }

    #[test]
    fn test_mixed_markers_form_one_list() {
        assert_eq!(
            messages(&["text", "- a", "1. b", "* c", "text"]),
            vec!["Missing blank line before list at line 2", "Missing blank line after list at line 4"]
        );
    }

    #[test]
    fn test_list_like_previous_line_suppresses_before() {
        // `-\t` is not a list item but still looks like one
        assert_eq!(messages(&["-\tloose", "- a", "", "x"]), Vec::<String>::new());
    }

    #[test]
    fn test_separate_lists() {
        assert_eq!(
            messages(&["- a", "text", "- b"]),
            vec![
                "Missing blank line after list at line 1",
                "Missing blank line before list at line 3",
            ]
        );
    }

    #[test]
    fn test_after_violation_line_uses_list_end() {
        let content = ["", "- a", "- b", "tail"].join("\n");
        let violations = ListSpacingRule.check(&Document::new(&content));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line_number, 3);
    }

    #[test]
    fn test_empty_document() {
        assert!(messages(&[""]).is_empty());
    }
}
