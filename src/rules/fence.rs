//! Blank lines around fenced code blocks

use super::DocumentRule;
use crate::document::{fence_spans, Document};
use crate::domain::violations::{RuleId, Violation};

/// Requires a blank line before each opening fence and after each closing fence
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceSpacingRule;

impl DocumentRule for FenceSpacingRule {
    fn id(&self) -> RuleId {
        RuleId::FenceSpacing
    }

    fn description(&self) -> &'static str {
        "Fenced code blocks must be surrounded by blank lines"
    }

    fn explanation(&self) -> &'static str {
        "The line above an opening ``` and the line below a closing ``` must be blank. \
         A fence on the first line has nothing above it, and a fence closing on the last \
         line has nothing below it. An unclosed fence runs to the end of the file. \
         Only bare ``` delimiters are recognised; fences with a language tag are ignored.\n\n\
         Passes:\n  text\n\n  ```\n  code\n  ```\n\n  text\n\n\
         Fails:\n  text\n  ```\n  code\n  ```\n  text"
    }

    fn check(&self, document: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let last = document.last_index();

        for span in fence_spans(document) {
            let open = span.open();
            let close = span.close();

            if open > 0 && !document.is_blank(open - 1) {
                violations.push(Violation::new(
                    self.id(),
                    open + 1,
                    format!("Missing blank line before fenced code block at line {}", open + 1),
                ));
            }

            if close < last && !document.is_blank(close + 1) {
                violations.push(Violation::new(
                    self.id(),
                    close + 1,
                    format!("Missing blank line after fenced code block at line {}", close + 1),
                ));
            }
        }

        violations
    }
}
