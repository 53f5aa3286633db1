//! Behaviour of the three document rules through the public API

use markdown_guardian::{check_document, check_documents, DocumentReport, RuleId};
use rstest::rstest;

const MISSING_OPENING: &str = "File does not start with proper YAML frontmatter";
const NOT_CLOSED: &str = "YAML frontmatter not properly closed";

fn check_lines(lines: &[&str]) -> DocumentReport {
    check_document("doc.md", &lines.join("\n"))
}

fn messages(report: &DocumentReport, rule: RuleId) -> Vec<&str> {
    report.violations_for(rule).iter().map(|v| v.message.as_str()).collect()
}

#[rstest]
#[case("")]
#[case("\n")]
#[case("---")]
#[case("```")]
#[case("```\n```\n```")]
#[case("- \n* \n1. ")]
#[case("\u{feff}---\n\u{00e9}\n---")]
#[case("\r\n\r\n- a\r\n```\r\n")]
fn rules_never_fail_on_odd_input(#[case] content: &str) {
    let report = check_document("odd.md", content);
    assert!(report.violation_count() <= content.lines().count() * 2 + 2);
}

#[test]
fn closed_frontmatter_is_clean() {
    let report = check_document("doc.md", "---\ntitle: Guide\nauthor: me\n---\n\n# Guide\n");
    assert!(report.frontmatter.is_empty());
}

#[rstest]
#[case::no_closer("---\ntitle: Guide\n", vec![NOT_CLOSED])]
#[case::malformed_opener_with_closer("--- \ntitle: Guide\n---\n", vec![MISSING_OPENING])]
#[case::malformed_opener_without_closer("--- \ntitle: Guide\n", vec![MISSING_OPENING, NOT_CLOSED])]
#[case::crlf_line_endings("---\r\ntitle: Guide\r\n---\r\n", vec![MISSING_OPENING])]
#[case::no_frontmatter("# Guide\n", vec![MISSING_OPENING, NOT_CLOSED])]
fn frontmatter_failures(#[case] content: &str, #[case] expected: Vec<&str>) {
    let report = check_document("doc.md", content);
    assert_eq!(messages(&report, RuleId::FrontmatterClosure), expected);
    assert!(report.frontmatter.iter().all(|v| v.line_number == 1));
}

#[test]
fn padded_fence_is_clean() {
    let report = check_lines(&["text", "", "```", "code", "```", "", "text"]);
    assert!(report.fences.is_empty());
}

#[test]
fn fence_missing_blank_before() {
    let report = check_lines(&["text", "```", "code", "```", "", "text"]);
    assert_eq!(
        messages(&report, RuleId::FenceSpacing),
        vec!["Missing blank line before fenced code block at line 2"]
    );
}

#[test]
fn fence_with_language_tag_is_not_a_delimiter() {
    let report = check_lines(&["text", "```rust", "code", "```", "text"]);

    // The bare closer opens an unterminated block instead
    assert_eq!(
        messages(&report, RuleId::FenceSpacing),
        vec!["Missing blank line before fenced code block at line 4"]
    );
}

#[test]
fn list_adjacent_to_paragraphs() {
    let report = check_lines(&["para", "- item1", "- item2", "more text"]);
    assert_eq!(
        messages(&report, RuleId::ListSpacing),
        vec!["Missing blank line before list at line 2", "Missing blank line after list at line 3"]
    );
}

#[rstest]
#[case::dash_then_number(&["text", "- a", "1. b", "text"])]
#[case::number_then_star(&["text", "1. a", "* b", "text"])]
fn mixed_markers_form_a_single_span(#[case] lines: &[&str]) {
    let report = check_lines(lines);

    // One span has one "before" and one "after"
    assert_eq!(
        messages(&report, RuleId::ListSpacing),
        vec!["Missing blank line before list at line 2", "Missing blank line after list at line 3"]
    );
}

#[test]
fn frontmatter_delimiter_is_not_a_list_item() {
    let report = check_lines(&["---", "title: t", "---", "", "- a", "", "text"]);
    assert!(report.is_clean());
}

#[test]
fn list_before_fence_reports_both_rules() {
    let report = check_lines(&["---", "---", "", "- a", "```", "x", "```"]);

    assert_eq!(messages(&report, RuleId::ListSpacing), vec!["Missing blank line after list at line 4"]);
    assert_eq!(
        messages(&report, RuleId::FenceSpacing),
        vec!["Missing blank line before fenced code block at line 5"]
    );
}

#[test]
fn batch_check_matches_single_checks() {
    let documents = [
        ("a.md", "---\n---\ntext\n- a\n"),
        ("b.md", "plain\n```\ncode\n"),
        ("c.md", ""),
    ];

    let batch = check_documents(&documents);
    let single: Vec<_> = documents.iter().map(|(name, content)| check_document(name, content)).collect();

    assert_eq!(batch, single);
    assert_eq!(batch.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["a.md", "b.md", "c.md"]);
}

#[test]
fn byte_order_mark_does_not_hide_a_fence() {
    let report = check_lines(&["text", "\u{feff}```", "code", "```", "", "more"]);
    assert_eq!(
        messages(&report, RuleId::FenceSpacing),
        vec!["Missing blank line before fenced code block at line 2"]
    );
}
