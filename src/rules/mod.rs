//! Rule engine for Markdown formatting checks
//!
//! Architectural Principle: Service Layer - The engine runs independent rules over one document
//! - Each rule implements the DocumentRule trait and only reads the shared Document
//! - Rules never see each other's output, so their order only affects reporting
//! - Configured severities are applied at the boundary, after a rule has run

pub mod fence;
pub mod frontmatter;
pub mod list;

use crate::config::GuardianConfig;
use crate::document::Document;
use crate::domain::violations::{DocumentReport, RuleId, Severity, Violation};

pub use fence::FenceSpacingRule;
pub use frontmatter::FrontmatterClosureRule;
pub use list::ListSpacingRule;

/// A check over a whole document
pub trait DocumentRule: Send + Sync {
    /// Identifier of this rule
    fn id(&self) -> RuleId;

    /// One-line summary for listings
    fn description(&self) -> &'static str;

    /// Longer explanation with an example, shown by `explain`
    fn explanation(&self) -> &'static str;

    /// Run the check. Never fails; malformed input just yields violations.
    fn check(&self, document: &Document<'_>) -> Vec<Violation>;
}

/// Instantiate one of the built-in rules
pub fn builtin_rule(id: RuleId) -> Box<dyn DocumentRule> {
    match id {
        RuleId::FrontmatterClosure => Box::new(FrontmatterClosureRule),
        RuleId::FenceSpacing => Box::new(FenceSpacingRule),
        RuleId::ListSpacing => Box::new(ListSpacingRule),
    }
}

struct RegisteredRule {
    rule: Box<dyn DocumentRule>,
    severity: Severity,
}

/// Runs a set of rules against documents
pub struct RuleEngine {
    rules: Vec<RegisteredRule>,
}

impl RuleEngine {
    /// Create an engine with no rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// All built-in rules at their default `Warning` severity
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        for id in RuleId::ALL {
            engine.add_rule(builtin_rule(id), Severity::Warning);
        }
        engine
    }

    /// The enabled rules of a configuration with their effective severities
    pub fn from_config(config: &GuardianConfig) -> Self {
        let mut engine = Self::new();
        for (id, settings) in config.enabled_rules() {
            tracing::debug!("Enabling rule '{}' with severity {}", id, settings.severity.as_str());
            engine.add_rule(builtin_rule(id), settings.severity);
        }
        engine
    }

    /// Register a rule. Rules are reported in registration order.
    pub fn add_rule(&mut self, rule: Box<dyn DocumentRule>, severity: Severity) {
        self.rules.push(RegisteredRule { rule, severity });
    }

    /// Identifiers of the registered rules
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.iter().map(|r| r.rule.id())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check one document held in memory
    pub fn check(&self, name: &str, content: &str) -> DocumentReport {
        let document = Document::new(content);
        let mut report = DocumentReport::new(name);

        for registered in &self.rules {
            let id = registered.rule.id();
            let violations: Vec<Violation> = registered
                .rule
                .check(&document)
                .into_iter()
                .map(|v| v.with_severity(registered.severity))
                .collect();

            tracing::debug!("Rule '{}' found {} violations in '{}'", id, violations.len(), name);
            report.set_violations(id, violations);
        }

        report
    }

    /// Check `(name, content)` pairs, preserving their order
    pub fn check_documents<N, C>(&self, documents: &[(N, C)]) -> Vec<DocumentReport>
    where
        N: AsRef<str>,
        C: AsRef<str>,
    {
        documents
            .iter()
            .map(|(name, content)| self.check(name.as_ref(), content.as_ref()))
            .collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| (r.rule.id(), r.severity)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, RuleSettings};

    const MESSY: &str = "title\n```\ncode\n```\ntext\n- a\n- b\nafter";

    #[test]
    fn test_default_engine_runs_every_rule() {
        let engine = RuleEngine::with_defaults();
        assert_eq!(engine.len(), 3);

        let report = engine.check("messy.md", MESSY);
        assert_eq!(report.name, "messy.md");
        assert_eq!(report.frontmatter.len(), 2);
        assert_eq!(report.fences.len(), 2);
        assert_eq!(report.lists.len(), 2);
        assert!(report.violations().all(|v| v.severity == Severity::Warning));
    }

    #[test]
    fn test_configured_severity_and_disabled_rules() {
        let config = ConfigBuilder::new()
            .rule(RuleId::FrontmatterClosure, RuleSettings::disabled())
            .rule(RuleId::ListSpacing, RuleSettings::with_severity(Severity::Error))
            .build()
            .unwrap();

        let engine = RuleEngine::from_config(&config);
        let ids: Vec<_> = engine.rule_ids().collect();
        assert_eq!(ids, vec![RuleId::FenceSpacing, RuleId::ListSpacing]);

        let report = engine.check("messy.md", MESSY);
        assert!(report.frontmatter.is_empty());
        assert!(report.lists.iter().all(|v| v.severity == Severity::Error));
        assert!(report.fences.iter().all(|v| v.severity == Severity::Warning));
    }

    #[test]
    fn test_check_documents_keeps_order_and_isolation() {
        let engine = RuleEngine::with_defaults();
        let docs = [
            ("b.md", "---\ntitle: b\n---\n"),
            ("a.md", "text\n```\ncode\n```\n"),
        ];

        let reports = engine.check_documents(&docs);
        assert_eq!(reports[0].name, "b.md");
        assert!(reports[0].is_clean());
        assert_eq!(reports[1].name, "a.md");
        assert_eq!(reports[1].fences.len(), 1);
    }

    #[test]
    fn test_empty_engine_reports_nothing() {
        let engine = RuleEngine::new();
        assert!(engine.is_empty());
        assert!(engine.check("x.md", MESSY).is_clean());
    }
}
