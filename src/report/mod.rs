//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - ValidationReport (domain) is converted to various external representations
//! - The human format groups each document's violations under the rule that found them
//! - Machine formats (JSON, GitHub annotations, JUnit) flatten them with their line numbers

use crate::domain::violations::{
    DocumentReport, GuardianError, GuardianResult, RuleId, Severity, ValidationReport, Violation,
};
use serde_json::Value as JsonValue;
use std::io::Write;

#[cfg(feature = "colors")]
use colored::Colorize;

/// Supported output formats for validation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Per-document sections, as printed to a terminal
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// GitHub Actions workflow annotations
    GitHub,
    /// JUnit XML format for CI/CD integration
    Junit,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "github" => Some(Self::GitHub),
            "junit" => Some(Self::Junit),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "github", "junit"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (human format only)
    pub use_colors: bool,
    /// Maximum number of violations to include
    pub max_violations: Option<usize>,
    /// Minimum severity level to include
    pub min_severity: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, max_violations: None, min_severity: None }
    }
}

/// One document with the violations that survived filtering
struct DocumentView<'a> {
    document: &'a DocumentReport,
    violations: Vec<&'a Violation>,
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a validation report in the specified format
    pub fn format_report(&self, report: &ValidationReport, format: OutputFormat) -> GuardianResult<String> {
        let (views, hidden) = self.filter_documents(report);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &views, hidden)),
            OutputFormat::Json => self.format_json(report, &views),
            OutputFormat::GitHub => Ok(self.format_github(&views)),
            OutputFormat::Junit => Ok(self.format_junit(report, &views)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &ValidationReport,
        format: OutputFormat,
        mut writer: W,
    ) -> GuardianResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Apply severity and count limits; returns the views and how many violations were cut
    fn filter_documents<'a>(&self, report: &'a ValidationReport) -> (Vec<DocumentView<'a>>, usize) {
        let mut budget = self.options.max_violations.unwrap_or(usize::MAX);
        let mut hidden = 0;

        let views = report
            .documents
            .iter()
            .map(|document| {
                let mut violations: Vec<&Violation> = document
                    .violations()
                    .filter(|v| self.options.min_severity.map_or(true, |min| v.severity >= min))
                    .collect();

                let keep = violations.len().min(budget);
                hidden += violations.len() - keep;
                budget -= keep;
                violations.truncate(keep);

                DocumentView { document, violations }
            })
            .collect();

        (views, hidden)
    }

    /// Per-document sections: a header, then one block per rule with findings
    fn format_human(&self, report: &ValidationReport, views: &[DocumentView<'_>], hidden: usize) -> String {
        let mut output = String::new();

        for view in views {
            output.push_str(&format!("\nChecking {}:\n", self.paint_bold(&view.document.name)));

            if view.document.is_clean() {
                output.push_str(&format!("  {}\n", self.paint_severity(None, "No issues found")));
                continue;
            }

            // Filtering can leave a defective document with nothing to show
            if view.violations.is_empty() {
                let count = view.document.violation_count();
                output.push_str(&format!("  ({} violation{} hidden)\n", count, plural(count)));
                continue;
            }

            for rule in RuleId::ALL {
                let found: Vec<&Violation> =
                    view.violations.iter().copied().filter(|v| v.rule_id == rule).collect();
                if found.is_empty() {
                    continue;
                }

                output.push_str(&format!("  {}:\n", rule.section_title()));
                for violation in found {
                    output.push_str(&format!(
                        "    - {}\n",
                        self.paint_severity(Some(violation.severity), &violation.message)
                    ));
                }
            }
        }

        if hidden > 0 {
            output.push_str(&format!("\n... {} more violations not shown\n", hidden));
        }

        for failure in &report.failures {
            output.push_str(&format!(
                "\n{} {}: {}\n",
                self.paint_severity(Some(Severity::Error), "Could not check"),
                failure.path.display(),
                failure.reason
            ));
        }

        output.push('\n');
        output.push_str(&self.format_summary(report));
        output
    }

    fn format_json(&self, report: &ValidationReport, views: &[DocumentView<'_>]) -> GuardianResult<String> {
        let documents: Vec<JsonValue> = views
            .iter()
            .map(|view| {
                let violations: Vec<JsonValue> = view
                    .violations
                    .iter()
                    .map(|v| {
                        serde_json::json!({
                            "rule_id": v.rule_id,
                            "severity": v.severity.as_str(),
                            "line_number": v.line_number,
                            "message": v.message,
                        })
                    })
                    .collect();

                serde_json::json!({ "name": view.document.name, "violations": violations })
            })
            .collect();

        let failures: Vec<JsonValue> = report
            .failures
            .iter()
            .map(|f| serde_json::json!({ "path": f.path.display().to_string(), "reason": f.reason }))
            .collect();

        let json_report = serde_json::json!({
            "documents": documents,
            "failures": failures,
            "summary": {
                "total_files": report.summary.total_files,
                "violations_by_severity": {
                    "error": report.summary.violations_by_severity.error,
                    "warning": report.summary.violations_by_severity.warning,
                    "info": report.summary.violations_by_severity.info
                },
                "execution_time_ms": report.summary.execution_time_ms,
                "validated_at": report.summary.validated_at.to_rfc3339()
            },
            "config_fingerprint": report.config_fingerprint
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| GuardianError::config(format!("JSON serialization failed: {}", e)))
    }

    fn format_github(&self, views: &[DocumentView<'_>]) -> String {
        let mut output = String::new();

        for view in views {
            for violation in &view.violations {
                let level = match violation.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                    Severity::Info => "notice",
                };

                output.push_str(&format!(
                    "::{} file={},line={},title={}::{}\n",
                    level,
                    escape_property(&view.document.name),
                    violation.line_number,
                    escape_property(violation.rule_id.as_str()),
                    escape_data(&violation.message)
                ));
            }
        }

        output
    }

    /// One test case per document; each violation becomes a failure entry
    fn format_junit(&self, report: &ValidationReport, views: &[DocumentView<'_>]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failing = views.iter().filter(|v| !v.violations.is_empty()).count();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"markdown-guardian\" tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"{:.3}\">\n",
            views.len() + report.failures.len(),
            failing,
            report.failures.len(),
            execution_time
        ));

        for view in views {
            let name = escape_xml(&view.document.name);
            if view.violations.is_empty() {
                xml.push_str(&format!("  <testcase classname=\"markdown\" name=\"{}\"/>\n", name));
                continue;
            }

            xml.push_str(&format!("  <testcase classname=\"markdown\" name=\"{}\">\n", name));
            for violation in &view.violations {
                xml.push_str(&format!(
                    "    <failure type=\"{}\" message=\"{}\">{}:{}</failure>\n",
                    violation.rule_id,
                    escape_xml(&violation.message),
                    name,
                    violation.line_number
                ));
            }
            xml.push_str("  </testcase>\n");
        }

        for failure in &report.failures {
            xml.push_str(&format!(
                "  <testcase classname=\"markdown\" name=\"{}\">\n    <error message=\"{}\"/>\n  </testcase>\n",
                escape_xml(&failure.path.display().to_string()),
                escape_xml(&failure.reason)
            ));
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    fn format_summary(&self, report: &ValidationReport) -> String {
        let counts = &report.summary.violations_by_severity;
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        let mut parts = Vec::new();
        if counts.error > 0 {
            let text = format!("{} error{}", counts.error, plural(counts.error));
            parts.push(self.paint_severity(Some(Severity::Error), &text));
        }
        if counts.warning > 0 {
            let text = format!("{} warning{}", counts.warning, plural(counts.warning));
            parts.push(self.paint_severity(Some(Severity::Warning), &text));
        }
        if counts.info > 0 {
            parts.push(self.paint_severity(Some(Severity::Info), &format!("{} info", counts.info)));
        }
        if parts.is_empty() {
            parts.push(self.paint_severity(None, "0 violations"));
        }

        let mut summary = format!(
            "{} {} in {} file{} ({:.1}s)",
            self.paint_bold("Summary:"),
            parts.join(", "),
            report.summary.total_files,
            plural(report.summary.total_files),
            execution_time
        );
        if !report.failures.is_empty() {
            summary.push_str(&format!(", {} unreadable", report.failures.len()));
        }
        summary.push('\n');
        summary
    }

    #[cfg(feature = "colors")]
    fn paint_severity(&self, severity: Option<Severity>, text: &str) -> String {
        if !self.options.use_colors {
            return text.to_string();
        }
        match severity {
            Some(Severity::Error) => text.red().to_string(),
            Some(Severity::Warning) => text.yellow().to_string(),
            Some(Severity::Info) => text.cyan().to_string(),
            None => text.green().to_string(),
        }
    }

    #[cfg(not(feature = "colors"))]
    fn paint_severity(&self, _severity: Option<Severity>, text: &str) -> String {
        text.to_string()
    }

    #[cfg(feature = "colors")]
    fn paint_bold(&self, text: &str) -> String {
        if self.options.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    #[cfg(not(feature = "colors"))]
    fn paint_bold(&self, text: &str) -> String {
        text.to_string()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape a workflow command message
fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property value
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
