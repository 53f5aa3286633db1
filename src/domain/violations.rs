//! Core domain models for formatting violations and validation results
//!
//! Architecture: Rich Domain Models - Violations are values, reports are aggregates
//! - A Violation is produced by exactly one rule and carries its own line reference
//! - DocumentReport groups one document's violations by the rule that found them
//! - ValidationReport acts as the aggregate root over every checked document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity levels for formatting violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages and suggestions
    Info,
    /// Style problems worth fixing; never fail the run
    Warning,
    /// Problems that fail the run with a non-zero exit code
    Error,
}

impl Severity {
    /// Whether this severity level should cause validation to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Identifier of one of the built-in document rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Frontmatter must open on the first line and be closed later on
    FrontmatterClosure,
    /// Fenced code blocks must be surrounded by blank lines
    FenceSpacing,
    /// Lists must be surrounded by blank lines
    ListSpacing,
}

impl RuleId {
    /// Every rule, in reporting order
    pub const ALL: [RuleId; 3] = [Self::FrontmatterClosure, Self::FenceSpacing, Self::ListSpacing];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrontmatterClosure => "frontmatter_closure",
            Self::FenceSpacing => "fence_spacing",
            Self::ListSpacing => "list_spacing",
        }
    }

    /// Look a rule up by its snake_case identifier
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.as_str() == id)
    }

    /// Heading used when grouping this rule's violations in human output
    pub fn section_title(self) -> &'static str {
        match self {
            Self::FrontmatterClosure => "YAML Frontmatter Issues",
            Self::FenceSpacing => "Blank Line Issues Around Fenced Code Blocks",
            Self::ListSpacing => "Blank Line Issues Around Lists",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single formatting defect found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule that detected this violation
    pub rule_id: RuleId,
    /// Severity level of this violation
    pub severity: Severity,
    /// Line number (1-indexed) the message refers to
    pub line_number: u32,
    /// Human-readable description of the violation
    pub message: String,
}

impl Violation {
    /// Create a new violation with the default `Warning` severity
    pub fn new(rule_id: RuleId, line_number: usize, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            severity: Severity::Warning,
            line_number: u32::try_from(line_number).unwrap_or(u32::MAX),
            message: message.into(),
        }
    }

    /// Replace the severity (used when configuration overrides the default)
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether this violation is blocking
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Format violation for single-line display
    pub fn format_display(&self, document: &str) -> String {
        format!(
            "{}:{} [{}] {}",
            document,
            self.line_number,
            self.severity.as_str(),
            self.message
        )
    }
}

/// All violations found in one document, grouped by rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Name of the document (usually its path)
    pub name: String,
    /// Frontmatter Closure Rule output
    pub frontmatter: Vec<Violation>,
    /// Fence Spacing Rule output
    pub fences: Vec<Violation>,
    /// List Spacing Rule output
    pub lists: Vec<Violation>,
}

impl DocumentReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Violations produced by one rule
    pub fn violations_for(&self, rule: RuleId) -> &[Violation] {
        match rule {
            RuleId::FrontmatterClosure => &self.frontmatter,
            RuleId::FenceSpacing => &self.fences,
            RuleId::ListSpacing => &self.lists,
        }
    }

    /// Store the output of one rule, replacing anything recorded before
    pub fn set_violations(&mut self, rule: RuleId, violations: Vec<Violation>) {
        match rule {
            RuleId::FrontmatterClosure => self.frontmatter = violations,
            RuleId::FenceSpacing => self.fences = violations,
            RuleId::ListSpacing => self.lists = violations,
        }
    }

    /// All violations in rule order
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.frontmatter.iter().chain(&self.fences).chain(&self.lists)
    }

    pub fn violation_count(&self) -> usize {
        self.frontmatter.len() + self.fences.len() + self.lists.len()
    }

    pub fn is_clean(&self) -> bool {
        self.violation_count() == 0
    }
}

/// A document that could not be checked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary statistics for a validation report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total number of documents checked
    pub total_files: usize,
    /// Number of violations by severity level
    pub violations_by_severity: ViolationCounts,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when validation was performed
    pub validated_at: DateTime<Utc>,
}

/// Count of violations by severity level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl ViolationCounts {
    /// Total number of violations across all severities
    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }

    /// Whether there are any blocking violations
    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    /// Add a violation to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

/// Complete validation report over every checked document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// One entry per checked document
    pub documents: Vec<DocumentReport>,
    /// Documents that could not be read
    pub failures: Vec<DocumentFailure>,
    /// Summary statistics
    pub summary: ValidationSummary,
    /// Configuration used for this validation
    pub config_fingerprint: Option<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            failures: Vec::new(),
            summary: ValidationSummary { validated_at: Utc::now(), ..Default::default() },
            config_fingerprint: None,
        }
    }

    /// Add a checked document to the report
    pub fn add_document(&mut self, document: DocumentReport) {
        for violation in document.violations() {
            self.summary.violations_by_severity.add(violation.severity);
        }
        self.summary.total_files += 1;
        self.documents.push(document);
    }

    /// Record a document that could not be checked
    pub fn add_failure(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.failures.push(DocumentFailure { path, reason: reason.into() });
    }

    /// Whether the report contains any violations
    pub fn has_violations(&self) -> bool {
        self.summary.violations_by_severity.total() > 0
    }

    /// Whether the report contains blocking violations (errors)
    pub fn has_errors(&self) -> bool {
        self.summary.violations_by_severity.has_blocking()
    }

    /// Every violation paired with the name of its document
    pub fn violations(&self) -> impl Iterator<Item = (&str, &Violation)> {
        self.documents
            .iter()
            .flat_map(|doc| doc.violations().map(move |v| (doc.name.as_str(), v)))
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Set the configuration fingerprint
    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        for document in other.documents {
            self.add_document(document);
        }
        self.failures.extend(other.failures);
    }

    /// Sort documents by name so output follows directory-listing order
    ///
    /// Names compare component by component, so `a/z.md` precedes `a-b/x.md`.
    pub fn sort_documents(&mut self) {
        self.documents.sort_by(|a, b| Path::new(&a.name).cmp(Path::new(&b.name)));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types that can occur around document validation
///
/// The rules themselves never fail; these cover the I/O and configuration glue.
#[derive(Debug, thiserror::Error)]
pub enum GuardianError {
    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic I/O failure
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A document could not be read; only that document is skipped
    #[error("Input unavailable: {}: {source}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path pattern compilation failed
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// Cache operation failed
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// File watcher could not be set up
    #[error("Watch error: {message}")]
    Watch { message: String },
}

impl GuardianError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern { message: message.into() }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache { message: message.into() }
    }

    /// Create a watch error
    pub fn watch(message: impl Into<String>) -> Self {
        Self::Watch { message: message.into() }
    }

    /// Create an input-unavailable error for a document path
    pub fn input_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputUnavailable { path: path.into(), source }
    }
}

/// Result type for Guardian operations
pub type GuardianResult<T> = Result<T, GuardianError>;
