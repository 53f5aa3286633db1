//! Markdown Guardian - blank-line and frontmatter checks for Markdown documentation
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - `document` and `rules` are pure: content in, violations out, no I/O
//! - `analyzer`, `cache` and `report` handle files, incremental runs and presentation
//! - `MarkdownGuardian` ties them together for the CLI and for embedding
//!
//! ```
//! let report = markdown_guardian::check_document("intro.md", "---\ntitle: x\n---\ntext\n- a\n");
//! assert_eq!(report.lists.len(), 1);
//! ```

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod document;
pub mod domain;
pub mod report;
pub mod rules;

// Re-export main types for convenient access
pub use domain::violations::{
    DocumentFailure, DocumentReport, GuardianError, GuardianResult, RuleId, Severity,
    ValidationReport, ValidationSummary, Violation,
};

pub use config::{ConfigBuilder, GuardianConfig, RuleSettings};

pub use analyzer::{AnalysisOptions, Analyzer, RuleStats};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use cache::{CacheStatistics, FileCache, DEFAULT_CACHE_PATH};

pub use rules::{DocumentRule, RuleEngine};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Check one document with every rule at its default severity
pub fn check_document(name: &str, content: &str) -> DocumentReport {
    RuleEngine::with_defaults().check(name, content)
}

/// Check `(name, content)` pairs with every rule, keeping their order
pub fn check_documents<N, C>(documents: &[(N, C)]) -> Vec<DocumentReport>
where
    N: AsRef<str>,
    C: AsRef<str>,
{
    RuleEngine::with_defaults().check_documents(documents)
}

/// High-level validator used by the CLI: analysis, optional cache and formatting
pub struct MarkdownGuardian {
    analyzer: Analyzer,
    cache: Option<FileCache>,
    report_formatter: ReportFormatter,
}

/// Options for a validation run
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Whether to consult the cache when one is attached
    pub use_cache: bool,
    /// Output format for results
    pub output_format: OutputFormat,
    pub report_options: ReportOptions,
    pub analysis_options: AnalysisOptions,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            output_format: OutputFormat::Human,
            report_options: ReportOptions::default(),
            analysis_options: AnalysisOptions::default(),
        }
    }
}

impl MarkdownGuardian {
    /// Create a new validator with the given configuration
    pub fn new_with_config(config: GuardianConfig) -> GuardianResult<Self> {
        let analyzer = Analyzer::new(config)?;
        Ok(Self { analyzer, cache: None, report_formatter: ReportFormatter::default() })
    }

    /// Create a validator with default configuration
    pub fn new() -> GuardianResult<Self> {
        Self::new_with_config(GuardianConfig::default())
    }

    /// Create a validator loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> GuardianResult<Self> {
        Self::new_with_config(GuardianConfig::load_from_file(path)?)
    }

    /// Enable caching with the specified cache file
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_path: P) -> GuardianResult<Self> {
        let mut cache = FileCache::new(cache_path);
        cache.load()?;
        cache.set_config_fingerprint(self.analyzer.config_fingerprint());
        self.cache = Some(cache);
        Ok(self)
    }

    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    pub fn config(&self) -> &GuardianConfig {
        self.analyzer.config()
    }

    /// Check a document held in memory with the configured rules
    pub fn check_document(&self, name: &str, content: &str) -> DocumentReport {
        self.analyzer.check_document(name, content)
    }

    /// Validate files and directories with default options
    pub async fn validate<P: AsRef<Path>>(&mut self, paths: Vec<P>) -> GuardianResult<ValidationReport> {
        self.validate_with_options(paths, &ValidationOptions::default()).await
    }

    /// Validate files and directories with custom options
    pub async fn validate_with_options<P: AsRef<Path>>(
        &mut self,
        paths: Vec<P>,
        options: &ValidationOptions,
    ) -> GuardianResult<ValidationReport> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();

        if options.use_cache && self.cache.is_some() {
            self.analyze_with_cache(&paths, &options.analysis_options).await
        } else {
            self.analyzer.analyze_paths(&paths, &options.analysis_options)
        }
    }

    /// Validate a single file
    pub fn validate_file<P: AsRef<Path>>(&self, file_path: P) -> GuardianResult<ValidationReport> {
        let document = self.analyzer.analyze_file(file_path)?;

        let mut report = ValidationReport::new();
        report.add_document(document);
        report.set_config_fingerprint(self.analyzer.config_fingerprint());

        Ok(report)
    }

    /// Validate entire directory tree
    pub fn validate_directory<P: AsRef<Path>>(
        &self,
        root: P,
        options: &AnalysisOptions,
    ) -> GuardianResult<ValidationReport> {
        self.analyzer.analyze_directory(root, options)
    }

    /// Format a validation report for output
    pub fn format_report(&self, report: &ValidationReport, format: OutputFormat) -> GuardianResult<String> {
        self.report_formatter.format_report(report, format)
    }

    pub fn rule_statistics(&self) -> RuleStats {
        self.analyzer.rule_stats()
    }

    /// Get cache statistics (if caching is enabled)
    pub fn cache_statistics(&self) -> Option<CacheStatistics> {
        self.cache.as_ref().map(|c| c.statistics())
    }

    /// Clear cache (if enabled)
    pub fn clear_cache(&mut self) -> GuardianResult<()> {
        if let Some(cache) = &mut self.cache {
            cache.clear()?;
        }
        Ok(())
    }

    /// Save cache to disk (if enabled and modified)
    pub fn save_cache(&mut self) -> GuardianResult<()> {
        if let Some(cache) = &mut self.cache {
            cache.save()?;
        }
        Ok(())
    }

    /// Cleanup cache by removing entries for non-existent files
    pub fn cleanup_cache(&mut self) -> GuardianResult<Option<usize>> {
        match &mut self.cache {
            Some(cache) => Ok(Some(cache.cleanup()?)),
            None => Ok(None),
        }
    }

    /// Cache-aware analysis: unchanged documents reuse their stored report
    async fn analyze_with_cache(
        &mut self,
        paths: &[PathBuf],
        options: &AnalysisOptions,
    ) -> GuardianResult<ValidationReport> {
        let start_time = Instant::now();
        let config_fingerprint = self.analyzer.config_fingerprint();
        let files = self.analyzer.discover_files(paths, options)?;

        let Some(cache) = self.cache.as_mut() else {
            return self.analyzer.analyze_files(&files, options);
        };

        let mut report = ValidationReport::new();
        let mut reused = 0;

        for file_path in &files {
            let needs_analysis = cache.needs_analysis(file_path, &config_fingerprint).unwrap_or_else(|e| {
                tracing::debug!("Cache check failed for {}: {}", file_path.display(), e);
                true
            });

            if !needs_analysis {
                if let Some(cached) = cache.cached_report(file_path) {
                    report.add_document(cached.clone());
                    reused += 1;
                    continue;
                }
            }

            match tokio::fs::read_to_string(file_path).await {
                Ok(content) => {
                    let document =
                        self.analyzer.check_document(&file_path.display().to_string(), &content);

                    if let Err(e) = cache.update_entry(file_path, document.clone(), &config_fingerprint) {
                        tracing::warn!("Failed to update cache for {}: {}", file_path.display(), e);
                    }
                    report.add_document(document);
                }
                Err(e) => {
                    let error = GuardianError::input_unavailable(file_path, e);
                    if options.fail_fast {
                        return Err(error);
                    }
                    tracing::warn!("Failed to analyze {}: {}", file_path.display(), error);
                    report.add_failure(file_path.clone(), error.to_string());
                }
            }
        }

        tracing::debug!("Reused {} of {} cached reports", reused, files.len());

        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(config_fingerprint);
        report.sort_documents();

        Ok(report)
    }
}

/// Convenience function to validate files with default settings
pub async fn validate_files<P: AsRef<Path>>(files: Vec<P>) -> GuardianResult<ValidationReport> {
    let mut validator = MarkdownGuardian::new()?;
    validator.validate(files).await
}

/// Convenience function to validate a directory with default settings
pub fn validate_directory<P: AsRef<Path>>(directory: P) -> GuardianResult<ValidationReport> {
    let validator = MarkdownGuardian::new()?;
    validator.validate_directory(directory, &AnalysisOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SQUEEZED: &str = "---\ntitle: Squeezed\n---\nIntro\n```\ncode\n```\nOutro\n";

    #[test]
    fn test_check_document_is_pure() {
        let report = check_document("a.md", SQUEEZED);

        assert_eq!(report.name, "a.md");
        assert!(report.frontmatter.is_empty());
        assert_eq!(
            report.fences.iter().map(|v| v.message.as_str()).collect::<Vec<_>>(),
            vec![
                "Missing blank line before fenced code block at line 5",
                "Missing blank line after fenced code block at line 7",
            ]
        );
        assert_eq!(check_document("a.md", SQUEEZED), report);
    }

    #[test]
    fn test_check_documents_keeps_order() {
        let reports = check_documents(&[("b.md", "no frontmatter"), ("a.md", "---\n---\n")]);

        assert_eq!(reports[0].name, "b.md");
        assert_eq!(reports[0].frontmatter.len(), 2);
        assert!(reports[1].is_clean());
    }

    #[tokio::test]
    async fn test_validate_paths() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("doc.md");
        fs::write(&doc, SQUEEZED).unwrap();

        let report = validate_files(vec![&doc]).await.unwrap();

        assert_eq!(report.summary.total_files, 1);
        assert_eq!(report.summary.violations_by_severity.warning, 2);
        assert!(!report.has_errors());
        assert!(report.config_fingerprint.is_some());
    }

    #[tokio::test]
    async fn test_cached_reports_are_reused() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("doc.md");
        let cache_path = temp_dir.path().join(".markdown_guardian/cache.json");
        fs::write(&doc, SQUEEZED).unwrap();

        let mut validator = MarkdownGuardian::new().unwrap().with_cache(&cache_path).unwrap();
        let first = validator.validate(vec![&doc]).await.unwrap();
        validator.save_cache().unwrap();
        assert!(cache_path.exists());

        let mut validator = MarkdownGuardian::new().unwrap().with_cache(&cache_path).unwrap();
        let second = validator.validate(vec![&doc]).await.unwrap();

        assert_eq!(first.documents, second.documents);
        let stats = validator.cache_statistics().unwrap();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_cache_records_unreadable_files() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.md");

        let mut validator =
            MarkdownGuardian::new().unwrap().with_cache(temp_dir.path().join("cache.json")).unwrap();
        let report = validator.validate(vec![&missing]).await.unwrap();

        assert_eq!(report.summary.total_files, 0);
        assert_eq!(report.failures.len(), 1);

        let options = ValidationOptions {
            analysis_options: AnalysisOptions { fail_fast: true, ..Default::default() },
            ..Default::default()
        };
        assert!(validator.validate_with_options(vec![&missing], &options).await.is_err());
    }

    #[test]
    fn test_single_file_validation() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("doc.md");
        fs::write(&doc, "plain text\n").unwrap();

        let validator = MarkdownGuardian::new().unwrap();
        let report = validator.validate_file(&doc).unwrap();

        assert_eq!(report.summary.total_files, 1);
        assert_eq!(report.documents[0].frontmatter.len(), 1);
    }

    #[test]
    fn test_report_formatting() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("clean.md"), "---\ntitle: ok\n---\n").unwrap();

        let validator = MarkdownGuardian::new()
            .unwrap()
            .with_report_formatter(ReportFormatter::new(ReportOptions {
                use_colors: false,
                ..Default::default()
            }));
        let report = validate_directory(temp_dir.path()).unwrap();

        let human = validator.format_report(&report, OutputFormat::Human).unwrap();
        assert!(human.contains("clean.md:\n  No issues found\n"));

        let json = validator.format_report(&report, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["documents"].is_array());
    }

    #[test]
    fn test_rule_statistics_follow_config() {
        let config = ConfigBuilder::new()
            .rule(RuleId::FenceSpacing, RuleSettings::disabled())
            .build()
            .unwrap();
        let validator = MarkdownGuardian::new_with_config(config).unwrap();

        let stats = validator.rule_statistics();
        assert_eq!(stats.enabled_rules, 2);
        assert_eq!(stats.disabled_rules, 1);
        assert!(validator.check_document("a.md", SQUEEZED).fences.is_empty());
    }

    #[test]
    fn test_blocking_on_async_api() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("doc.md");
        fs::write(&doc, "---\n---\n").unwrap();

        let report = tokio_test::block_on(validate_files(vec![&doc])).unwrap();
        assert!(!report.has_violations());
    }
}
