//! Main analysis orchestrator for Markdown Guardian
//!
//! CDD Principle: Domain Services - Analyzer connects file discovery to the rule engine
//! - Resolves paths and directories into an ordered list of Markdown files
//! - Reads each file and hands its content to the pure rule engine
//! - A file that cannot be read is recorded as a failure without affecting the others

pub mod path_filter;

use crate::config::GuardianConfig;
use crate::domain::violations::{
    DocumentReport, GuardianError, GuardianResult, Severity, ValidationReport,
};
use crate::rules::RuleEngine;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use path_filter::PathFilter;

/// Main analyzer that orchestrates the entire validation process
pub struct Analyzer {
    config: GuardianConfig,
    engine: RuleEngine,
    path_filter: PathFilter,
}

/// Options for customizing analysis behavior
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Whether to check files in parallel
    pub parallel: bool,
    /// Maximum number of files to analyze
    pub max_files: Option<usize>,
    /// Stop at the first unreadable file instead of recording it
    pub fail_fast: bool,
    /// Additional exclude patterns for this run
    pub exclude_patterns: Vec<String>,
    /// Whether to ignore per-directory ignore files
    pub ignore_ignore_files: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_files: None,
            fail_fast: false,
            exclude_patterns: Vec::new(),
            ignore_ignore_files: false,
        }
    }
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: GuardianConfig) -> GuardianResult<Self> {
        config.validate()?;

        let ignore_file = config.paths.ignore_file.clone().filter(|name| !name.is_empty());
        let path_filter = PathFilter::new(config.paths.patterns.clone(), ignore_file)
            .map_err(|e| GuardianError::config(format!("Failed to create path filter: {e}")))?;

        let engine = RuleEngine::from_config(&config);

        Ok(Self { config, engine, path_filter })
    }

    /// Create an analyzer with default configuration
    pub fn with_defaults() -> GuardianResult<Self> {
        Self::new(GuardianConfig::default())
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Check a document that is already in memory
    pub fn check_document(&self, name: &str, content: &str) -> DocumentReport {
        self.engine.check(name, content)
    }

    /// Read and check a single file
    pub fn analyze_file<P: AsRef<Path>>(&self, file_path: P) -> GuardianResult<DocumentReport> {
        let file_path = file_path.as_ref();
        tracing::debug!("Checking {}", file_path.display());

        let content = fs::read_to_string(file_path)
            .map_err(|e| GuardianError::input_unavailable(file_path, e))?;

        Ok(self.check_document(&file_path.display().to_string(), &content))
    }

    /// Resolve files and directories into the ordered list of files to check.
    ///
    /// Directories are walked for Markdown files; explicitly named files are
    /// kept whatever their extension. Paths that do not exist are kept so the
    /// read failure shows up in the report.
    pub fn discover_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> GuardianResult<Vec<PathBuf>> {
        let mut filter = self.path_filter.clone();
        for pattern in &options.exclude_patterns {
            filter.add_pattern(pattern)?;
        }
        if options.ignore_ignore_files {
            filter = filter.without_ignore_files();
        }

        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();

            if path.is_dir() {
                files.extend(filter.find_files(path, |p| self.config.is_markdown_path(p))?);
            } else if filter.should_analyze(path, path)? {
                files.push(path.to_path_buf());
            }
        }

        if let Some(max_files) = options.max_files {
            files.truncate(max_files);
        }

        Ok(files)
    }

    /// Check a list of files and build a report
    pub fn analyze_files(
        &self,
        files: &[PathBuf],
        options: &AnalysisOptions,
    ) -> GuardianResult<ValidationReport> {
        let start_time = Instant::now();

        // Results keep the input order whichever strategy runs them
        let results: Vec<(&PathBuf, GuardianResult<DocumentReport>)> =
            if options.parallel && files.len() > 1 {
                files.par_iter().map(|f| (f, self.analyze_file(f))).collect()
            } else {
                files.iter().map(|f| (f, self.analyze_file(f))).collect()
            };

        let mut report = ValidationReport::new();
        for (file_path, result) in results {
            match result {
                Ok(document) => report.add_document(document),
                Err(e) if options.fail_fast => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to analyze {}: {}", file_path.display(), e);
                    report.add_failure(file_path.clone(), e.to_string());
                }
            }
        }

        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(self.config.fingerprint());
        report.sort_documents();

        Ok(report)
    }

    /// Discover and check files under the given paths
    pub fn analyze_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> GuardianResult<ValidationReport> {
        let start_time = Instant::now();
        let files = self.discover_files(paths, options)?;
        tracing::debug!("Discovered {} Markdown files", files.len());

        let mut report = self.analyze_files(&files, options)?;
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        Ok(report)
    }

    /// Analyze a directory tree and return a validation report
    pub fn analyze_directory<P: AsRef<Path>>(
        &self,
        root: P,
        options: &AnalysisOptions,
    ) -> GuardianResult<ValidationReport> {
        self.analyze_paths(&[root.as_ref()], options)
    }

    /// Get configuration fingerprint for cache validation
    pub fn config_fingerprint(&self) -> String {
        self.config.fingerprint()
    }

    /// Get statistics about the configured rules
    pub fn rule_stats(&self) -> RuleStats {
        let mut stats = RuleStats::default();

        for id in crate::domain::violations::RuleId::ALL {
            let settings = self.config.rule_settings(id);
            if !settings.enabled {
                stats.disabled_rules += 1;
                continue;
            }
            stats.enabled_rules += 1;
            if settings.severity == Severity::Error {
                stats.blocking_rules += 1;
            }
        }

        stats
    }
}

/// Statistics about configured rules
#[derive(Debug, Default)]
pub struct RuleStats {
    pub enabled_rules: usize,
    pub disabled_rules: usize,
    /// Enabled rules configured at `error` severity
    pub blocking_rules: usize,
}

impl RuleStats {
    pub fn total_rules(&self) -> usize {
        self.enabled_rules + self.disabled_rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, RuleSettings};
    use crate::domain::violations::RuleId;
    use std::fs;
    use tempfile::TempDir;

    const CLEAN: &str = "---\ntitle: Clean\n---\n\n# Clean\n\n- a\n- b\n";
    const SQUEEZED: &str = "---\ntitle: Squeezed\n---\nIntro\n- a\n- b\nOutro\n";

    fn write_tree(root: &Path) {
        fs::create_dir_all(root.join("docs/guides")).unwrap();
        fs::create_dir_all(root.join("target/doc")).unwrap();
        fs::write(root.join("docs/clean.md"), CLEAN).unwrap();
        fs::write(root.join("docs/guides/squeezed.md"), SQUEEZED).unwrap();
        fs::write(root.join("docs/notes.txt"), SQUEEZED).unwrap();
        fs::write(root.join("target/doc/generated.md"), SQUEEZED).unwrap();
    }

    #[test]
    fn test_analyzer_creation() {
        let analyzer = Analyzer::with_defaults().unwrap();
        let stats = analyzer.rule_stats();

        assert_eq!(stats.enabled_rules, 3);
        assert_eq!(stats.total_rules(), 3);
        assert_eq!(stats.blocking_rules, 0);
        assert_eq!(analyzer.engine().len(), 3);
    }

    #[test]
    fn test_single_file_analysis() -> GuardianResult<()> {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("squeezed.md");
        fs::write(&file_path, SQUEEZED)?;

        let analyzer = Analyzer::with_defaults()?;
        let document = analyzer.analyze_file(&file_path)?;

        assert!(document.frontmatter.is_empty());
        assert_eq!(document.lists.len(), 2);
        assert_eq!(document.name, file_path.display().to_string());

        Ok(())
    }

    #[test]
    fn test_missing_file_is_input_unavailable() {
        let analyzer = Analyzer::with_defaults().unwrap();
        let err = analyzer.analyze_file("/definitely/not/here.md").unwrap_err();
        assert!(matches!(err, GuardianError::InputUnavailable { .. }));
    }

    #[test]
    fn test_directory_analysis() -> GuardianResult<()> {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_tree(root);

        let analyzer = Analyzer::with_defaults()?;
        let report = analyzer.analyze_directory(root, &AnalysisOptions::default())?;

        // notes.txt has the wrong extension and target/ is excluded by default
        assert_eq!(report.summary.total_files, 2);
        assert!(report.documents[0].name.ends_with("clean.md"));
        assert!(report.documents[0].is_clean());
        assert!(report.documents[1].name.ends_with("squeezed.md"));
        assert_eq!(report.summary.violations_by_severity.warning, 2);
        assert!(!report.has_errors());

        Ok(())
    }

    #[test]
    fn test_unreadable_file_does_not_stop_others() -> GuardianResult<()> {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.md");
        let missing = temp_dir.path().join("missing.md");
        fs::write(&good, CLEAN)?;

        let analyzer = Analyzer::with_defaults()?;
        let report = analyzer.analyze_paths(&[&good, &missing], &AnalysisOptions::default())?;
        assert_eq!(report.summary.total_files, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, missing);

        let fail_fast = AnalysisOptions { fail_fast: true, ..Default::default() };
        assert!(analyzer.analyze_paths(&[&good, &missing], &fail_fast).is_err());

        Ok(())
    }

    #[test]
    fn test_analysis_options() -> GuardianResult<()> {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_tree(root);

        let analyzer = Analyzer::with_defaults()?;

        let limited = AnalysisOptions { max_files: Some(1), ..Default::default() };
        assert_eq!(analyzer.analyze_directory(root, &limited)?.summary.total_files, 1);

        let excluded = AnalysisOptions {
            exclude_patterns: vec!["guides/".to_string()],
            parallel: false,
            ..Default::default()
        };
        let report = analyzer.analyze_directory(root, &excluded)?;
        assert_eq!(report.summary.total_files, 1);
        assert!(!report.has_violations());

        Ok(())
    }

    #[test]
    fn test_parallel_and_sequential_agree() -> GuardianResult<()> {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..8 {
            let content = if i % 2 == 0 { CLEAN } else { SQUEEZED };
            fs::write(temp_dir.path().join(format!("doc{i}.md")), content)?;
        }

        let analyzer = Analyzer::with_defaults()?;
        let parallel = analyzer.analyze_directory(temp_dir.path(), &AnalysisOptions::default())?;
        let sequential = analyzer.analyze_directory(
            temp_dir.path(),
            &AnalysisOptions { parallel: false, ..Default::default() },
        )?;

        assert_eq!(parallel.documents, sequential.documents);
        Ok(())
    }

    #[test]
    fn test_configured_error_severity_blocks() -> GuardianResult<()> {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("squeezed.md");
        fs::write(&file, SQUEEZED)?;

        let config = ConfigBuilder::new()
            .rule(RuleId::ListSpacing, RuleSettings::with_severity(Severity::Error))
            .build()?;
        let analyzer = Analyzer::new(config)?;
        assert_eq!(analyzer.rule_stats().blocking_rules, 1);

        let report = analyzer.analyze_paths(&[&file], &AnalysisOptions::default())?;
        assert!(report.has_errors());
        Ok(())
    }
}
