//! Path filtering using .gitignore-style patterns
//!
//! Architectural Principle: Service Layer - PathFilter decides which documents are checked
//! - Configured patterns are evaluated in order, the last match wins
//! - A leading `!` re-includes, a trailing `/` matches a directory and everything below it
//! - Per-directory ignore files are discovered by walking up from each candidate

use crate::domain::violations::{GuardianError, GuardianResult};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Manages path filtering using .gitignore-style patterns
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Vec<FilterPattern>,
    /// Ignore file name, when ignore files are honoured
    ignore_filename: Option<String>,
}

#[derive(Debug, Clone)]
struct FilterPattern {
    pattern: glob::Pattern,
    /// `!pattern`: re-include what earlier patterns excluded
    is_include: bool,
    /// Trailing slash: match the directory itself and its contents
    directory_only: bool,
    /// Contains a slash: match against the whole relative path, else the file name
    anchored: bool,
    original: String,
}

impl FilterPattern {
    fn parse(raw: &str) -> GuardianResult<Self> {
        let (is_include, body) = match raw.strip_prefix('!') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };
        let directory_only = body.ends_with('/');
        let body = body.trim_end_matches('/').trim_start_matches('/');

        let pattern = glob::Pattern::new(body)
            .map_err(|e| GuardianError::pattern(format!("Invalid pattern '{raw}': {e}")))?;

        Ok(Self {
            pattern,
            is_include,
            directory_only,
            anchored: body.contains('/'),
            original: raw.to_string(),
        })
    }

    /// Match a path given relative to the directory the pattern applies to
    fn matches(&self, relative: &Path) -> bool {
        let relative = normalize(relative);

        if self.directory_only {
            // Any ancestor directory of the file may match
            let mut prefix = PathBuf::new();
            let dirs: Vec<_> = relative.parent().map(|p| p.components().collect()).unwrap_or_default();
            return dirs.into_iter().any(|component| {
                prefix.push(component);
                if self.anchored {
                    self.pattern.matches_path(&prefix)
                } else {
                    self.pattern.matches(&component.as_os_str().to_string_lossy())
                }
            });
        }

        if self.anchored {
            self.pattern.matches_path(&relative)
        } else {
            relative
                .file_name()
                .is_some_and(|name| self.pattern.matches(&name.to_string_lossy()))
        }
    }
}

/// Drop `.` components so `./docs/a.md` and `docs/a.md` match alike
fn normalize(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

impl PathFilter {
    /// Create a new path filter with the given patterns
    pub fn new(patterns: Vec<String>, ignore_filename: Option<String>) -> GuardianResult<Self> {
        let patterns = patterns.iter().map(|p| FilterPattern::parse(p)).collect::<GuardianResult<_>>()?;
        Ok(Self { patterns, ignore_filename })
    }

    /// Stop consulting per-directory ignore files
    pub fn without_ignore_files(mut self) -> Self {
        self.ignore_filename = None;
        self
    }

    /// Check if a path should be analyzed.
    ///
    /// `relative` is the path relative to the walk root; `absolute` is used to
    /// locate ignore files on disk.
    pub fn should_analyze(&self, relative: &Path, absolute: &Path) -> GuardianResult<bool> {
        let mut include = true;
        for pattern in &self.patterns {
            if pattern.matches(relative) {
                include = pattern.is_include;
            }
        }

        if !include {
            return Ok(false);
        }

        if self.ignore_filename.is_some() && self.is_ignored_by_files(absolute)? {
            return Ok(false);
        }

        Ok(true)
    }

    /// Check ignore files from the file's directory upwards
    fn is_ignored_by_files(&self, path: &Path) -> GuardianResult<bool> {
        let Some(filename) = &self.ignore_filename else {
            return Ok(false);
        };

        // Outermost ignore file first so nearer files override it
        let ancestors: Vec<&Path> = path.ancestors().skip(1).collect();
        let mut ignored = false;

        for dir in ancestors.into_iter().rev() {
            let ignore_file = dir.join(filename);
            if !ignore_file.is_file() {
                continue;
            }

            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };

            for pattern in self.load_ignore_file(&ignore_file)? {
                if pattern.matches(relative) {
                    ignored = !pattern.is_include;
                }
            }
        }

        Ok(ignored)
    }

    /// Load patterns from an ignore file, skipping comments and bad lines
    fn load_ignore_file(&self, path: &Path) -> GuardianResult<Vec<FilterPattern>> {
        let content = fs::read_to_string(path).map_err(|e| {
            GuardianError::config(format!("Failed to read ignore file '{}': {}", path.display(), e))
        })?;

        let mut patterns = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match FilterPattern::parse(line) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => tracing::warn!("Skipping pattern in {}: {}", path.display(), e),
            }
        }

        Ok(patterns)
    }

    /// Files under `root` accepted by `accept` and by the filter, in sorted order
    pub fn find_files<F>(&self, root: &Path, accept: F) -> GuardianResult<Vec<PathBuf>>
    where
        F: Fn(&Path) -> bool,
    {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !accept(path) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.should_analyze(relative, path)? {
                files.push(path.to_path_buf());
            } else {
                tracing::debug!("Excluded by path filter: {}", path.display());
            }
        }

        Ok(files)
    }

    /// Add a pattern to the filter
    pub fn add_pattern(&mut self, pattern: &str) -> GuardianResult<()> {
        self.patterns.push(FilterPattern::parse(pattern)?);
        Ok(())
    }

    /// Which patterns match a path, for `--verbose` diagnostics
    pub fn debug_patterns(&self, relative: &Path) -> Vec<String> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let verdict = if pattern.matches(relative) { "MATCH" } else { "no match" };
                format!("Pattern {}: {} -> {}", i, pattern.original, verdict)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filter(patterns: &[&str]) -> PathFilter {
        PathFilter::new(patterns.iter().map(|p| p.to_string()).collect(), None).unwrap()
    }

    fn analyzed(filter: &PathFilter, path: &str) -> bool {
        filter.should_analyze(Path::new(path), Path::new(path)).unwrap()
    }

    #[test]
    fn test_basic_exclusions() {
        let f = filter(&["target/**", "CHANGELOG.md", "**/node_modules/**"]);

        assert!(analyzed(&f, "docs/guide.md"));
        assert!(!analyzed(&f, "target/doc/index.md"));
        assert!(!analyzed(&f, "docs/CHANGELOG.md"));
        assert!(!analyzed(&f, "web/node_modules/pkg/README.md"));
        assert!(!analyzed(&f, "./target/doc/index.md"));
    }

    #[test]
    fn test_include_override_and_order() {
        let f = filter(&["drafts/**", "!drafts/ready.md"]);

        assert!(!analyzed(&f, "drafts/wip.md"));
        assert!(analyzed(&f, "drafts/ready.md"));
    }

    #[test]
    fn test_directory_patterns() {
        let f = filter(&["vendor/", "build/"]);

        assert!(!analyzed(&f, "vendor/lib/README.md"));
        assert!(!analyzed(&f, "site/build/page.md"));
        assert!(analyzed(&f, "vendor.md"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(PathFilter::new(vec!["[invalid".to_string()], None).is_err());
    }

    #[test]
    fn test_ignore_file_and_sorted_walk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("docs/drafts")).unwrap();
        fs::write(root.join(".mdguardignore"), "# drafts are noisy\ndrafts/\n[bad\n").unwrap();
        fs::write(root.join("docs/b.md"), "").unwrap();
        fs::write(root.join("docs/a.md"), "").unwrap();
        fs::write(root.join("docs/drafts/wip.md"), "").unwrap();
        fs::write(root.join("docs/notes.txt"), "").unwrap();

        let with_ignore = PathFilter::new(vec![], Some(".mdguardignore".to_string())).unwrap();
        let is_md = |p: &Path| p.extension().is_some_and(|e| e == "md");

        let files = with_ignore.find_files(root, is_md).unwrap();
        assert_eq!(files, vec![root.join("docs/a.md"), root.join("docs/b.md")]);

        let files = with_ignore.without_ignore_files().find_files(root, is_md).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_debug_patterns() {
        let f = filter(&["*.md", "docs/**"]);
        let info = f.debug_patterns(Path::new("src/readme.txt"));
        assert_eq!(info, vec!["Pattern 0: *.md -> no match", "Pattern 1: docs/** -> no match"]);
    }
}
