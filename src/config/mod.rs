//! Configuration loading and management for Markdown Guardian
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain settings
//! - Rules missing from the file fall back to enabled at `warning` severity
//! - The fingerprint ties cached results to the configuration that produced them

use crate::domain::violations::{GuardianError, GuardianResult, RuleId, Severity};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["markdown_guardian.yaml", "markdown_guardian.yml", ".markdown_guardian.yaml"];

const SUPPORTED_VERSIONS: [&str; 1] = ["1.0"];

/// Main configuration structure for Markdown Guardian
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardianConfig {
    /// Configuration format version
    pub version: String,
    /// Which files are checked
    #[serde(default)]
    pub paths: PathConfig,
    /// Per-rule settings
    #[serde(default)]
    pub rules: BTreeMap<RuleId, RuleSettings>,
}

/// File selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// File extensions treated as Markdown, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Exclude patterns (gitignore-style, `!` re-includes)
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Name of per-directory ignore files
    #[serde(default)]
    pub ignore_file: Option<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            patterns: vec![
                "target/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
            ],
            ignore_file: Some(".mdguardignore".to_string()),
        }
    }
}

/// Settings for one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

impl RuleSettings {
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    pub fn with_severity(severity: Severity) -> Self {
        Self { severity, ..Self::default() }
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self { enabled: true, severity: default_severity() }
    }
}

impl GuardianConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GuardianResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            GuardianError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            GuardianError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> GuardianResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| GuardianError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// First default config file present in `dir`, if any
    pub fn find_in<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load `path` if given, else the first default file in `dir`, else defaults
    pub fn resolve<P: AsRef<Path>>(path: Option<&Path>, dir: P) -> GuardianResult<Self> {
        match path.map(Path::to_path_buf).or_else(|| Self::find_in(dir)) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Default configuration with every rule enabled
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathConfig::default(),
            rules: RuleId::ALL.into_iter().map(|id| (id, RuleSettings::default())).collect(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> GuardianResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(GuardianError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        if self.paths.extensions.is_empty() {
            return Err(GuardianError::config("At least one file extension must be configured"));
        }

        if let Some(ext) = self.paths.extensions.iter().find(|e| e.trim_start_matches('.').is_empty()) {
            return Err(GuardianError::config(format!("Invalid file extension '{ext}'")));
        }

        for pattern in &self.paths.patterns {
            let body = pattern.strip_prefix('!').unwrap_or(pattern);
            glob::Pattern::new(body.trim_end_matches('/')).map_err(|e| {
                GuardianError::config(format!("Invalid path pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Settings for a rule, defaulting when the file does not mention it
    pub fn rule_settings(&self, id: RuleId) -> RuleSettings {
        self.rules.get(&id).copied().unwrap_or_default()
    }

    /// Enabled rules in reporting order
    pub fn enabled_rules(&self) -> impl Iterator<Item = (RuleId, RuleSettings)> + '_ {
        RuleId::ALL
            .into_iter()
            .map(|id| (id, self.rule_settings(id)))
            .filter(|(_, settings)| settings.enabled)
    }

    /// Severity a rule reports with
    pub fn effective_severity(&self, id: RuleId) -> Severity {
        self.rule_settings(id).severity
    }

    /// Whether a path has one of the configured Markdown extensions
    pub fn is_markdown_path(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.paths
            .extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> GuardianResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GuardianError::config(format!("Failed to serialize config: {e}")))
    }

    /// Convert to YAML in the on-disk format
    pub fn to_yaml(&self) -> GuardianResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GuardianError::config(format!("Failed to serialize config: {e}")))
    }

    /// Stable fingerprint of the configuration for cache validation
    pub fn fingerprint(&self) -> String {
        // Effective settings, so an omitted rule and an explicit default agree
        let mut hasher = Sha256::new();
        hasher.update(self.version.as_bytes());
        for ext in &self.paths.extensions {
            hasher.update(b"\0ext:");
            hasher.update(ext.as_bytes());
        }
        for pattern in &self.paths.patterns {
            hasher.update(b"\0pat:");
            hasher.update(pattern.as_bytes());
        }
        if let Some(ignore) = &self.paths.ignore_file {
            hasher.update(b"\0ignore:");
            hasher.update(ignore.as_bytes());
        }
        for id in RuleId::ALL {
            let settings = self.rule_settings(id);
            hasher.update(format!("\0{}:{}:{}", id, settings.enabled, settings.severity.as_str()));
        }

        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_true() -> bool {
    true
}

fn default_severity() -> Severity {
    Severity::Warning
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: GuardianConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: GuardianConfig::default() }
    }

    /// Add a path pattern
    pub fn add_path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.paths.patterns.push(pattern.into());
        self
    }

    /// Replace the list of Markdown extensions
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.paths.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the ignore file name
    pub fn ignore_file(mut self, filename: impl Into<String>) -> Self {
        self.config.paths.ignore_file = Some(filename.into());
        self
    }

    /// Override settings for one rule
    pub fn rule(mut self, id: RuleId, settings: RuleSettings) -> Self {
        self.config.rules.insert(id, settings);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> GuardianResult<GuardianConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
