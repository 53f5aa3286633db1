//! Document report caching for incremental checks
//!
//! CDD Principle: Infrastructure Layer - Cache skips documents that have not changed
//! - FileCache stores the last DocumentReport per file next to its size, mtime and hash
//! - An entry is reused only when the file and the configuration fingerprint both match
//! - The rules stay pure; the cache only decides whether to call them again

use crate::domain::violations::{DocumentReport, GuardianError, GuardianResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default location of the cache file, relative to the working directory
pub const DEFAULT_CACHE_PATH: &str = ".markdown_guardian/cache.json";

const CURRENT_VERSION: u32 = 2;

/// Cache for storing per-document reports and file metadata
#[derive(Debug)]
pub struct FileCache {
    cache_path: PathBuf,
    data: CacheData,
    /// Whether the cache has been modified since the last save
    dirty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheData {
    /// Cache format version for migration support
    version: u32,
    /// Configuration fingerprint of the last run
    config_fingerprint: Option<String>,
    files: HashMap<PathBuf, FileEntry>,
    #[serde(default)]
    metadata: CacheMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMetadata {
    created_at: u64,
    updated_at: u64,
    hits: u64,
    misses: u64,
}

/// Cached information about a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// SHA-256 hash of file content
    pub content_hash: String,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified_at: u64,
    /// When this file was last checked
    pub analyzed_at: u64,
    /// Configuration fingerprint when the check was done
    pub config_fingerprint: String,
    /// Report produced by that check; absent in version 1 caches
    #[serde(default)]
    pub report: Option<DocumentReport>,
}

impl FileCache {
    /// Create a new file cache with the given cache file path
    pub fn new<P: AsRef<Path>>(cache_path: P) -> Self {
        Self {
            cache_path: cache_path.as_ref().to_path_buf(),
            data: CacheData::default(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    /// Load cache from disk, starting a fresh one if it doesn't exist
    pub fn load(&mut self) -> GuardianResult<()> {
        if self.cache_path.exists() {
            let content = fs::read_to_string(&self.cache_path)
                .map_err(|e| GuardianError::cache(format!("Failed to read cache file: {}", e)))?;

            self.data = serde_json::from_str(&content)
                .map_err(|e| GuardianError::cache(format!("Failed to parse cache file: {}", e)))?;

            self.migrate_if_needed()?;
        } else {
            self.data = CacheData {
                version: CURRENT_VERSION,
                config_fingerprint: None,
                files: HashMap::new(),
                metadata: CacheMetadata::default(),
            };
            self.dirty = true;
        }

        Ok(())
    }

    /// Save cache to disk if it has been modified
    pub fn save(&mut self) -> GuardianResult<()> {
        if !self.dirty {
            return Ok(());
        }

        self.data.metadata.updated_at = current_timestamp();

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GuardianError::cache(format!("Failed to create cache directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| GuardianError::cache(format!("Failed to serialize cache: {}", e)))?;

        fs::write(&self.cache_path, content)
            .map_err(|e| GuardianError::cache(format!("Failed to write cache file: {}", e)))?;

        self.dirty = false;
        tracing::debug!("Saved cache with {} entries to {}", self.data.files.len(), self.cache_path.display());
        Ok(())
    }

    /// Check if a document needs to be checked again
    pub fn needs_analysis<P: AsRef<Path>>(
        &mut self,
        file_path: P,
        config_fingerprint: &str,
    ) -> GuardianResult<bool> {
        let file_path = file_path.as_ref();
        let (current_size, current_modified) = file_stamp(file_path)?;

        let fresh = match self.data.files.get(file_path) {
            Some(entry)
                if entry.report.is_some()
                    && entry.size == current_size
                    && entry.modified_at == current_modified
                    && entry.config_fingerprint == config_fingerprint =>
            {
                // Same size and mtime can still hide an edit within the same second
                entry.content_hash == calculate_file_hash(file_path)?
            }
            _ => false,
        };

        if fresh {
            self.data.metadata.hits += 1;
        } else {
            self.data.metadata.misses += 1;
        }
        self.dirty = true;

        Ok(!fresh)
    }

    /// The stored report for a document, if one was recorded
    pub fn cached_report<P: AsRef<Path>>(&self, file_path: P) -> Option<&DocumentReport> {
        self.data.files.get(file_path.as_ref()).and_then(|entry| entry.report.as_ref())
    }

    /// Record the report for a document after checking it
    pub fn update_entry<P: AsRef<Path>>(
        &mut self,
        file_path: P,
        report: DocumentReport,
        config_fingerprint: &str,
    ) -> GuardianResult<()> {
        let file_path = file_path.as_ref();
        let (size, modified_at) = file_stamp(file_path)?;

        let entry = FileEntry {
            content_hash: calculate_file_hash(file_path)?,
            size,
            modified_at,
            analyzed_at: current_timestamp(),
            config_fingerprint: config_fingerprint.to_string(),
            report: Some(report),
        };

        self.data.files.insert(file_path.to_path_buf(), entry);
        self.dirty = true;

        Ok(())
    }

    /// Get cache statistics
    pub fn statistics(&self) -> CacheStatistics {
        let lookups = self.data.metadata.hits + self.data.metadata.misses;
        CacheStatistics {
            total_files: self.data.files.len(),
            cache_hits: self.data.metadata.hits,
            cache_misses: self.data.metadata.misses,
            hit_rate: if lookups > 0 {
                self.data.metadata.hits as f64 / lookups as f64
            } else {
                0.0
            },
            created_at: self.data.metadata.created_at,
            updated_at: self.data.metadata.updated_at,
        }
    }

    /// Clear the entire cache and remove the cache file
    pub fn clear(&mut self) -> GuardianResult<()> {
        self.data.files.clear();
        self.data.metadata.hits = 0;
        self.data.metadata.misses = 0;
        self.data.metadata.updated_at = current_timestamp();
        self.dirty = true;

        if self.cache_path.exists() {
            fs::remove_file(&self.cache_path)
                .map_err(|e| GuardianError::cache(format!("Failed to remove cache file: {}", e)))?;
        }

        Ok(())
    }

    /// Remove cache entries for files that no longer exist
    pub fn cleanup(&mut self) -> GuardianResult<usize> {
        let before = self.data.files.len();
        self.data.files.retain(|path, _| path.exists());
        let removed = before - self.data.files.len();

        if removed > 0 {
            self.dirty = true;
        }

        Ok(removed)
    }

    /// Update configuration fingerprint
    pub fn set_config_fingerprint(&mut self, fingerprint: String) {
        if self.data.config_fingerprint.as_ref() != Some(&fingerprint) {
            self.data.config_fingerprint = Some(fingerprint);
            self.dirty = true;
        }
    }

    fn migrate_if_needed(&mut self) -> GuardianResult<()> {
        if self.data.version == CURRENT_VERSION {
            return Ok(());
        }

        tracing::info!(
            "Migrating cache from version {} to {}",
            self.data.version,
            CURRENT_VERSION
        );

        match self.data.version {
            // Version 1 entries carry no report, so they can never be reused
            0 | 1 => {
                self.data.files.clear();
                self.data.version = CURRENT_VERSION;
                self.dirty = true;
                Ok(())
            }
            other => Err(GuardianError::cache(format!(
                "Unsupported cache version: {}. Please delete the cache file.",
                other
            ))),
        }
    }
}

impl Default for CacheMetadata {
    fn default() -> Self {
        let now = current_timestamp();
        Self { created_at: now, updated_at: now, hits: 0, misses: 0 }
    }
}

/// Cache performance statistics
#[derive(Debug, Clone)]
pub struct CacheStatistics {
    pub total_files: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate: f64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl CacheStatistics {
    /// Format statistics for display
    pub fn format_display(&self) -> String {
        format!(
            "Cache: {} files, {:.1}% hit rate ({} hits, {} misses)",
            self.total_files,
            self.hit_rate * 100.0,
            self.cache_hits,
            self.cache_misses
        )
    }
}

/// Size and mtime (seconds) of a file
fn file_stamp(file_path: &Path) -> GuardianResult<(u64, u64)> {
    let metadata = fs::metadata(file_path).map_err(|e| {
        GuardianError::cache(format!("Failed to get file metadata for {}: {}", file_path.display(), e))
    })?;

    let modified = metadata
        .modified()
        .map_err(|e| GuardianError::cache(format!("Failed to get modification time: {}", e)))?
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    Ok((metadata.len(), modified))
}

/// SHA-256 of file content, streamed
fn calculate_file_hash(file_path: &Path) -> GuardianResult<String> {
    let mut file = File::open(file_path)
        .map_err(|e| GuardianError::cache(format!("Failed to open file for hashing: {}", e)))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| GuardianError::cache(format!("Failed to read file for hashing: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
