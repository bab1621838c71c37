//! Content-hash cache keyed by file name.
//!
//! The pipeline consults this cache to skip files whose bytes have not
//! changed since the last successful embed. An entry is written only after
//! a file's chunks are fully stored, so a missing or stale entry always
//! means the file needs processing.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::VectorError;

/// Cache file name
pub const DOC_CACHE_FILE: &str = "doc_cache.json";

/// Persisted map of file name to hex-encoded SHA-256 content hash.
pub struct HashCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl HashCache {
    /// Open the cache stored under `dir`. A missing file starts empty; an
    /// unreadable or corrupt file logs a warning and starts empty.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, VectorError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let path = dir.join(DOC_CACHE_FILE);

        let mut cache = Self {
            path,
            entries: BTreeMap::new(),
        };

        if cache.path.exists() {
            match fs::read_to_string(&cache.path) {
                Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                    Ok(entries) => cache.entries = entries,
                    Err(e) => {
                        warn!(path = ?cache.path, error = %e, "Corrupt hash cache, starting empty");
                    }
                },
                Err(e) => {
                    warn!(path = ?cache.path, error = %e, "Failed to read hash cache, starting empty");
                }
            }
        }

        debug!(entries = cache.entries.len(), "Opened hash cache");
        Ok(cache)
    }

    /// Stored hash for a file name.
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.entries.get(file_name).map(|s| s.as_str())
    }

    /// True when the stored hash for `file_name` equals `hash`.
    pub fn matches(&self, file_name: &str, hash: &str) -> bool {
        self.get(file_name) == Some(hash)
    }

    /// Record the content hash for a file name.
    pub fn set(&mut self, file_name: impl Into<String>, hash: impl Into<String>) {
        self.entries.insert(file_name.into(), hash.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache to disk.
    pub fn flush(&self) -> Result<(), VectorError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Drop every entry and persist the empty cache.
    pub fn reset(&mut self) -> Result<(), VectorError> {
        self.entries.clear();
        self.flush()
    }
}
