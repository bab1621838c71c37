//! Persisted record types for tracked files and embedded chunks.
//!
//! Serde field names are the on-disk JSON keys; both lists are re-saved in
//! full on update, so the shapes here define the stable external format.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked source document, created once when the watch service first
/// reports the file. Records are never edited in place; a changed file is
/// detected by content-hash mismatch and reprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name including extension (display name, also the cache key)
    pub file_name: String,

    /// Canonicalized absolute path (uniqueness key for dedup)
    pub file_path: PathBuf,

    /// Lowercase extension without the leading dot
    pub extension: String,

    /// File size in kilobytes, rounded to two decimals
    pub size_kb: f64,

    /// Modification time at discovery
    pub last_modified: DateTime<Utc>,
}

impl FileRecord {
    /// Build a record from a resolved path and stat data.
    pub fn new(file_path: PathBuf, size_bytes: u64, last_modified: DateTime<Utc>) -> Self {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = extension_of(&file_path).unwrap_or_default();

        Self {
            file_name,
            file_path,
            extension,
            size_kb: round2(size_bytes as f64 / 1024.0),
            last_modified,
        }
    }

    /// File stem used to build chunk ids for this document.
    pub fn stem(&self) -> String {
        self.file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone())
    }
}

/// Lowercase extension without the dot, `None` when the path has none.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One embedded chunk of a document. Immutable once written; the chunk id
/// (`"<file-stem>_<index>"`) is deterministic per file so chunks can be
/// re-opened by id across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Source document display name
    pub doc: String,

    /// Raw chunk text
    #[serde(rename = "chunk")]
    pub text: String,

    /// Stable chunk id: file stem plus zero-based chunk index
    pub chunk_id: String,

    /// Absolute path of the source file
    pub file_path: PathBuf,
}

impl ChunkRecord {
    pub fn new(
        doc: impl Into<String>,
        text: impl Into<String>,
        chunk_id: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            doc: doc.into(),
            text: text.into(),
            chunk_id: chunk_id.into(),
            file_path: file_path.into(),
        }
    }
}
