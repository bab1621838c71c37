//! Tracked-file list with dedup and persistence.
//!
//! The tracker is the single authority on which files the system has seen.
//! Every accepted event appends one `FileRecord` and re-persists the full
//! list, so the on-disk order is discovery order. Uniqueness is by
//! canonicalized absolute path and survives restarts because the seen-set
//! is rebuilt from the persisted list.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use corpus_types::record::extension_of;
use corpus_types::{CorpusError, FileRecord};
use tracing::{debug, info, warn};

use crate::event::WatchEvent;

/// Tracked list file name
pub const VISITED_FILES_FILE: &str = "visited_files.json";

/// Extensions the tracker accepts, lowercase without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "xlsx", "xls", "docx", "doc", "md", "txt", "pptx", "ppt", "csv",
];

/// Summary of the tracked list.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStats {
    /// Number of tracked files
    pub files: usize,
    /// Sum of tracked sizes in kilobytes, rounded to two decimals
    pub total_size_kb: f64,
    /// File count per extension
    pub by_extension: BTreeMap<String, usize>,
    /// Largest tracked file
    pub largest: Option<FileRecord>,
    /// Most recently modified tracked file
    pub most_recent: Option<FileRecord>,
}

/// Deduplicating tracker over watch-service events.
pub struct FileTracker {
    path: PathBuf,
    records: Vec<FileRecord>,
    seen: HashSet<PathBuf>,
}

impl FileTracker {
    /// Open the tracker stored under `data_dir`. A corrupt list logs a
    /// warning and starts empty.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir)?;
        let path = dir.join(VISITED_FILES_FILE);

        let mut records = Vec::new();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(raw) => match serde_json::from_str::<Vec<FileRecord>>(&raw) {
                    Ok(list) => records = list,
                    Err(e) => {
                        warn!(path = ?path, error = %e, "Corrupt tracked-file list, starting empty");
                    }
                },
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to read tracked-file list, starting empty");
                }
            }
        }

        let seen = records.iter().map(|r| r.file_path.clone()).collect();
        debug!(files = records.len(), "Opened file tracker");
        Ok(Self {
            path,
            records,
            seen,
        })
    }

    /// Evaluate one watch event. Returns the new record when the event
    /// introduced a file, `None` when it was filtered or already tracked.
    pub fn record(&mut self, event: &WatchEvent) -> Result<Option<&FileRecord>, CorpusError> {
        let path = &event.path;

        if path.is_dir() {
            debug!(path = ?path, "Ignoring directory event");
            return Ok(None);
        }

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => {
                debug!(path = ?path, "Ignoring event without a file name");
                return Ok(None);
            }
        };
        if name.starts_with('~') || name.starts_with('.') {
            debug!(file = %name, "Ignoring temporary or hidden file");
            return Ok(None);
        }

        match extension_of(path) {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => {}
            other => {
                debug!(file = %name, extension = ?other, "Ignoring unsupported file type");
                return Ok(None);
            }
        }

        // Canonicalization both resolves the dedup key and proves the file
        // still exists; a vanished file is silently dropped.
        let canonical = match fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(e) => {
                debug!(path = ?path, error = %e, "Cannot resolve event path");
                return Ok(None);
            }
        };
        if self.seen.contains(&canonical) {
            debug!(file = %name, "Already tracked");
            return Ok(None);
        }

        let metadata = match fs::metadata(&canonical) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = ?canonical, error = %e, "Failed to stat new file");
                return Ok(None);
            }
        };
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let record = FileRecord::new(canonical.clone(), metadata.len(), modified);
        info!(file = %record.file_name, size_kb = record.size_kb, "Tracking new file");

        self.records.push(record);
        self.seen.insert(canonical);
        self.persist()?;

        Ok(self.records.last())
    }

    fn persist(&self) -> Result<(), CorpusError> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// All tracked files in discovery order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring match on file names.
    pub fn search(&self, needle: &str) -> Vec<&FileRecord> {
        let needle = needle.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.file_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Files with the given extension. Accepts `md`, `.md`, or `MD`.
    pub fn filter_extension(&self, extension: &str) -> Vec<&FileRecord> {
        let wanted = extension.trim_start_matches('.').to_lowercase();
        self.records
            .iter()
            .filter(|r| r.extension == wanted)
            .collect()
    }

    /// Summarize the tracked list.
    pub fn stats(&self) -> TrackerStats {
        let mut by_extension = BTreeMap::new();
        let mut total = 0.0;
        for record in &self.records {
            *by_extension.entry(record.extension.clone()).or_insert(0) += 1;
            total += record.size_kb;
        }

        let largest = self
            .records
            .iter()
            .max_by(|a, b| {
                a.size_kb
                    .partial_cmp(&b.size_kb)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned();
        let most_recent = self
            .records
            .iter()
            .max_by_key(|r| r.last_modified)
            .cloned();

        TrackerStats {
            files: self.records.len(),
            total_size_kb: (total * 100.0).round() / 100.0,
            by_extension,
            largest,
            most_recent,
        }
    }

    /// Write the tracked list as CSV. Returns the number of data rows.
    pub fn export_csv(&self, out: &Path) -> Result<usize, CorpusError> {
        let mut lines = Vec::with_capacity(self.records.len() + 1);
        lines.push("file_name,file_path,extension,size_kb,last_modified".to_string());

        for record in &self.records {
            let row = [
                csv_escape(&record.file_name),
                csv_escape(&record.file_path.to_string_lossy()),
                csv_escape(&record.extension),
                record.size_kb.to_string(),
                record.last_modified.to_rfc3339(),
            ]
            .join(",");
            lines.push(row);
        }

        fs::write(out, lines.join("\n") + "\n")?;
        info!(rows = self.records.len(), path = ?out, "Exported tracked list");
        Ok(self.records.len())
    }

    /// Forget every tracked file and persist the empty list.
    pub fn reset(&mut self) -> Result<(), CorpusError> {
        self.records.clear();
        self.seen.clear();
        self.persist()?;
        info!("Tracked-file list reset");
        Ok(())
    }
}

/// Quote a CSV field only when it contains a comma, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn tracker(data: &TempDir) -> FileTracker {
        FileTracker::open(data.path()).unwrap()
    }

    #[test]
    fn test_record_accepts_supported_file() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let path = touch(docs.path(), "report.pdf", "pdf bytes");

        let mut tracker = tracker(&data);
        let event = WatchEvent::created(&path);
        let record = tracker.record(&event).unwrap().cloned().unwrap();

        assert_eq!(record.file_name, "report.pdf");
        assert_eq!(record.extension, "pdf");
        assert_eq!(record.file_path, fs::canonicalize(&path).unwrap());
        assert_eq!(tracker.len(), 1);
        assert!(data.path().join(VISITED_FILES_FILE).exists());
    }

    #[test]
    fn test_dedup_same_path_twice() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let a = touch(docs.path(), "a.txt", "alpha");
        let b = touch(docs.path(), "b.txt", "beta");

        let mut tracker = tracker(&data);
        assert!(tracker.record(&WatchEvent::created(&a)).unwrap().is_some());
        assert!(tracker.record(&WatchEvent::created(&b)).unwrap().is_some());
        // Same file again, kind irrelevant
        assert!(tracker.record(&WatchEvent::created(&a)).unwrap().is_none());
        assert!(tracker.record(&WatchEvent::modified(&a)).unwrap().is_none());

        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_dedup_survives_restart() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let path = touch(docs.path(), "notes.md", "text");

        {
            let mut tracker = FileTracker::open(data.path()).unwrap();
            assert!(tracker.record(&WatchEvent::created(&path)).unwrap().is_some());
        }

        let mut tracker = FileTracker::open(data.path()).unwrap();
        assert_eq!(tracker.len(), 1);
        assert!(tracker.record(&WatchEvent::created(&path)).unwrap().is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_rejects_directory() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let mut tracker = tracker(&data);
        let event = WatchEvent::created(docs.path());
        assert!(tracker.record(&event).unwrap().is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let exe = touch(docs.path(), "tool.exe", "binary");
        let none = touch(docs.path(), "README", "no extension");

        let mut tracker = tracker(&data);
        assert!(tracker.record(&WatchEvent::created(&exe)).unwrap().is_none());
        assert!(tracker.record(&WatchEvent::created(&none)).unwrap().is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_rejects_temporary_and_hidden_names() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let office_temp = touch(docs.path(), "~$draft.docx", "lock");
        let hidden = touch(docs.path(), ".secrets.txt", "shh");

        let mut tracker = tracker(&data);
        assert!(tracker
            .record(&WatchEvent::created(&office_temp))
            .unwrap()
            .is_none());
        assert!(tracker.record(&WatchEvent::created(&hidden)).unwrap().is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_rejects_vanished_file() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let mut tracker = tracker(&data);
        let event = WatchEvent::created(docs.path().join("gone.txt"));
        assert!(tracker.record(&event).unwrap().is_none());
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let path = touch(docs.path(), "SLIDES.PPTX", "deck");

        let mut tracker = tracker(&data);
        let record = tracker.record(&WatchEvent::created(&path)).unwrap().cloned().unwrap();
        assert_eq!(record.extension, "pptx");
    }

    #[test]
    fn test_search_case_insensitive() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut tracker = tracker(&data);

        for name in ["Quarterly Report.pdf", "meeting notes.md", "budget.xlsx"] {
            let path = touch(docs.path(), name, name);
            tracker.record(&WatchEvent::created(&path)).unwrap();
        }

        let hits = tracker.search("REPORT");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_name, "Quarterly Report.pdf");
        assert!(tracker.search("missing").is_empty());
        assert_eq!(tracker.search("e").len(), 3);
    }

    #[test]
    fn test_filter_extension_normalizes() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut tracker = tracker(&data);

        for name in ["a.md", "b.md", "c.txt"] {
            let path = touch(docs.path(), name, name);
            tracker.record(&WatchEvent::created(&path)).unwrap();
        }

        assert_eq!(tracker.filter_extension("md").len(), 2);
        assert_eq!(tracker.filter_extension(".md").len(), 2);
        assert_eq!(tracker.filter_extension("MD").len(), 2);
        assert_eq!(tracker.filter_extension("txt").len(), 1);
        assert!(tracker.filter_extension("pdf").is_empty());
    }

    #[test]
    fn test_stats() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut tracker = tracker(&data);

        touch(docs.path(), "small.txt", "x");
        touch(docs.path(), "large.txt", &"y".repeat(4096));
        touch(docs.path(), "other.md", "zz");
        for name in ["small.txt", "large.txt", "other.md"] {
            tracker
                .record(&WatchEvent::created(docs.path().join(name)))
                .unwrap();
        }

        let stats = tracker.stats();
        assert_eq!(stats.files, 3);
        assert_eq!(stats.by_extension.get("txt"), Some(&2));
        assert_eq!(stats.by_extension.get("md"), Some(&1));
        assert_eq!(stats.largest.unwrap().file_name, "large.txt");
        assert!(stats.most_recent.is_some());
        assert!(stats.total_size_kb >= 4.0);
    }

    #[test]
    fn test_export_csv_quotes_commas() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut tracker = tracker(&data);

        let plain = touch(docs.path(), "plain.txt", "text");
        let comma = touch(docs.path(), "notes, final.txt", "text");
        tracker.record(&WatchEvent::created(&plain)).unwrap();
        tracker.record(&WatchEvent::created(&comma)).unwrap();

        let out = data.path().join("export.csv");
        let rows = tracker.export_csv(&out).unwrap();
        assert_eq!(rows, 2);

        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "file_name,file_path,extension,size_kb,last_modified");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("plain.txt,"));
        assert!(lines[2].starts_with("\"notes, final.txt\","));
    }

    #[test]
    fn test_reset_clears_and_persists() {
        let docs = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let path = touch(docs.path(), "doc.txt", "text");

        let mut tracker = tracker(&data);
        tracker.record(&WatchEvent::created(&path)).unwrap();
        tracker.reset().unwrap();
        assert!(tracker.is_empty());

        // The same file is trackable again after reset
        assert!(tracker.record(&WatchEvent::created(&path)).unwrap().is_some());

        let reopened = FileTracker::open(data.path()).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_corrupt_list_starts_empty() {
        let data = TempDir::new().unwrap();
        fs::write(data.path().join(VISITED_FILES_FILE), "[{broken").unwrap();

        let tracker = FileTracker::open(data.path()).unwrap();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }
}
