//! Source references embedded in terminal answers.
//!
//! Planners cite sources inline as `path: <file>` and `Chunk ID: <id>`
//! markers. Extraction pulls those markers out of the answer text;
//! resolution looks them up in the chunk ledger. Both are best-effort: a
//! reference that cannot be resolved is logged and dropped, never an
//! error.

use std::path::PathBuf;
use std::sync::LazyLock;

use corpus_vector::ChunkStore;
use regex::Regex;
use tracing::debug;

static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"path:\s*(.+)").expect("valid path regex"));
static CHUNK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chunk ID:\s*([^\],\n]+)").expect("valid chunk regex"));

/// References extracted from an answer, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerRefs {
    pub paths: Vec<String>,
    pub chunk_ids: Vec<String>,
}

impl AnswerRefs {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.chunk_ids.is_empty()
    }
}

/// A reference resolved against the chunk ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    /// Set when the reference was a chunk id
    pub chunk_id: Option<String>,
    /// Source document display name
    pub doc: String,
    /// Absolute path of the source file
    pub file_path: PathBuf,
}

/// Pull `path:` and `Chunk ID:` references out of an answer. Values are
/// trimmed of the bracket the citation style wraps them in; duplicates
/// keep their first position.
pub fn extract_refs(text: &str) -> AnswerRefs {
    let mut refs = AnswerRefs::default();

    for captures in PATH_RE.captures_iter(text) {
        if let Some(m) = captures.get(1) {
            let value = clean_ref(m.as_str());
            if !value.is_empty() && !refs.paths.contains(&value) {
                refs.paths.push(value);
            }
        }
    }
    for captures in CHUNK_RE.captures_iter(text) {
        if let Some(m) = captures.get(1) {
            let value = clean_ref(m.as_str());
            if !value.is_empty() && !refs.chunk_ids.contains(&value) {
                refs.chunk_ids.push(value);
            }
        }
    }

    refs
}

fn clean_ref(raw: &str) -> String {
    raw.trim().trim_end_matches(']').trim().to_string()
}

/// Resolve extracted references against the ledger. Chunk ids resolve by
/// exact id; paths by exact path string or by file name.
pub fn resolve(refs: &AnswerRefs, store: &ChunkStore) -> Vec<Provenance> {
    let mut resolved = Vec::new();

    for chunk_id in &refs.chunk_ids {
        match store.find_chunk(chunk_id) {
            Some(record) => resolved.push(Provenance {
                chunk_id: Some(chunk_id.clone()),
                doc: record.doc.clone(),
                file_path: record.file_path.clone(),
            }),
            None => debug!(chunk_id = %chunk_id, "Referenced chunk not in ledger"),
        }
    }

    for path in &refs.paths {
        let name = PathBuf::from(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        let hit = store.records().iter().find(|r| {
            r.file_path.to_string_lossy().as_ref() == path.as_str() || Some(&r.doc) == name.as_ref()
        });
        match hit {
            Some(record) => resolved.push(Provenance {
                chunk_id: None,
                doc: record.doc.clone(),
                file_path: record.file_path.clone(),
            }),
            None => debug!(path = %path, "Referenced path not in ledger"),
        }
    }

    resolved
}
