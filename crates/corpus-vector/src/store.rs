//! Ordinal-keyed chunk store.
//!
//! One store owns both sides of every chunk: the embedding vector lives in a
//! usearch index under the chunk's ordinal (u64 insertion position) and the
//! `ChunkRecord` lives at the same position in the ledger. Appends go through
//! a single call, so index and ledger cannot drift apart while the process
//! is alive; on load, a length mismatch is repaired or treated as corrupt
//! state and the store starts empty.
//!
//! The index is created lazily: its dimensionality is fixed by the first
//! embedding appended in its lifetime.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use corpus_embeddings::Embedding;
use corpus_types::ChunkRecord;
use tracing::{debug, info, warn};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::VectorError;

/// Chunk ledger file name
pub const METADATA_FILE: &str = "metadata.json";
/// Binary index file name
pub const INDEX_FILE: &str = "index.usearch";

const INITIAL_CAPACITY: usize = 1024;
const CONNECTIVITY: usize = 16;
const EXPANSION_ADD: usize = 128;
const EXPANSION_SEARCH: usize = 64;

/// One nearest-neighbor match.
#[derive(Debug, Clone)]
pub struct ChunkHit {
    /// Ordinal of the matched chunk
    pub ordinal: u64,
    /// Squared L2 distance (smaller is closer)
    pub distance: f32,
    /// The matched chunk record
    pub record: ChunkRecord,
}

/// Store summary counters.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    /// Total chunks stored
    pub chunks: usize,
    /// Distinct source documents
    pub documents: usize,
    /// Embedding dimensionality, `None` until the first append
    pub dimension: Option<usize>,
    /// Size of the persisted binary index in bytes
    pub index_bytes: u64,
}

/// Append-only chunk store: usearch index plus positionally-owned ledger.
pub struct ChunkStore {
    dir: PathBuf,
    ledger: Vec<ChunkRecord>,
    index: Option<Index>,
    dim: Option<usize>,
    reserved: usize,
}

impl ChunkStore {
    /// Open the store under `dir`, loading any persisted state. Unreadable
    /// or corrupt state logs a warning and starts empty so the pipeline
    /// stays usable.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, VectorError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let mut store = Self {
            dir,
            ledger: Vec::new(),
            index: None,
            dim: None,
            reserved: 0,
        };
        store.load_state();
        Ok(store)
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn load_state(&mut self) {
        let metadata_path = self.metadata_path();
        if metadata_path.exists() {
            match fs::read_to_string(&metadata_path) {
                Ok(raw) => match serde_json::from_str::<Vec<ChunkRecord>>(&raw) {
                    Ok(ledger) => self.ledger = ledger,
                    Err(e) => {
                        warn!(path = ?metadata_path, error = %e, "Corrupt chunk ledger, starting empty");
                    }
                },
                Err(e) => {
                    warn!(path = ?metadata_path, error = %e, "Failed to read chunk ledger, starting empty");
                }
            }
        }

        let index_path = self.index_path();
        if index_path.exists() {
            let capacity = self.ledger.len().max(INITIAL_CAPACITY);
            match load_index(&index_path, capacity) {
                Ok(index) => {
                    self.dim = Some(index.dimensions());
                    self.reserved = capacity;
                    self.index = Some(index);
                }
                Err(e) => {
                    warn!(path = ?index_path, error = %e, "Failed to load vector index, starting empty");
                    self.ledger.clear();
                }
            }
        }

        self.reconcile();
        debug!(chunks = self.ledger.len(), dim = ?self.dim, "Opened chunk store");
    }

    /// Repair or reject a ledger/index length mismatch after load.
    fn reconcile(&mut self) {
        let vectors = self.index.as_ref().map(|ix| ix.size()).unwrap_or(0);
        let records = self.ledger.len();

        if vectors == records {
            return;
        }

        if vectors < records {
            // A crash between the ledger and index writes leaves a ledger
            // tail without vectors; dropping the tail makes the affected
            // file re-processable on the next run.
            warn!(
                vectors,
                records, "Ledger longer than index, truncating unindexed tail"
            );
            self.ledger.truncate(vectors);
        } else {
            warn!(
                vectors,
                records, "Index larger than ledger, resetting store as corrupt"
            );
            self.ledger.clear();
            self.index = None;
            self.dim = None;
            self.reserved = 0;
        }
    }

    /// Number of chunks (equals the number of indexed vectors).
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Embedding dimensionality, fixed by the first appended embedding.
    pub fn dimension(&self) -> Option<usize> {
        self.dim
    }

    /// All chunk records in insertion order.
    pub fn records(&self) -> &[ChunkRecord] {
        &self.ledger
    }

    /// The record stored at an ordinal.
    pub fn record_at(&self, ordinal: u64) -> Option<&ChunkRecord> {
        self.ledger.get(ordinal as usize)
    }

    /// First record with the given chunk id.
    pub fn find_chunk(&self, chunk_id: &str) -> Option<&ChunkRecord> {
        self.ledger.iter().find(|r| r.chunk_id == chunk_id)
    }

    /// Append one chunk. Creates the index on first use and returns the
    /// assigned ordinal.
    pub fn append(&mut self, record: ChunkRecord, embedding: &Embedding) -> Result<u64, VectorError> {
        if let Some(expected) = self.dim {
            if embedding.dimension() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: embedding.dimension(),
                });
            }
        }
        self.ensure_index(embedding.dimension())?;

        let index = match &self.index {
            Some(index) => index,
            None => return Err(VectorError::Index("index not initialized".to_string())),
        };

        if self.ledger.len() >= self.reserved {
            let grown = (self.reserved * 2).max(INITIAL_CAPACITY);
            index
                .reserve(grown)
                .map_err(|e| VectorError::Index(e.to_string()))?;
            self.reserved = grown;
        }

        let ordinal = self.ledger.len() as u64;
        index
            .add(ordinal, &embedding.values)
            .map_err(|e| VectorError::Index(e.to_string()))?;
        self.ledger.push(record);

        Ok(ordinal)
    }

    /// Append a batch of chunks in order. Dimensions are validated up front
    /// so a bad batch leaves the store untouched. Returns the number of
    /// chunks appended.
    pub fn append_batch(
        &mut self,
        batch: Vec<(ChunkRecord, Embedding)>,
    ) -> Result<usize, VectorError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let expected = self.dim.unwrap_or_else(|| batch[0].1.dimension());
        for (_, embedding) in &batch {
            if embedding.dimension() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: embedding.dimension(),
                });
            }
        }

        let count = batch.len();
        for (record, embedding) in batch {
            self.append(record, &embedding)?;
        }
        Ok(count)
    }

    /// Nearest neighbors by squared L2 distance, closest first. An empty
    /// store returns an empty result.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<ChunkHit>, VectorError> {
        let index = match &self.index {
            Some(index) => index,
            None => return Ok(Vec::new()),
        };

        if let Some(expected) = self.dim {
            if query.dimension() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: query.dimension(),
                });
            }
        }

        let matches = index
            .search(&query.values, k)
            .map_err(|e| VectorError::Index(e.to_string()))?;

        let hits = matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .filter_map(|(&ordinal, &distance)| {
                self.record_at(ordinal).map(|record| ChunkHit {
                    ordinal,
                    distance,
                    record: record.clone(),
                })
            })
            .collect();

        Ok(hits)
    }

    /// Store summary.
    pub fn stats(&self) -> StoreStats {
        let documents: BTreeSet<&str> = self.ledger.iter().map(|r| r.doc.as_str()).collect();
        let index_bytes = fs::metadata(self.index_path()).map(|m| m.len()).unwrap_or(0);

        StoreStats {
            chunks: self.ledger.len(),
            documents: documents.len(),
            dimension: self.dim,
            index_bytes,
        }
    }

    /// Persist the store: the ledger is written unconditionally, the binary
    /// index only when it holds at least one vector.
    pub fn flush(&self) -> Result<(), VectorError> {
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(&self.ledger)?;
        fs::write(self.metadata_path(), json)?;

        if let Some(index) = &self.index {
            if !self.ledger.is_empty() {
                let path = self.index_path();
                let path_str = path
                    .to_str()
                    .ok_or_else(|| VectorError::Index("invalid index path encoding".to_string()))?;
                index
                    .save(path_str)
                    .map_err(|e| VectorError::Index(format!("failed to save index: {e}")))?;
            }
        }

        debug!(chunks = self.ledger.len(), "Flushed chunk store");
        Ok(())
    }

    /// Drop every chunk and remove the persisted index file. The ledger file
    /// is rewritten empty.
    pub fn clear(&mut self) -> Result<(), VectorError> {
        self.ledger.clear();
        self.index = None;
        self.dim = None;
        self.reserved = 0;

        let index_path = self.index_path();
        if index_path.exists() {
            fs::remove_file(&index_path)?;
        }
        self.flush()?;

        info!("Cleared chunk store");
        Ok(())
    }

    fn ensure_index(&mut self, dimensions: usize) -> Result<(), VectorError> {
        if self.index.is_some() {
            return Ok(());
        }

        info!(dim = dimensions, "Creating vector index");
        let index = new_index(dimensions)?;
        index
            .reserve(INITIAL_CAPACITY)
            .map_err(|e| VectorError::Index(e.to_string()))?;

        self.dim = Some(dimensions);
        self.reserved = INITIAL_CAPACITY;
        self.index = Some(index);
        Ok(())
    }
}

fn index_options(dimensions: usize) -> IndexOptions {
    IndexOptions {
        dimensions,
        metric: MetricKind::L2sq,
        quantization: ScalarKind::F32,
        connectivity: CONNECTIVITY,
        expansion_add: EXPANSION_ADD,
        expansion_search: EXPANSION_SEARCH,
        multi: false,
    }
}

fn new_index(dimensions: usize) -> Result<Index, VectorError> {
    Index::new(&index_options(dimensions)).map_err(|e| VectorError::Index(e.to_string()))
}

fn load_index(path: &Path, capacity: usize) -> Result<Index, VectorError> {
    // Deserialization restores the saved dimensionality; the placeholder
    // here only satisfies construction.
    let index = new_index(1)?;
    let path_str = path
        .to_str()
        .ok_or_else(|| VectorError::Index("invalid index path encoding".to_string()))?;
    index
        .load(path_str)
        .map_err(|e| VectorError::Index(format!("failed to load index: {e}")))?;

    // A loaded index holds no spare capacity; reserve before any append.
    index
        .reserve(capacity.max(index.size()))
        .map_err(|e| VectorError::Index(e.to_string()))?;
    Ok(index)
}
