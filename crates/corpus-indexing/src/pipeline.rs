//! Indexing pipeline: hash, convert, chunk, embed, commit.
//!
//! A run walks the tracked file list and brings the chunk store up to date
//! with what is on disk. Per-file problems (missing file, failed
//! conversion, unreachable embedding service) degrade that file and the
//! run continues; store failures end the run because the on-disk artifacts
//! must only ever hold fully committed files.
//!
//! A file commits all of its chunks or none of them: embeddings for every
//! chunk are fetched before anything is appended, and the cache entry that
//! marks the file as done is written only after the store has flushed.

use corpus_embeddings::Embedder;
use corpus_types::{ChunkRecord, FileRecord, RunContext};
use corpus_vector::{ChunkStore, HashCache};
use tracing::{debug, info, warn};

use crate::chunker::{Chunker, DEFAULT_OVERLAP, DEFAULT_WINDOW};
use crate::convert::DocumentConverter;
use crate::error::IndexingError;
use crate::guard::RunLock;
use crate::hash::sha256_file;

/// Counters for one index run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files examined
    pub files_seen: usize,
    /// Files whose chunks were embedded and committed
    pub files_indexed: usize,
    /// Files skipped because their content hash was already cached
    pub files_unchanged: usize,
    /// Tracked files no longer present on disk
    pub files_missing: usize,
    /// Files that failed conversion, hashing, or embedding
    pub files_failed: usize,
    /// Chunks appended to the store
    pub chunks_added: usize,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: &RunReport) {
        self.files_seen += other.files_seen;
        self.files_indexed += other.files_indexed;
        self.files_unchanged += other.files_unchanged;
        self.files_missing += other.files_missing;
        self.files_failed += other.files_failed;
        self.chunks_added += other.chunks_added;
    }

    /// Whether the run changed the store.
    pub fn has_updates(&self) -> bool {
        self.chunks_added > 0
    }
}

/// Configuration for the indexing pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Words per chunk
    pub window: usize,
    /// Words shared between consecutive chunks
    pub overlap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl PipelineConfig {
    /// Set the chunk window size.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the chunk overlap.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }
}

/// Pipeline that keeps the chunk store in sync with tracked files.
pub struct IndexingPipeline<C, E> {
    converter: C,
    embedder: E,
    store: ChunkStore,
    cache: HashCache,
    chunker: Chunker,
    lock: RunLock,
}

impl<C: DocumentConverter, E: Embedder> IndexingPipeline<C, E> {
    /// Build a pipeline over an opened store and cache.
    pub fn new(
        converter: C,
        embedder: E,
        store: ChunkStore,
        cache: HashCache,
        config: PipelineConfig,
    ) -> Result<Self, IndexingError> {
        let chunker = Chunker::new(config.window, config.overlap)?;
        Ok(Self {
            converter,
            embedder,
            store,
            cache,
            chunker,
            lock: RunLock::new(),
        })
    }

    /// The chunk store backing this pipeline.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// The hash cache backing this pipeline.
    pub fn cache(&self) -> &HashCache {
        &self.cache
    }

    /// Handle on the single-flight lock, for observing run state.
    pub fn run_lock(&self) -> RunLock {
        self.lock.clone()
    }

    /// Process the tracked files and commit new or changed content.
    ///
    /// Returns `RunInProgress` if another run holds the lock. Cancellation
    /// is honored between files; work committed before the cancel stays
    /// committed.
    pub async fn run(
        &mut self,
        files: &[FileRecord],
        ctx: &RunContext,
    ) -> Result<RunReport, IndexingError> {
        let _token = self.lock.try_acquire().ok_or(IndexingError::RunInProgress)?;

        info!(run_id = %ctx.run_id(), files = files.len(), "Starting index run");
        let mut report = RunReport::new();

        for record in files {
            if ctx.is_cancelled() {
                info!(seen = report.files_seen, "Index run cancelled");
                break;
            }

            report.files_seen += 1;

            if !record.file_path.exists() {
                warn!(file = %record.file_name, path = ?record.file_path, "Tracked file missing on disk");
                report.files_missing += 1;
                continue;
            }

            let hash = match sha256_file(&record.file_path) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(file = %record.file_name, error = %e, "Failed to hash file");
                    report.files_failed += 1;
                    continue;
                }
            };

            if self.cache.matches(&record.file_name, &hash) {
                debug!(file = %record.file_name, "Content unchanged, skipping");
                report.files_unchanged += 1;
                continue;
            }

            let text = match self.converter.convert(&record.file_path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %record.file_name, error = %e, "Conversion failed");
                    report.files_failed += 1;
                    continue;
                }
            };

            let chunks = self.chunker.chunk(&text);
            if chunks.is_empty() {
                // The hash is still cached, so an unchanged empty file is
                // skipped next run; new content changes the hash anyway.
                debug!(file = %record.file_name, "No text content, nothing to embed");
                self.cache.set(record.file_name.clone(), hash);
                self.cache.flush()?;
                report.files_indexed += 1;
                continue;
            }

            let embeddings = match self.embedder.embed_batch(&chunks).await {
                Ok(embeddings) => embeddings,
                Err(e) => {
                    warn!(file = %record.file_name, error = %e, "Embedding failed, file left unindexed");
                    report.files_failed += 1;
                    continue;
                }
            };

            let stem = record.stem();
            let pairs: Vec<(ChunkRecord, _)> = chunks
                .into_iter()
                .zip(embeddings)
                .enumerate()
                .map(|(i, (text, embedding))| {
                    let chunk = ChunkRecord::new(
                        record.file_name.clone(),
                        text,
                        format!("{stem}_{i}"),
                        record.file_path.clone(),
                    );
                    (chunk, embedding)
                })
                .collect();

            // Store errors end the run: the partial appends for this file
            // are never flushed, so disk keeps the last good commit.
            let added = self.store.append_batch(pairs)?;
            self.store.flush()?;
            self.cache.set(record.file_name.clone(), hash);
            self.cache.flush()?;

            info!(file = %record.file_name, chunks = added, "Indexed file");
            report.files_indexed += 1;
            report.chunks_added += added;
        }

        // Unconditional flush so the artifacts exist even after an empty run.
        self.store.flush()?;
        self.cache.flush()?;

        info!(
            indexed = report.files_indexed,
            unchanged = report.files_unchanged,
            missing = report.files_missing,
            failed = report.files_failed,
            chunks = report.chunks_added,
            "Index run complete"
        );
        Ok(report)
    }

    /// Drop all indexed chunks and cached hashes, persisting the empty
    /// state.
    pub fn reset(&mut self) -> Result<(), IndexingError> {
        self.store.clear()?;
        self.cache.reset()?;
        info!("Pipeline state reset");
        Ok(())
    }
}
