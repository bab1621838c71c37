//! # corpus-vector
//!
//! Persistent chunk storage for doc-corpus.
//!
//! `ChunkStore` keys every chunk by an auto-incrementing ordinal and owns
//! both the chunk's vector (usearch index) and its metadata record, so the
//! two can never drift apart. `HashCache` remembers the last-indexed content
//! hash per file so unchanged files are skipped on re-runs.
//!
//! On-disk artifacts, all under one data directory:
//! - `metadata.json` — ordered JSON list of chunk records
//! - `index.usearch` — binary similarity index, written only when non-empty
//! - `doc_cache.json` — file name -> content-hash hex map

pub mod cache;
pub mod error;
pub mod store;

pub use cache::{HashCache, DOC_CACHE_FILE};
pub use error::VectorError;
pub use store::{ChunkHit, ChunkStore, StoreStats, INDEX_FILE, METADATA_FILE};
