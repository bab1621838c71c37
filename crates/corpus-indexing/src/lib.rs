//! # corpus-indexing
//!
//! The embedding pipeline for doc-corpus: turn tracked files into searchable
//! chunks.
//!
//! A run hashes each tracked file, skips the ones whose content is already
//! cached, converts the rest to plain text, cuts the text into overlapping
//! word windows, embeds every window, and commits the chunks to the store.
//! Each file commits atomically; each run holds a single-flight lock.

pub mod chunker;
pub mod convert;
pub mod error;
pub mod guard;
pub mod hash;
pub mod pipeline;

pub use chunker::{Chunker, DEFAULT_OVERLAP, DEFAULT_WINDOW};
pub use convert::{ConvertError, DocumentConverter, PlainTextConverter};
pub use error::IndexingError;
pub use guard::{RunLock, RunToken};
pub use hash::sha256_file;
pub use pipeline::{IndexingPipeline, PipelineConfig, RunReport};
