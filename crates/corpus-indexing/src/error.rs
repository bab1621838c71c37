//! Error types for the indexing pipeline.

use corpus_embeddings::EmbeddingError;
use corpus_vector::VectorError;
use thiserror::Error;

use crate::convert::ConvertError;

/// Errors that can occur in the indexing pipeline
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Another run holds the single-flight lock
    #[error("Indexing run already in progress")]
    RunInProgress,

    /// Invalid chunking or pipeline configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Document-to-text conversion failed
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Chunk store operation failed
    #[error("Vector store error: {0}")]
    Vector(#[from] VectorError),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
