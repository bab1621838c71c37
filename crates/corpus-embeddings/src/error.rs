//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while requesting embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Client construction or configuration error
    #[error("Embedding config error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, body read)
    #[error("Embedding request failed: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("Embedding service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not contain a usable vector
    #[error("Embedding response parse error: {0}")]
    Parse(String),
}
