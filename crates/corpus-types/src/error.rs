//! Base error types shared across the workspace.

use thiserror::Error;

/// Errors produced by the shared infrastructure: configuration loading,
/// persisted-state serialization, and filesystem access.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
