//! # corpus-embeddings
//!
//! Embedding generation for doc-corpus via an external embedding service.
//!
//! The pipeline and session memory talk to the service through the
//! `Embedder` trait; `OllamaEmbedder` is the HTTP implementation. Each
//! embedding request is one synchronous attempt with a per-call timeout and
//! no retry.

pub mod error;
pub mod model;
pub mod ollama;

pub use error::EmbeddingError;
pub use model::{Embedder, Embedding};
pub use ollama::{OllamaConfig, OllamaEmbedder};
