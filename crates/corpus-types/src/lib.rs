//! # corpus-types
//!
//! Shared domain types for the doc-corpus system.
//!
//! This crate defines the data structures used throughout the workspace:
//! - `FileRecord`: a tracked source document, persisted in discovery order
//! - `ChunkRecord`: one embedded chunk of a document's text
//! - `RunContext`: per-run identifiers and cancellation, passed explicitly
//!   instead of shared global flags
//! - `Settings`: layered configuration (defaults -> file -> env -> CLI)
//! - `CorpusError`: base error type shared by the leaf crates

pub mod config;
pub mod context;
pub mod error;
pub mod record;

pub use config::{AgentSettings, ChunkingSettings, EmbeddingSettings, Settings};
pub use context::RunContext;
pub use error::CorpusError;
pub use record::{ChunkRecord, FileRecord};
