//! Corpus daemon library exports.
//!
//! This crate provides the CLI binary for the doc-corpus system.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (scan, index, search, files,
//!   chunk, reset, status)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, FilesCommands};
pub use commands::{
    handle_chunk, handle_files, handle_index, handle_reset, handle_scan, handle_search,
    handle_status, init_logging, load_settings,
};
