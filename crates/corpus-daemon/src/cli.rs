//! CLI argument parsing for the corpus daemon.

use clap::{Parser, Subcommand};

/// Doc Corpus Daemon
///
/// Local document indexing and retrieval over an embedding index.
#[derive(Parser, Debug)]
#[command(name = "corpus-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/doc-corpus/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a directory and track every supported file found
    Scan {
        /// Directory to walk (default: configured watch_dir)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Run one indexing pass over the tracked files
    Index,

    /// Search indexed chunks by semantic similarity
    Search {
        /// Query text
        query: String,

        /// Number of results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
    },

    /// Inspect the tracked file list
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },

    /// Show one indexed chunk by id
    Chunk {
        /// Chunk id, e.g. "report_0"
        chunk_id: String,
    },

    /// Clear persisted state
    Reset {
        /// Clear the document hash cache
        #[arg(long)]
        cache: bool,

        /// Clear the chunk ledger and vector index
        #[arg(long)]
        store: bool,

        /// Clear the tracked file list
        #[arg(long)]
        tracked: bool,
    },

    /// Show persisted-state summary
    Status,
}

/// Tracked-list subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FilesCommands {
    /// List all tracked files
    List,

    /// Show aggregate statistics
    Stats,

    /// Filter tracked files by name substring
    Search {
        /// Case-insensitive needle matched against file names
        query: String,
    },

    /// Export the tracked list as CSV
    Export {
        /// Output file path
        out: String,
    },
}
