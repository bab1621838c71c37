//! Doc Corpus Daemon
//!
//! Local document indexing and retrieval over an embedding index.
//!
//! # Usage
//!
//! ```bash
//! corpus-daemon scan [--dir DIR]
//! corpus-daemon index
//! corpus-daemon search "<query>" [-k N]
//! corpus-daemon files <list|stats|search|export>
//! corpus-daemon chunk <id>
//! corpus-daemon reset [--cache] [--store] [--tracked]
//! corpus-daemon status
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/doc-corpus/config.toml)
//! 3. Environment variables (CORPUS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use corpus_daemon::{
    handle_chunk, handle_files, handle_index, handle_reset, handle_scan, handle_search,
    handle_status, init_logging, load_settings, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Scan { dir } => {
            handle_scan(&settings, dir.as_deref()).await?;
        }
        Commands::Index => {
            handle_index(&settings).await?;
        }
        Commands::Search { query, top_k } => {
            handle_search(&settings, &query, top_k).await?;
        }
        Commands::Files { command } => {
            handle_files(&settings, command)?;
        }
        Commands::Chunk { chunk_id } => {
            handle_chunk(&settings, &chunk_id)?;
        }
        Commands::Reset {
            cache,
            store,
            tracked,
        } => {
            handle_reset(&settings, cache, store, tracked)?;
        }
        Commands::Status => {
            handle_status(&settings)?;
        }
    }

    Ok(())
}
