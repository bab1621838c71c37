//! Command implementations for the corpus daemon.
//!
//! Each handler opens the persisted state it needs under
//! `Settings.data_dir`, does its work, and prints a plain-text summary.
//! Internal progress goes to `tracing`; stdout is reserved for the
//! user-facing result.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};
use walkdir::WalkDir;

use corpus_embeddings::{Embedder, OllamaConfig, OllamaEmbedder};
use corpus_indexing::{IndexingPipeline, PipelineConfig, PlainTextConverter};
use corpus_tracker::{drain_events, FileTracker, WatchEvent};
use corpus_types::{FileRecord, RunContext, Settings};
use corpus_vector::{ChunkStore, HashCache};

use crate::cli::FilesCommands;

/// Initialize logging from settings, with `RUST_LOG` taking precedence
/// when set.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

fn build_embedder(settings: &Settings) -> Result<OllamaEmbedder> {
    let config = OllamaConfig::new(&settings.embedding.url, &settings.embedding.model)
        .with_timeout(Duration::from_secs(settings.embedding.timeout_secs));
    OllamaEmbedder::new(config).context("Failed to build embedding client")
}

/// Walk a directory and feed every file through the tracker as a synthetic
/// create event. Stands in for the external watch service: the same worker
/// drains the same channel the watcher would fill.
pub async fn handle_scan(settings: &Settings, dir_override: Option<&str>) -> Result<()> {
    let data_dir = settings.expanded_data_dir();
    let scan_dir = match dir_override {
        Some(dir) => PathBuf::from(dir),
        None => settings.expanded_watch_dir(),
    };
    if !scan_dir.is_dir() {
        bail!("Scan directory {} does not exist", scan_dir.display());
    }

    let mut tracker = FileTracker::open(&data_dir).context("Failed to open file tracker")?;
    let before = tracker.len();

    let ctx = RunContext::new();
    let cancel = ctx.cancellation_token();
    let (sender, receiver) = mpsc::channel(256);
    let worker = tokio::spawn(async move {
        let drained = drain_events(receiver, &mut tracker, cancel).await;
        (tracker, drained)
    });

    let mut sent = 0usize;
    for entry in WalkDir::new(&scan_dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if sender.send(WatchEvent::created(entry.path())).await.is_err() {
            break;
        }
        sent += 1;
    }
    drop(sender);

    let (tracker, drained) = worker.await.context("Tracker worker failed")?;
    let recorded = drained?;
    info!(run_id = %ctx.run_id(), seen = sent, recorded, "Scan complete");

    println!("Scanned {}", scan_dir.display());
    println!("  Files seen:    {sent}");
    println!("  Newly tracked: {recorded}");
    println!("  Total tracked: {} (was {before})", tracker.len());
    Ok(())
}

/// Run one indexing pass over every tracked file.
pub async fn handle_index(settings: &Settings) -> Result<()> {
    let data_dir = settings.expanded_data_dir();
    let tracker = FileTracker::open(&data_dir).context("Failed to open file tracker")?;
    if tracker.is_empty() {
        println!("No files tracked yet; run `corpus-daemon scan` first.");
        return Ok(());
    }

    let store = ChunkStore::open(&data_dir).context("Failed to open chunk store")?;
    let cache = HashCache::open(&data_dir).context("Failed to open hash cache")?;
    let embedder = build_embedder(settings)?;
    let config = PipelineConfig::default()
        .with_window(settings.chunking.window)
        .with_overlap(settings.chunking.overlap);
    let mut pipeline =
        IndexingPipeline::new(PlainTextConverter::new(), embedder, store, cache, config)
            .context("Failed to build indexing pipeline")?;

    let ctx = RunContext::new();
    let report = pipeline.run(tracker.records(), &ctx).await?;

    println!("Indexing run {} finished", ctx.run_id());
    println!("  Files seen:   {}", report.files_seen);
    println!("  Indexed:      {}", report.files_indexed);
    println!("  Unchanged:    {}", report.files_unchanged);
    println!("  Missing:      {}", report.files_missing);
    println!("  Failed:       {}", report.files_failed);
    println!("  Chunks added: {}", report.chunks_added);
    Ok(())
}

/// Embed the query and print the nearest indexed chunks.
pub async fn handle_search(settings: &Settings, query: &str, top_k: usize) -> Result<()> {
    let data_dir = settings.expanded_data_dir();
    let store = ChunkStore::open(&data_dir).context("Failed to open chunk store")?;
    if store.is_empty() {
        println!("The chunk store is empty; run `corpus-daemon index` first.");
        return Ok(());
    }

    let embedder = build_embedder(settings)?;
    let embedding = embedder
        .embed(query)
        .await
        .context("Failed to embed query")?;
    let hits = store.search(&embedding, top_k)?;

    if hits.is_empty() {
        println!("No matches for \"{query}\"");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. [{:.4}] {} ({})",
            rank + 1,
            hit.distance,
            hit.record.doc,
            hit.record.chunk_id
        );
        println!("    {}", snippet(&hit.record.text, 160));
    }
    Ok(())
}

/// Tracked-list viewer: list, stats, name search, CSV export.
pub fn handle_files(settings: &Settings, command: FilesCommands) -> Result<()> {
    let data_dir = settings.expanded_data_dir();
    let tracker = FileTracker::open(&data_dir).context("Failed to open file tracker")?;

    match command {
        FilesCommands::List => {
            if tracker.is_empty() {
                println!("No files tracked yet.");
                return Ok(());
            }
            for record in tracker.records() {
                print_record(record);
            }
            println!("{} files tracked", tracker.len());
        }
        FilesCommands::Stats => {
            let stats = tracker.stats();
            println!("Tracked files: {}", stats.files);
            println!("Total size:    {:.2} KB", stats.total_size_kb);
            if !stats.by_extension.is_empty() {
                println!("By extension:");
                for (extension, count) in &stats.by_extension {
                    println!("  {extension:<6} {count}");
                }
            }
            if let Some(largest) = &stats.largest {
                println!(
                    "Largest:       {} ({:.2} KB)",
                    largest.file_name, largest.size_kb
                );
            }
            if let Some(most_recent) = &stats.most_recent {
                println!(
                    "Most recent:   {} ({})",
                    most_recent.file_name,
                    most_recent.last_modified.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        FilesCommands::Search { query } => {
            let matches = tracker.search(&query);
            if matches.is_empty() {
                println!("No tracked files match \"{query}\"");
                return Ok(());
            }
            for record in &matches {
                print_record(record);
            }
            println!("{} of {} files match", matches.len(), tracker.len());
        }
        FilesCommands::Export { out } => {
            let out = PathBuf::from(out);
            let rows = tracker.export_csv(&out).context("Failed to export CSV")?;
            println!("Exported {} rows to {}", rows, out.display());
        }
    }
    Ok(())
}

/// Print one indexed chunk by id.
pub fn handle_chunk(settings: &Settings, chunk_id: &str) -> Result<()> {
    let data_dir = settings.expanded_data_dir();
    let store = ChunkStore::open(&data_dir).context("Failed to open chunk store")?;
    match store.find_chunk(chunk_id) {
        Some(record) => {
            println!("Chunk:    {}", record.chunk_id);
            println!("Document: {}", record.doc);
            println!("Path:     {}", record.file_path.display());
            println!();
            println!("{}", record.text);
            Ok(())
        }
        None => bail!("No chunk with id \"{chunk_id}\""),
    }
}

/// Clear selected persisted state.
pub fn handle_reset(settings: &Settings, cache: bool, store: bool, tracked: bool) -> Result<()> {
    if !cache && !store && !tracked {
        bail!("Nothing selected; pass at least one of --cache, --store, --tracked");
    }
    let data_dir = settings.expanded_data_dir();

    if tracked {
        let mut tracker = FileTracker::open(&data_dir).context("Failed to open file tracker")?;
        tracker
            .reset()
            .context("Failed to clear tracked file list")?;
        println!("Cleared tracked file list");
    }
    if cache {
        let mut hashes = HashCache::open(&data_dir).context("Failed to open hash cache")?;
        hashes.reset().context("Failed to clear hash cache")?;
        println!("Cleared document hash cache");
    }
    if store {
        let mut chunks = ChunkStore::open(&data_dir).context("Failed to open chunk store")?;
        chunks.clear().context("Failed to clear chunk store")?;
        println!("Cleared chunk ledger and vector index");
    }
    Ok(())
}

/// Summarize all persisted state.
pub fn handle_status(settings: &Settings) -> Result<()> {
    let data_dir = settings.expanded_data_dir();
    let tracker = FileTracker::open(&data_dir).context("Failed to open file tracker")?;
    let cache = HashCache::open(&data_dir).context("Failed to open hash cache")?;
    let store = ChunkStore::open(&data_dir).context("Failed to open chunk store")?;
    let stats = store.stats();

    println!("Data directory:  {}", data_dir.display());
    println!("Watch directory: {}", settings.expanded_watch_dir().display());
    println!("Tracked files:   {}", tracker.len());
    println!("Cached hashes:   {}", cache.len());
    println!(
        "Indexed chunks:  {} across {} documents",
        stats.chunks, stats.documents
    );
    match stats.dimension {
        Some(dimension) => println!("Dimensions:      {dimension}"),
        None => println!("Dimensions:      (no embeddings yet)"),
    }
    println!("Index size:      {} bytes", stats.index_bytes);
    Ok(())
}

fn print_record(record: &FileRecord) {
    println!(
        "{:>10.2} KB  {}  {}",
        record.size_kb,
        record.last_modified.format("%Y-%m-%d %H:%M"),
        record.file_path.display()
    );
}

/// Single-line preview, cut at `max` characters.
fn snippet(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_settings(dir: &Path) -> Settings {
        Settings {
            data_dir: dir.join("data").to_string_lossy().to_string(),
            watch_dir: dir.join("docs").to_string_lossy().to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_snippet_short_text_unchanged() {
        assert_eq!(snippet("a short chunk", 160), "a short chunk");
    }

    #[test]
    fn test_snippet_flattens_and_truncates() {
        let text = "word ".repeat(100);
        let cut = snippet(&text, 20);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 23);
        assert!(!cut.contains('\n'));
    }

    #[test]
    fn test_reset_requires_a_flag() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        assert!(handle_reset(&settings, false, false, false).is_err());
    }

    #[test]
    fn test_chunk_missing_id_errors() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        assert!(handle_chunk(&settings, "nope_0").is_err());
    }

    #[test]
    fn test_status_on_empty_state() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        assert!(handle_status(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_scan_tracks_supported_files() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());

        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("nested")).unwrap();
        fs::write(docs.join("a.txt"), "alpha").unwrap();
        fs::write(docs.join("nested/b.md"), "bravo").unwrap();
        fs::write(docs.join("noise.bin"), [0u8, 1]).unwrap();

        handle_scan(&settings, None).await.unwrap();

        let tracker = FileTracker::open(settings.expanded_data_dir()).unwrap();
        assert_eq!(tracker.len(), 2);

        // A second scan of the same tree records nothing new.
        handle_scan(&settings, None).await.unwrap();
        let tracker = FileTracker::open(settings.expanded_data_dir()).unwrap();
        assert_eq!(tracker.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_missing_directory_errors() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        assert!(handle_scan(&settings, None).await.is_err());
    }

    #[tokio::test]
    async fn test_index_with_nothing_tracked_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        assert!(handle_index(&settings).await.is_ok());
    }

    #[test]
    fn test_files_export_writes_csv() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let out = dir.path().join("files.csv");

        handle_files(
            &settings,
            FilesCommands::Export {
                out: out.to_string_lossy().to_string(),
            },
        )
        .unwrap();

        let csv = fs::read_to_string(&out).unwrap();
        assert!(csv.starts_with("file_name,file_path,extension,size_kb,last_modified"));
    }
}
