//! Configuration loading for doc-corpus.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/doc-corpus/config.toml) -> CLI-specified config file ->
//! CORPUS_* environment variables -> CLI flags (applied by the caller).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CorpusError;

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding endpoint URL
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model name requested from the service
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Per-call timeout in seconds (a single attempt, no retries)
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_url() -> String {
    "http://localhost:11434/api/embeddings".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Chunking window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    /// Window size in words
    #[serde(default = "default_chunk_window")]
    pub window: usize,

    /// Overlap between consecutive windows, in words
    #[serde(default = "default_chunk_overlap")]
    pub overlap: usize,
}

fn default_chunk_window() -> usize {
    256
}

fn default_chunk_overlap() -> usize {
    40
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            window: default_chunk_window(),
            overlap: default_chunk_overlap(),
        }
    }
}

impl ChunkingSettings {
    /// Validate window geometry. The stride `window - overlap` must be
    /// positive or chunking cannot make progress.
    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 {
            return Err("chunking.window must be > 0".to_string());
        }
        if self.overlap >= self.window {
            return Err(format!(
                "chunking.overlap ({}) must be smaller than chunking.window ({})",
                self.overlap, self.window
            ));
        }
        Ok(())
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum loop iterations before reporting step-cap exhaustion
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Memories retrieved per iteration
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_max_steps() -> u32 {
    3
}

fn default_top_k() -> usize {
    3
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            top_k: default_top_k(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding all persisted state (tracked list, cache, ledger,
    /// vector index)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory scanned for documents
    #[serde(default = "default_watch_dir")]
    pub watch_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingSettings,

    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentSettings,
}

fn default_data_dir() -> String {
    ProjectDirs::from("", "", "doc-corpus")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_watch_dir() -> String {
    "~/Documents".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            watch_dir: default_watch_dir(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
            chunking: ChunkingSettings::default(),
            agent: AgentSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/doc-corpus/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CORPUS_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, CorpusError> {
        let config_dir = ProjectDirs::from("", "", "doc-corpus")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("data_dir", default_data_dir())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("watch_dir", default_watch_dir())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("embedding.url", default_embedding_url())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("embedding.model", default_embedding_model())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("embedding.timeout_secs", default_embedding_timeout() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("chunking.window", default_chunk_window() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("chunking.overlap", default_chunk_overlap() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("agent.max_steps", default_max_steps() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("agent.top_k", default_top_k() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: CORPUS_DATA_DIR, CORPUS_EMBEDDING_URL, CORPUS_AGENT_TOP_K, ...
        builder = builder.add_source(
            Environment::with_prefix("CORPUS")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| CorpusError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| CorpusError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), CorpusError> {
        self.chunking.validate().map_err(CorpusError::Config)?;
        if self.agent.max_steps == 0 {
            return Err(CorpusError::Config("agent.max_steps must be > 0".to_string()));
        }
        Ok(())
    }

    /// Expand ~ in data_dir to the actual home directory.
    pub fn expanded_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    /// Expand ~ in watch_dir to the actual home directory.
    pub fn expanded_watch_dir(&self) -> PathBuf {
        expand_home(&self.watch_dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .or_else(|| std::env::var("HOME").ok().map(PathBuf::from))
}
