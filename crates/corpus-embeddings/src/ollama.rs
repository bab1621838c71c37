//! Ollama-compatible embedding client.
//!
//! Posts `{model, prompt}` to an embeddings endpoint and expects
//! `{"embedding": [f32, ...]}` back. Exactly one attempt per call; the only
//! guard against a hung service is the client-level timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{Embedder, Embedding};

/// Configuration for the Ollama embedding client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Endpoint URL (e.g., "http://localhost:11434/api/embeddings")
    pub url: String,

    /// Model name (e.g., "nomic-embed-text")
    pub model: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/embeddings".to_string(),
            model: "nomic-embed-text".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl OllamaConfig {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// HTTP embedding client for Ollama-compatible services.
pub struct OllamaEmbedder {
    client: Client,
    config: OllamaConfig,
}

impl OllamaEmbedder {
    /// Create a new embedder with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.config.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status { status, body });
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        if body.embedding.is_empty() {
            return Err(EmbeddingError::Parse(
                "service returned an empty embedding".to_string(),
            ));
        }

        debug!(
            model = %self.config.model,
            dim = body.embedding.len(),
            chars = text.len(),
            "Embedded text"
        );
        Ok(Embedding::new(body.embedding))
    }
}
