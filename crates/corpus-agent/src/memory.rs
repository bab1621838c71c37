//! Session-scoped memory of prior tool outputs.
//!
//! The loop is the sole writer: each successful tool call appends one
//! `MemoryItem`, and retrieval at the top of the next iteration surfaces
//! the most similar prior outputs. `SessionMemory` is the in-process
//! reference implementation of the `MemoryManager` contract the external
//! manager also satisfies.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corpus_embeddings::{Embedder, Embedding};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;

/// The `type` value every loop-written item carries.
pub const TOOL_OUTPUT_TYPE: &str = "tool_output";

/// One remembered tool outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Human-readable record of the call and its result
    pub text: String,

    /// Item kind discriminator
    #[serde(rename = "type")]
    pub item_type: String,

    /// Tool that produced the output
    pub tool_name: String,

    /// The original user query this call served
    pub user_query: String,

    /// Free-form tags; the loop tags items with the tool name
    pub tags: Vec<String>,

    /// Session the item belongs to
    pub session_id: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl MemoryItem {
    /// Build a tool-output item, tagged with the tool name.
    pub fn tool_output(
        text: impl Into<String>,
        tool_name: impl Into<String>,
        user_query: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        let tool_name = tool_name.into();
        Self {
            text: text.into(),
            item_type: TOOL_OUTPUT_TYPE.to_string(),
            tags: vec![tool_name.clone()],
            tool_name,
            user_query: user_query.into(),
            session_id: session_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Memory contract the loop writes to and retrieves from.
#[async_trait]
pub trait MemoryManager: Send + Sync {
    /// Texts of the `top_k` stored items most similar to `query` within
    /// one session, best first.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        session_id: &str,
    ) -> Result<Vec<String>, AgentError>;

    /// Append one item.
    async fn add(&self, item: MemoryItem) -> Result<(), AgentError>;
}

/// In-process `MemoryManager` ranking items by cosine similarity.
pub struct SessionMemory<E> {
    embedder: E,
    items: Mutex<Vec<(MemoryItem, Embedding)>>,
}

impl<E: Embedder> SessionMemory<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<E: Embedder> MemoryManager for SessionMemory<E> {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        session_id: &str,
    ) -> Result<Vec<String>, AgentError> {
        let query_embedding = self.embedder.embed(query).await?;

        let items = self
            .items
            .lock()
            .map_err(|_| AgentError::Memory("memory store poisoned".to_string()))?;

        let mut scored: Vec<(f32, &MemoryItem)> = items
            .iter()
            .filter(|(item, _)| item.session_id == session_id)
            .map(|(item, embedding)| (query_embedding.cosine_similarity(embedding), item))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let texts = scored
            .into_iter()
            .take(top_k)
            .map(|(_, item)| item.text.clone())
            .collect();
        Ok(texts)
    }

    async fn add(&self, item: MemoryItem) -> Result<(), AgentError> {
        let embedding = self.embedder.embed(&item.text).await?;

        let mut items = self
            .items
            .lock()
            .map_err(|_| AgentError::Memory("memory store poisoned".to_string()))?;
        debug!(tool = %item.tool_name, session = %item.session_id, "Stored memory item");
        items.push((item, embedding));
        Ok(())
    }
}
