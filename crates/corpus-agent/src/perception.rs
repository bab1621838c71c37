//! Perception contract: raw user text to structured intent.

use async_trait::async_trait;

use crate::error::AgentError;

/// Structured reading of the current working input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perception {
    /// What the user is asking for
    pub intent: String,
    /// Optional hint at which tool could serve the intent
    pub tool_hint: Option<String>,
}

impl Perception {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            tool_hint: None,
        }
    }

    pub fn with_tool_hint(mut self, hint: impl Into<String>) -> Self {
        self.tool_hint = Some(hint.into());
        self
    }
}

/// Extracts a `Perception` from the working input. Implemented by the
/// external perception service; a failure here aborts the loop iteration.
#[async_trait]
pub trait Perceiver: Send + Sync {
    async fn extract(&self, input: &str) -> Result<Perception, AgentError>;
}
