//! Error types for the agent loop and its contracts.

use corpus_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors raised while parsing a planner output into a `Plan`
#[derive(Error, Debug)]
pub enum PlanError {
    /// Neither the terminal sentinel nor a tool call
    #[error("Unrecognized plan shape: {0}")]
    Unrecognized(String),

    /// Tool-call segments present but malformed
    #[error("Malformed tool arguments: {0}")]
    BadArguments(String),
}

/// Errors raised by the tool execution protocol
#[derive(Error, Debug)]
pub enum ToolError {
    /// Name not present in the session's catalog
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Argument shape rejected at the protocol boundary
    #[error("Malformed tool call: {0}")]
    MalformedPlan(String),

    /// The remote call itself failed
    #[error("Tool call failed: {0}")]
    CallFailed(String),
}

/// Errors raised by the loop's collaborator contracts
#[derive(Error, Debug)]
pub enum AgentError {
    /// Perception contract failed
    #[error("Perception failed: {0}")]
    Perception(String),

    /// Plan generation failed
    #[error("Planning failed: {0}")]
    Planning(String),

    /// Memory manager failed
    #[error("Memory error: {0}")]
    Memory(String),

    /// Plan parse failure
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Tool protocol failure
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Embedding failure inside session memory
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ToolError::UnknownTool("get_weather".to_string());
        assert_eq!(err.to_string(), "Unknown tool: get_weather");

        let err = PlanError::Unrecognized("hello".to_string());
        assert_eq!(err.to_string(), "Unrecognized plan shape: hello");

        let err = AgentError::Perception("empty input".to_string());
        assert_eq!(err.to_string(), "Perception failed: empty input");
    }

    #[test]
    fn test_from_plan_error() {
        let err: AgentError = PlanError::BadArguments("no name".to_string()).into();
        assert!(matches!(err, AgentError::Plan(_)));
    }

    #[test]
    fn test_from_tool_error() {
        let err: AgentError = ToolError::CallFailed("timeout".to_string()).into();
        assert_eq!(err.to_string(), "Tool error: Tool call failed: timeout");
    }
}
