//! Tool execution protocol.
//!
//! The loop talks to the tool-providing process through `ToolSession`.
//! `execute_tool` is the protocol: validate the name against the catalog,
//! reject malformed arguments at the boundary, make exactly one call, and
//! normalize the result.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ToolError;

/// One tool advertised by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// One-line-per-tool summary handed to the planner.
pub fn catalog_summary(catalog: &[ToolDescriptor]) -> String {
    catalog
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Live connection to the tool-providing process.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// List the tools this session offers.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError>;

    /// Invoke a tool once. `args` is always a JSON object.
    async fn call(&self, name: &str, args: &Value) -> Result<String, ToolError>;
}

/// Outcome of one tool call, folded into memory right after a success.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_name: String,
    pub arguments: Value,
    pub result: String,
}

/// Run one tool call through the protocol. No retry on any failure.
pub async fn execute_tool(
    session: &dyn ToolSession,
    catalog: &[ToolDescriptor],
    name: &str,
    args: &Value,
) -> Result<ToolResult, ToolError> {
    if !catalog.iter().any(|tool| tool.name == name) {
        return Err(ToolError::UnknownTool(name.to_string()));
    }
    if !args.is_object() {
        return Err(ToolError::MalformedPlan(format!(
            "arguments for {name} must be a JSON object"
        )));
    }

    debug!(tool = %name, "Calling tool");
    let raw = session.call(name, args).await?;

    Ok(ToolResult {
        tool_name: name.to_string(),
        arguments: args.clone(),
        result: raw.trim().to_string(),
    })
}
