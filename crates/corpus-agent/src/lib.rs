//! Bounded perceive-retrieve-plan-act loop over the document corpus.
//!
//! The loop ([`AgentLoop`]) drives four caller-supplied collaborators:
//! a [`Perceiver`] that structures the working input, a [`MemoryManager`]
//! holding prior tool outputs, a [`Planner`] that emits one plan line per
//! iteration, and a [`ToolSession`] that executes tool calls. Plans follow
//! a two-form grammar ([`Plan::parse`]): a terminal answer or a single
//! tool call. Terminal answers get their document references resolved
//! against the chunk store ([`provenance`]).

pub mod error;
pub mod memory;
pub mod perception;
pub mod plan;
pub mod provenance;
pub mod runner;
pub mod tools;

pub use error::{AgentError, PlanError, ToolError};
pub use memory::{MemoryItem, MemoryManager, SessionMemory, TOOL_OUTPUT_TYPE};
pub use perception::{Perceiver, Perception};
pub use plan::{Plan, Planner, FINAL_ANSWER_PREFIX, FUNCTION_CALL_PREFIX};
pub use provenance::{extract_refs, resolve, AnswerRefs, Provenance};
pub use runner::{AbortReason, AgentConfig, AgentHandle, AgentLoop, AgentOutcome};
pub use tools::{catalog_summary, execute_tool, ToolDescriptor, ToolResult, ToolSession};
