//! The bounded agent loop.
//!
//! `START -> PERCEIVE -> RETRIEVE -> PLAN -> {TERMINATE | ACT} -> loop`.
//! The loop runs at most `max_steps` iterations and always ends in exactly
//! one outcome: `Final`, `Aborted`, or `StepsExhausted`. Collaborators are
//! trait objects supplied by the caller; the loop owns the step counter
//! and the working input, nothing else.

use std::sync::Arc;

use corpus_types::RunContext;
use corpus_vector::ChunkStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::memory::{MemoryItem, MemoryManager};
use crate::perception::Perceiver;
use crate::plan::{Plan, Planner};
use crate::provenance::{resolve, Provenance};
use crate::tools::{catalog_summary, execute_tool, ToolSession};

/// Loop bounds.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum loop iterations
    pub max_steps: usize,
    /// Memory items retrieved per iteration
    pub top_k: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 3,
            top_k: 3,
        }
    }
}

impl AgentConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Why a loop ended without a final answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Perception(String),
    Planning(String),
    MalformedPlan(String),
    Tool(String),
    Cancelled,
}

/// How a loop invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    /// Terminal plan reached; provenance resolved best-effort
    Final {
        answer: String,
        provenance: Vec<Provenance>,
    },
    /// Ended early; the reason says at which boundary
    Aborted { reason: AbortReason },
    /// Ran the full budget without a terminal plan
    StepsExhausted { steps: usize },
}

/// The agent loop over caller-supplied collaborators.
pub struct AgentLoop<P, L, M, T> {
    perceiver: P,
    planner: L,
    memory: M,
    tools: T,
    store: Option<Arc<ChunkStore>>,
    config: AgentConfig,
}

impl<P, L, M, T> AgentLoop<P, L, M, T>
where
    P: Perceiver,
    L: Planner,
    M: MemoryManager,
    T: ToolSession,
{
    pub fn new(perceiver: P, planner: L, memory: M, tools: T) -> Self {
        Self {
            perceiver,
            planner,
            memory,
            tools,
            store: None,
            config: AgentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a chunk store for resolving answer provenance.
    pub fn with_store(mut self, store: Arc<ChunkStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run the loop to completion for one query.
    pub async fn run(&self, query: &str, ctx: &RunContext) -> AgentOutcome {
        info!(run_id = %ctx.run_id(), session = %ctx.session_id(), "Starting agent loop");

        let catalog = match self.tools.list_tools().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Failed to fetch tool catalog");
                return AgentOutcome::Aborted {
                    reason: AbortReason::Tool(e.to_string()),
                };
            }
        };
        let summary = catalog_summary(&catalog);
        debug!(tools = catalog.len(), "Tool catalog ready");

        let mut working = query.to_string();

        for step in 1..=self.config.max_steps {
            if ctx.is_cancelled() {
                info!(step, "Agent loop cancelled");
                return AgentOutcome::Aborted {
                    reason: AbortReason::Cancelled,
                };
            }

            let perception = match self.perceiver.extract(&working).await {
                Ok(perception) => perception,
                Err(e) => {
                    warn!(step, error = %e, "Perception failed");
                    return AgentOutcome::Aborted {
                        reason: AbortReason::Perception(e.to_string()),
                    };
                }
            };
            debug!(step, intent = %perception.intent, "Perceived intent");

            let memories = match self
                .memory
                .retrieve(&working, self.config.top_k, ctx.session_id())
                .await
            {
                Ok(memories) => memories,
                Err(e) => {
                    warn!(step, error = %e, "Memory retrieval degraded to empty");
                    Vec::new()
                }
            };

            let raw = match self.planner.plan(&perception, &memories, &summary).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(step, error = %e, "Planning failed");
                    return AgentOutcome::Aborted {
                        reason: AbortReason::Planning(e.to_string()),
                    };
                }
            };

            let plan = match Plan::parse(&raw) {
                Ok(plan) => plan,
                Err(e) => {
                    warn!(step, error = %e, "Planner output did not parse");
                    return AgentOutcome::Aborted {
                        reason: AbortReason::MalformedPlan(e.to_string()),
                    };
                }
            };

            match plan {
                Plan::Terminal { answer, refs } => {
                    let provenance = self
                        .store
                        .as_deref()
                        .map(|store| resolve(&refs, store))
                        .unwrap_or_default();
                    info!(step, sources = provenance.len(), "Terminal answer reached");
                    return AgentOutcome::Final { answer, provenance };
                }
                Plan::ToolCall { name, args } => {
                    match execute_tool(&self.tools, &catalog, &name, &args).await {
                        Ok(result) => {
                            info!(step, tool = %result.tool_name, "Tool call succeeded");

                            let item = MemoryItem::tool_output(
                                format!(
                                    "Tool call: {} with {}, got: {}",
                                    result.tool_name, result.arguments, result.result
                                ),
                                result.tool_name.clone(),
                                query,
                                ctx.session_id(),
                            );
                            if let Err(e) = self.memory.add(item).await {
                                warn!(step, error = %e, "Failed to store memory item");
                            }

                            working = format!(
                                "Original task: {query}\nPrevious output: {}\nWhat should I do next?",
                                result.result
                            );
                        }
                        Err(e) => {
                            warn!(step, tool = %name, error = %e, "Tool call failed, ending loop");
                            return AgentOutcome::Aborted {
                                reason: AbortReason::Tool(e.to_string()),
                            };
                        }
                    }
                }
            }
        }

        info!(steps = self.config.max_steps, "Step budget exhausted");
        AgentOutcome::StepsExhausted {
            steps: self.config.max_steps,
        }
    }
}

impl<P, L, M, T> AgentLoop<P, L, M, T>
where
    P: Perceiver + 'static,
    L: Planner + 'static,
    M: MemoryManager + 'static,
    T: ToolSession + 'static,
{
    /// Run the loop on its own task. The returned handle cancels through
    /// the context's token and joins for the outcome.
    pub fn spawn(self: &Arc<Self>, query: impl Into<String>, ctx: RunContext) -> AgentHandle {
        let agent = Arc::clone(self);
        let query = query.into();
        let cancel = ctx.cancellation_token();
        let join = tokio::spawn(async move { agent.run(&query, &ctx).await });
        AgentHandle { cancel, join }
    }
}

/// Handle on a spawned agent loop.
pub struct AgentHandle {
    cancel: CancellationToken,
    join: JoinHandle<AgentOutcome>,
}

impl AgentHandle {
    /// Request cooperative cancellation; observed at the next iteration
    /// top.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the loop to finish.
    pub async fn join(self) -> AgentOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => AgentOutcome::Aborted {
                reason: AbortReason::Cancelled,
            },
        }
    }
}
