//! Per-run context: identifiers plus cooperative cancellation.
//!
//! Passed explicitly to the indexing pipeline and the agent loop so that no
//! component reaches for shared global flags. Clones share the same
//! cancellation token, so cancelling any clone cancels the run.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

/// Identifies one unit of work (a pipeline run or one agent-loop invocation)
/// and carries its cancellation token.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: Ulid,
    session_id: String,
    cancel: CancellationToken,
}

impl RunContext {
    /// Create a context with a fresh run id and a generated session id
    /// (`session-<unix-seconds>`).
    pub fn new() -> Self {
        Self::with_session(format!("session-{}", Utc::now().timestamp()))
    }

    /// Create a context scoped to an existing session id.
    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            run_id: Ulid::new(),
            session_id: session_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn run_id(&self) -> Ulid {
        self.run_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Request cancellation. Workers check this cooperatively at iteration
    /// boundaries; an in-flight external call is not interrupted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token handle for `tokio::select!`-style waiting.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_session_prefix() {
        let ctx = RunContext::new();
        assert!(ctx.session_id().starts_with("session-"));
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunContext::new();
        let b = RunContext::new();
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn test_cancel_is_shared_across_clones() {
        let ctx = RunContext::with_session("session-42");
        let clone = ctx.clone();

        assert!(!clone.is_cancelled());
        ctx.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_explicit_session_id() {
        let ctx = RunContext::with_session("session-1700000000");
        assert_eq!(ctx.session_id(), "session-1700000000");
    }
}
