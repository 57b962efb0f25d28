//! Execution Context
//!
//! Carries cooperative cancellation and step identity into every action
//! invocation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Context handed to every action.
///
/// Cloning is cheap; clones share the cancellation flag. The engine never
/// checks the flag itself, it only passes it through so long-running
/// actions can stop early.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    run_id: Option<String>,
    step: Option<usize>,
    action_id: Option<String>,
}

/// Signals cancellation to every context cloned from the same root.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// A context that is never cancelled unless a handle is created for it.
    pub fn background() -> Self {
        Self::default()
    }

    /// Creates a context together with the handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let ctx = Self::background();
        let handle = CancelHandle {
            cancelled: Arc::clone(&ctx.cancelled),
        };
        (ctx, handle)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Id of the run the current action belongs to.
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Index of the step being executed.
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// Identifier the current action was registered under.
    pub fn action_id(&self) -> Option<&str> {
        self.action_id.as_deref()
    }

    /// Derives the context for one step, sharing the cancellation flag.
    pub(crate) fn for_step(&self, run_id: &str, step: usize, action_id: &str) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            run_id: Some(run_id.to_string()),
            step: Some(step),
            action_id: Some(action_id.to_string()),
        }
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_not_cancelled() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.run_id().is_none());
        assert!(ctx.step().is_none());
    }

    #[test]
    fn test_cancel_reaches_step_context() {
        let (ctx, handle) = Context::with_cancel();
        let step_ctx = ctx.for_step("run-1", 2, "print");

        handle.cancel();

        assert!(ctx.is_cancelled());
        assert!(step_ctx.is_cancelled());
    }

    #[test]
    fn test_step_identity() {
        let ctx = Context::background().for_step("run-1", 2, "print");
        assert_eq!(ctx.run_id(), Some("run-1"));
        assert_eq!(ctx.step(), Some(2));
        assert_eq!(ctx.action_id(), Some("print"));
    }
}
