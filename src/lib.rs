//! Durable Runner - Resumable Step Execution Engine
//!
//! Runs an ordered list of actions against an input document, checkpoints
//! the run after every step, and resumes an interrupted or failed run from
//! its first step that has not succeeded instead of starting over.
//!
//! # Architecture
//!
//! The library is organized into four main modules:
//!
//! - [`workflow`]: Documents, the execution record and its step state machine
//! - [`store`]: The persistence contract and an in-memory implementation
//! - [`execution`]: Actions, the action registry and the run [`Manager`]
//! - [`monitoring`]: Per-run reports
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use durable_runner::execution::{builtin, Context, Manager};
//! use durable_runner::store::MemoryStore;
//! use durable_runner::workflow::to_document;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Manager::new(builtin::demo_registry(), Arc::new(MemoryStore::new()));
//!     let ctx = Context::background();
//!
//!     let input = to_document(json!({"2": {"random": true}}));
//!     let run_id = match manager.execute_event(&ctx, input, &["echo", "add_random", "fail_random"]) {
//!         Ok(run_id) => run_id,
//!         Err(e) => {
//!             // Retry from the failed step; earlier steps are not re-run
//!             let run_id = e.run_id().to_string();
//!             let resumed = (0..100).any(|_| manager.restore_event(&ctx, &run_id).is_ok());
//!             assert!(resumed);
//!             run_id
//!         }
//!     };
//!
//!     assert!(manager.inspect(&run_id)?.is_completed());
//!     Ok(())
//! }
//! ```

pub mod execution;
pub mod monitoring;
pub mod store;
pub mod workflow;

// Re-export commonly used types
pub use execution::{Action, ActionRegistry, Context, EngineError, Manager};
pub use store::{MemoryStore, Store};
pub use workflow::{Document, ExecutionRecord, StepStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "DurableRunner";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "DurableRunner");
    }

    #[test]
    fn test_module_exports_record() {
        let record = ExecutionRecord::new("r1", Document::new(), vec!["echo".to_string()]);
        assert_eq!(record.id(), "r1");
        assert_eq!(record.action_states()[0].status, StepStatus::NotExecuted);
    }

    #[test]
    fn test_module_exports_registry() {
        let registry = ActionRegistry::default();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "Version components should be numeric");
        }
    }
}
