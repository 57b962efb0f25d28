//! Engine Errors
//!
//! Every error returned by the [`Manager`](super::Manager) names the run it
//! belongs to, so a caller can resume that run later.

use thiserror::Error;

use super::action::ActionError;
use crate::store::StoreError;
use crate::workflow::StateError;

/// Broad classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No record exists for the requested run id
    UnknownRun,
    /// A step references an identifier missing from the registry
    UnknownAction,
    /// The invoked action returned an error
    ActionFailure,
    /// The store could not save or load a record
    StoreFailure,
    /// A step status change violated the state machine
    InvalidState,
}

/// Errors returned by `execute_event` / `restore_event`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown run: {run_id}")]
    UnknownRun { run_id: String },

    #[error("run {run_id}: step {step} references unknown action '{action}'")]
    UnknownAction {
        run_id: String,
        step: usize,
        action: String,
    },

    #[error("run {run_id}: action '{action}' failed at step {step}: {source}")]
    ActionFailed {
        run_id: String,
        step: usize,
        action: String,
        #[source]
        source: ActionError,
    },

    #[error("run {run_id}: {source}")]
    Store {
        run_id: String,
        #[source]
        source: StoreError,
    },

    #[error("run {run_id}: {source}")]
    State {
        run_id: String,
        #[source]
        source: StateError,
    },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UnknownRun { .. } => ErrorKind::UnknownRun,
            EngineError::UnknownAction { .. } => ErrorKind::UnknownAction,
            EngineError::ActionFailed { .. } => ErrorKind::ActionFailure,
            EngineError::Store { .. } => ErrorKind::StoreFailure,
            EngineError::State { .. } => ErrorKind::InvalidState,
        }
    }

    /// Id of the run this error belongs to.
    pub fn run_id(&self) -> &str {
        match self {
            EngineError::UnknownRun { run_id }
            | EngineError::UnknownAction { run_id, .. }
            | EngineError::ActionFailed { run_id, .. }
            | EngineError::Store { run_id, .. }
            | EngineError::State { run_id, .. } => run_id,
        }
    }

    /// Returns true if resuming the same run may succeed without changing
    /// configuration.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ActionFailure | ErrorKind::StoreFailure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_run_id() {
        let err = EngineError::ActionFailed {
            run_id: "r1".to_string(),
            step: 2,
            action: "fail_random".to_string(),
            source: ActionError::new("random fail"),
        };

        assert_eq!(err.kind(), ErrorKind::ActionFailure);
        assert_eq!(err.run_id(), "r1");
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "run r1: action 'fail_random' failed at step 2: random fail"
        );
    }

    #[test]
    fn test_unknown_run_not_retryable() {
        let err = EngineError::UnknownRun {
            run_id: "nope".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnknownRun);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "unknown run: nope");
    }

    #[test]
    fn test_store_error_source() {
        use std::error::Error as _;

        let err = EngineError::Store {
            run_id: "r1".to_string(),
            source: StoreError::Unavailable("disk gone".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        assert!(err.source().is_some());
    }
}
