//! Run Manager
//!
//! The engine that drives runs to completion:
//! - Creates one execution record per run and saves it before any step runs
//! - Executes steps strictly in order on the caller's thread
//! - Checkpoints before and after every step
//! - Resumes an existing run from its first step that has not succeeded

use std::sync::Arc;

use log::{debug, error, info, warn};
use uuid::Uuid;

use super::action::ActionRegistry;
use super::context::Context;
use super::error::EngineError;
use super::step::execute_step;
use crate::store::{Store, StoreError};
use crate::workflow::{Document, ExecutionRecord, StateError, StepStatus};

/// Orchestrates runs against an immutable action registry and a store.
///
/// A `Manager` is `Send + Sync`; independent callers may drive different
/// runs concurrently. Concurrent resumes of the *same* run are not
/// serialized and must be coordinated by the caller.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use durable_runner::execution::{ActionRegistry, ActionResult, Context, Manager};
/// use durable_runner::store::MemoryStore;
/// use durable_runner::workflow::{to_document, Document};
/// use serde_json::json;
///
/// let registry = ActionRegistry::builder()
///     .register("echo", |_: &Context, input: &Document| -> ActionResult {
///         Ok(input.clone())
///     })
///     .build();
/// let manager = Manager::new(registry, Arc::new(MemoryStore::new()));
///
/// let ctx = Context::background();
/// let run_id = manager
///     .execute_event(&ctx, to_document(json!({"a": 1})), &["echo", "echo"])
///     .unwrap();
///
/// assert!(manager.inspect(&run_id).unwrap().is_completed());
/// ```
pub struct Manager {
    actions: Arc<ActionRegistry>,
    store: Arc<dyn Store>,
}

impl Manager {
    /// Creates a manager. The registry is never modified afterwards.
    pub fn new(actions: impl Into<Arc<ActionRegistry>>, store: Arc<dyn Store>) -> Self {
        Self {
            actions: actions.into(),
            store,
        }
    }

    /// Starts a new run of `action_ids` against `input`.
    ///
    /// The record is saved with every step `NotExecuted` before the first
    /// step runs. On failure the returned error still names the run, see
    /// [`EngineError::run_id`], so it can be resumed with
    /// [`restore_event`](Self::restore_event).
    pub fn execute_event<S: AsRef<str>>(
        &self,
        ctx: &Context,
        input: Document,
        action_ids: &[S],
    ) -> Result<String, EngineError> {
        let actions: Vec<String> = action_ids.iter().map(|id| id.as_ref().to_string()).collect();
        let run_id = Uuid::new_v4().to_string();

        info!("Starting run {}: {:?}", run_id, actions);

        let mut record = ExecutionRecord::new(run_id.clone(), input, actions);
        self.checkpoint(&record)?;

        self.execute_actions(ctx, &mut record)?;
        Ok(run_id)
    }

    /// Starts a new run of every registered action, in registration order.
    pub fn execute_all(&self, ctx: &Context, input: Document) -> Result<String, EngineError> {
        let actions = self.actions.identifiers().to_vec();
        self.execute_event(ctx, input, &actions[..])
    }

    /// Resumes a previously started run.
    ///
    /// Succeeded steps are skipped; execution restarts at the first step
    /// that is `NotExecuted`, `Started` or `Failed`. Fails with
    /// `UnknownRun` if the store has no record for `run_id`.
    pub fn restore_event(&self, ctx: &Context, run_id: &str) -> Result<String, EngineError> {
        let mut record = self.load(run_id)?;

        info!(
            "Resuming run {} at step {:?} of {}",
            run_id,
            record.next_pending(),
            record.len()
        );

        self.execute_actions(ctx, &mut record)?;
        Ok(run_id.to_string())
    }

    /// Returns the last checkpoint of a run.
    pub fn inspect(&self, run_id: &str) -> Result<ExecutionRecord, EngineError> {
        self.load(run_id)
    }

    /// Drives `record` from its first non-succeeded step to the end.
    fn execute_actions(&self, ctx: &Context, record: &mut ExecutionRecord) -> Result<(), EngineError> {
        let run_id = record.id().to_string();
        record.validate().map_err(state_error(&run_id))?;

        if record.is_completed() {
            info!("Run {} already completed - nothing to do", run_id);
            return Ok(());
        }

        for step in 0..record.len() {
            let action_id = record.actions()[step].clone();

            match record.action_states()[step].status {
                StepStatus::Succeeded => {
                    debug!("Step {} ({}) already succeeded - skipping", step, action_id);
                    continue;
                }
                StepStatus::Started => {
                    warn!(
                        "Step {} ({}) of run {} was interrupted - re-attempting",
                        step, action_id, run_id
                    );
                }
                StepStatus::Failed => {
                    info!("Retrying failed step {} ({})", step, action_id);
                }
                StepStatus::NotExecuted => {
                    info!("Step {}: action {}", step, action_id);
                }
            }

            record.begin_step(step).map_err(state_error(&run_id))?;
            self.checkpoint(record)?;

            let Some(action) = self.actions.get(&action_id) else {
                error!("Run {}: no action registered as '{}'", run_id, action_id);

                record
                    .fail_step(step, None, format!("unknown action '{}'", action_id))
                    .map_err(state_error(&run_id))?;
                self.checkpoint(record)?;

                return Err(EngineError::UnknownAction {
                    run_id,
                    step,
                    action: action_id,
                });
            };

            let step_ctx = ctx.for_step(&run_id, step, &action_id);
            let result = execute_step(action, &step_ctx, &record.action_states()[step].input);

            match result {
                Ok(output) => {
                    record.succeed_step(step, output).map_err(state_error(&run_id))?;
                    self.checkpoint(record)?;
                    info!("Step {} ({}) completed successfully", step, action_id);
                }
                Err(e) => {
                    record
                        .fail_step(step, e.output().cloned(), e.message())
                        .map_err(state_error(&run_id))?;
                    self.checkpoint(record)?;

                    return Err(EngineError::ActionFailed {
                        run_id,
                        step,
                        action: action_id,
                        source: e,
                    });
                }
            }
        }

        record.mark_completed();
        self.checkpoint(record)?;
        info!("Run {} completed ({} steps)", run_id, record.len());

        Ok(())
    }

    fn checkpoint(&self, record: &ExecutionRecord) -> Result<(), EngineError> {
        self.store.save_state(record).map_err(|source| {
            error!("Failed to checkpoint run {}: {}", record.id(), source);
            EngineError::Store {
                run_id: record.id().to_string(),
                source,
            }
        })
    }

    fn load(&self, run_id: &str) -> Result<ExecutionRecord, EngineError> {
        self.store.restore_state(run_id).map_err(|e| match e {
            StoreError::NotFound(_) => {
                warn!("Unknown run: {}", run_id);
                EngineError::UnknownRun {
                    run_id: run_id.to_string(),
                }
            }
            source => EngineError::Store {
                run_id: run_id.to_string(),
                source,
            },
        })
    }
}

fn state_error(run_id: &str) -> impl FnOnce(StateError) -> EngineError + '_ {
    move |source| EngineError::State {
        run_id: run_id.to_string(),
        source,
    }
}
