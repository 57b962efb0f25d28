//! Execution Record
//!
//! The durable state of a single run: the original event, the ordered
//! action identifiers and one [`ActionState`] per step.
//!
//! A record is created once per run and checkpointed after every status
//! change, enabling resume from the first step that has not succeeded.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{derive_step_input, Document};

/// Status of one step within one run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step has never been attempted
    #[default]
    NotExecuted,
    /// Step was handed to its action; outcome unknown until the next checkpoint
    Started,
    /// Step finished successfully; its output is authoritative
    Succeeded,
    /// Step returned an error; waits for an explicit resume
    Failed,
}

impl StepStatus {
    /// Returns true if moving from `self` to `next` is a legal transition.
    ///
    /// `Started -> Started` and `Failed -> Started` are re-attempts made by
    /// the resume driver. `Succeeded` is terminal.
    pub fn can_transition_to(self, next: StepStatus) -> bool {
        use StepStatus::*;

        matches!(
            (self, next),
            (NotExecuted, Started)
                | (Started, Started)
                | (Failed, Started)
                | (Started, Succeeded)
                | (Started, Failed)
        )
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepStatus::NotExecuted => "not executed",
            StepStatus::Started => "started",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors raised by the step state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("step {step}: illegal transition from {from} to {to}")]
    InvalidTransition {
        step: usize,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("step {step} out of range (run has {len} steps)")]
    StepOutOfRange { step: usize, len: usize },

    #[error("record has {actions} actions but {states} step states")]
    StepCountMismatch { actions: usize, states: usize },
}

/// Per-step state of a run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ActionState {
    /// Arguments for this step, derived from the run event at creation
    pub input: Document,

    /// Output of the latest attempt (empty until the step finishes)
    #[serde(default)]
    pub output: Document,

    pub status: StepStatus,

    /// Number of times the step entered `Started`
    #[serde(default)]
    pub attempts: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Error message of the latest failed attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionState {
    /// Creates a not-yet-executed step with the given input.
    pub fn new(input: Document) -> Self {
        Self {
            input,
            output: Document::new(),
            status: StepStatus::NotExecuted,
            attempts: 0,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Duration of the latest finished attempt in milliseconds.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

/// Persistent record of one run.
///
/// Identity, creation time, event and action list are fixed at creation.
/// Step states change only through the transition methods, which enforce
/// the `NotExecuted -> Started -> {Succeeded | Failed}` state machine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExecutionRecord {
    id: String,
    timestamp: DateTime<Utc>,
    event: Document,
    actions: Vec<String>,
    action_states: Vec<ActionState>,
    completed: bool,
    updated_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Creates a fresh record with every step `NotExecuted`.
    pub fn new(id: impl Into<String>, event: Document, actions: Vec<String>) -> Self {
        let action_states = actions
            .iter()
            .enumerate()
            .map(|(index, action_id)| ActionState::new(derive_step_input(&event, index, action_id)))
            .collect();
        let now = Utc::now();

        Self {
            id: id.into(),
            timestamp: now,
            event,
            actions,
            action_states,
            completed: false,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time of the run.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Time of the most recent state change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The original caller-supplied payload.
    pub fn event(&self) -> &Document {
        &self.event
    }

    /// Ordered action identifiers of this run.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn action_states(&self) -> &[ActionState] {
        &self.action_states
    }

    pub fn action_state(&self, step: usize) -> Option<&ActionState> {
        self.action_states.get(step)
    }

    /// Number of steps in the run.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Checks that there is exactly one step state per action.
    ///
    /// Records built with [`ExecutionRecord::new`] always pass; records
    /// deserialized from a backend may not.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.action_states.len() != self.actions.len() {
            return Err(StateError::StepCountMismatch {
                actions: self.actions.len(),
                states: self.action_states.len(),
            });
        }
        Ok(())
    }

    /// Returns true once every step has succeeded and the run was closed.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Index of the last step in the leading run of succeeded steps.
    ///
    /// `None` when step 0 has not succeeded yet.
    pub fn last_completed(&self) -> Option<usize> {
        self.action_states
            .iter()
            .take_while(|state| state.status == StepStatus::Succeeded)
            .count()
            .checked_sub(1)
    }

    /// Index of the first step that has not succeeded.
    pub fn next_pending(&self) -> Option<usize> {
        self.action_states
            .iter()
            .position(|state| state.status != StepStatus::Succeeded)
    }

    /// Returns true if any step has been touched (this record is a resume).
    pub fn is_resume(&self) -> bool {
        self.action_states
            .iter()
            .any(|state| state.status != StepStatus::NotExecuted)
    }

    /// Moves a step to `Started` and counts the attempt.
    pub fn begin_step(&mut self, step: usize) -> Result<(), StateError> {
        let state = self.transition(step, StepStatus::Started)?;
        state.attempts += 1;
        state.started_at = Some(Utc::now());
        state.finished_at = None;
        Ok(())
    }

    /// Records a successful attempt and its output.
    pub fn succeed_step(&mut self, step: usize, output: Document) -> Result<(), StateError> {
        let state = self.transition(step, StepStatus::Succeeded)?;
        state.output = output;
        state.error = None;
        state.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Records a failed attempt with whatever output the action produced.
    pub fn fail_step(
        &mut self,
        step: usize,
        output: Option<Document>,
        message: impl Into<String>,
    ) -> Result<(), StateError> {
        let state = self.transition(step, StepStatus::Failed)?;
        state.output = output.unwrap_or_default();
        state.error = Some(message.into());
        state.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Closes the run if every step succeeded.
    ///
    /// Returns the resulting completion flag.
    pub fn mark_completed(&mut self) -> bool {
        if self.next_pending().is_none() {
            self.completed = true;
            self.updated_at = Utc::now();
        }
        self.completed
    }

    fn transition(&mut self, step: usize, to: StepStatus) -> Result<&mut ActionState, StateError> {
        let len = self.action_states.len();
        let state = self
            .action_states
            .get_mut(step)
            .ok_or(StateError::StepOutOfRange { step, len })?;

        if !state.status.can_transition_to(to) {
            return Err(StateError::InvalidTransition {
                step,
                from: state.status,
                to,
            });
        }

        state.status = to;
        self.updated_at = Utc::now();
        Ok(state)
    }
}
