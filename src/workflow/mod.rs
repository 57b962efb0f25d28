//! Run Definition Module
//!
//! Provides the data model of a run and its persistent execution record.
//!
//! # Structure
//!
//! - [`model`]: Schema-less documents and step input derivation
//! - [`state`]: Execution record and per-step state machine
//! - [`parser`]: Run file loading for the command-line runner

pub mod model;
pub mod parser;
pub mod state;

pub use model::{derive_step_input, to_document, Document};
pub use parser::{load_run_file, parse_run_file, RunFile, RunFileError};
pub use state::{ActionState, ExecutionRecord, StateError, StepStatus};
