//! Run Execution Module
//!
//! Provides the engine that drives runs step by step, checkpointing
//! through a [`Store`](crate::store::Store) and resuming interrupted runs.
//!
//! # Architecture
//!
//! - [`manager`]: The [`Manager`] orchestrating runs
//! - [`step`]: Single step invocation
//! - [`action`]: The [`Action`] contract and [`ActionRegistry`]
//! - [`context`]: Per-step [`Context`] with cooperative cancellation
//! - [`builtin`]: Demo actions used by the command-line runner

pub mod action;
pub mod builtin;
pub mod context;
pub mod error;
pub mod manager;
pub mod step;

pub use action::{Action, ActionError, ActionRegistry, ActionRegistryBuilder, ActionResult};
pub use context::{CancelHandle, Context};
pub use error::{EngineError, ErrorKind};
pub use manager::Manager;
