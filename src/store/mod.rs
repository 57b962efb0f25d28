//! Record Persistence
//!
//! Defines the [`Store`] contract the engine checkpoints through, and the
//! in-memory implementation used by tests and the CLI.
//!
//! # Contract
//!
//! - [`Store::save_state`] persists or overwrites a record under its id.
//!   Saves to different ids may run concurrently; saves to the same id are
//!   serialized and the last write wins. A partially written record is
//!   never observable.
//! - [`Store::restore_state`] returns the most recently saved record, or
//!   [`StoreError::NotFound`] if the id was never saved.
//!
//! A durable backend (database, log) must offer the same two operations
//! with linearizable single-record reads and writes.

pub mod memory;

use thiserror::Error;

use crate::workflow::ExecutionRecord;

pub use memory::MemoryStore;

/// Errors surfaced by a [`Store`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("run not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Thread-safe persistence for execution records, keyed by record id.
pub trait Store: Send + Sync {
    /// Persists `record` under its id, replacing any previous version.
    fn save_state(&self, record: &ExecutionRecord) -> Result<(), StoreError>;

    /// Returns the last saved version of the record with the given id.
    fn restore_state(&self, id: &str) -> Result<ExecutionRecord, StoreError>;
}
