//! In-Memory Store
//!
//! A mutex-guarded map conforming to the [`Store`] contract. Suitable for
//! tests and single-process use; nothing survives the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::debug;

use super::{Store, StoreError};
use crate::workflow::ExecutionRecord;

/// Stores a private copy of every saved record.
///
/// All keys share one critical section, so reads and writes are
/// linearizable per record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ExecutionRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of every saved run, sorted.
    pub fn run_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.lock()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Number of saved runs.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ExecutionRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("state lock poisoned: {}", e)))
    }
}

impl Store for MemoryStore {
    fn save_state(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        records.insert(record.id().to_string(), record.clone());

        debug!("Saved state for run {}", record.id());
        Ok(())
    }

    fn restore_state(&self, id: &str) -> Result<ExecutionRecord, StoreError> {
        let records = self.lock()?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{to_document, Document, StepStatus};
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn record(id: &str) -> ExecutionRecord {
        ExecutionRecord::new(id, to_document(json!({"a": 1})), vec!["echo".to_string()])
    }

    #[test]
    fn test_save_and_restore() {
        let store = MemoryStore::new();
        let record = record("r1");
        store.save_state(&record).unwrap();

        let restored = store.restore_state("r1").unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_restore_unknown() {
        let store = MemoryStore::new();
        assert_eq!(
            store.restore_state("missing"),
            Err(StoreError::NotFound("missing".to_string()))
        );
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_save_overwrites() {
        let store = MemoryStore::new();
        let mut record = record("r1");
        store.save_state(&record).unwrap();

        record.begin_step(0).unwrap();
        store.save_state(&record).unwrap();

        let restored = store.restore_state("r1").unwrap();
        assert_eq!(restored.action_states()[0].status, StepStatus::Started);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_unsaved_mutations_not_visible() {
        let store = MemoryStore::new();
        let mut record = record("r1");
        store.save_state(&record).unwrap();

        record.begin_step(0).unwrap();
        record.succeed_step(0, Document::new()).unwrap();

        let restored = store.restore_state("r1").unwrap();
        assert_eq!(restored.action_states()[0].status, StepStatus::NotExecuted);
    }

    #[test]
    fn test_run_ids_sorted() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store.save_state(&record(id)).unwrap();
        }
        assert_eq!(store.run_ids().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_concurrent_saves_distinct_ids() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.save_state(&record(&format!("run-{}", i))).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 8);
        for i in 0..8 {
            let id = format!("run-{}", i);
            assert_eq!(store.restore_state(&id).unwrap().id(), id);
        }
    }
}
