// In-memory submission store
// Used for dry runs and tests; keeps a journal of every write in order

use super::{StoreError, SubmissionRecord, SubmissionStore};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Non-durable `SubmissionStore` with optional failure injection
pub struct MemorySubmissionStore {
    records: Mutex<HashMap<String, SubmissionRecord>>,
    journal: Mutex<Vec<SubmissionRecord>>,
    /// Writes allowed before every further write fails
    fail_after: Option<usize>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
            fail_after: None,
        }
    }

    /// A store whose every write fails
    pub fn failing() -> Self {
        Self::new().with_fail_after(0)
    }

    /// Accept `writes` writes, then fail
    pub fn with_fail_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }

    /// Every successful write, in order
    pub fn journal(&self) -> Vec<SubmissionRecord> {
        self.journal.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for MemorySubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn persist(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let mut journal = self.journal.lock();
        if let Some(limit) = self.fail_after {
            if journal.len() >= limit {
                return Err(StoreError::DatabaseError(
                    "injected write failure".to_string(),
                ));
            }
        }

        self.records
            .lock()
            .insert(record.transaction_id().to_string(), record.clone());
        journal.push(record.clone());
        Ok(())
    }

    fn get(&self, transaction_id: &str) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(self.records.lock().get(transaction_id).cloned())
    }

    fn list_by_source(&self, source: &str) -> Result<Vec<SubmissionRecord>, StoreError> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .values()
            .filter(|r| r.source() == source)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.submitted_at());
        Ok(records)
    }
}
