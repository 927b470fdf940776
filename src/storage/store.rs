// SubmissionStore - durable history of every submission attempt
//
// Records are keyed by transaction hash; persisting a record with an
// existing hash replaces it.

use super::SubmissionRecord;
use std::path::Path;
use thiserror::Error;

/// Key prefixes for organizing data
mod keys {
    pub const SENT_TRANSACTION_PREFIX: &[u8] = b"sent_tx:";
}

/// Errors from storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Record store for submission attempts
///
/// Methods are synchronous and run on async worker threads, including inside
/// spawned submission tasks. Implementations must return quickly: a local
/// write like a sled insert is fine, a network round trip is not.
pub trait SubmissionStore: Send + Sync {
    /// Insert or replace the record with the same transaction id
    fn persist(&self, record: &SubmissionRecord) -> Result<(), StoreError>;

    /// Look a record up by hex transaction hash
    fn get(&self, transaction_id: &str) -> Result<Option<SubmissionRecord>, StoreError>;

    /// All records sent from an address, oldest first
    fn list_by_source(&self, source: &str) -> Result<Vec<SubmissionRecord>, StoreError>;
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of records in the database
    pub record_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent submission store using sled
///
/// Each record is a single key, so a write is atomic and readers never
/// observe a partial record.
pub struct SledSubmissionStore {
    db: sled::Db,
}

impl SledSubmissionStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> StorageStats {
        StorageStats {
            record_count: self.db.scan_prefix(keys::SENT_TRANSACTION_PREFIX).count(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        }
    }

    fn key(transaction_id: &str) -> Vec<u8> {
        [keys::SENT_TRANSACTION_PREFIX, transaction_id.as_bytes()].concat()
    }
}

impl SubmissionStore for SledSubmissionStore {
    fn persist(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let bytes = record
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.db.insert(Self::key(record.transaction_id()), bytes)?;
        Ok(())
    }

    fn get(&self, transaction_id: &str) -> Result<Option<SubmissionRecord>, StoreError> {
        match self.db.get(Self::key(transaction_id))? {
            Some(bytes) => SubmissionRecord::from_bytes(&bytes)
                .map(Some)
                .map_err(|e| StoreError::DeserializationFailed(e.to_string())),
            None => Ok(None),
        }
    }

    fn list_by_source(&self, source: &str) -> Result<Vec<SubmissionRecord>, StoreError> {
        let mut records = Vec::new();
        for result in self.db.scan_prefix(keys::SENT_TRANSACTION_PREFIX) {
            let (_, value) = result?;
            let record = SubmissionRecord::from_bytes(&value)
                .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
            if record.source() == source {
                records.push(record);
            }
        }
        records.sort_by_key(|r| r.submitted_at());
        Ok(records)
    }
}
