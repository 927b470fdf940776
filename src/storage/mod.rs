// Storage module - PERSISTENCE
// Durable audit trail of submitted transactions

mod memory;
mod record;
mod store;

pub use memory::MemorySubmissionStore;
pub use record::{SubmissionRecord, SubmissionStatus};
pub use store::{SledSubmissionStore, StorageStats, StoreError, SubmissionStore};
