// Ledger gateway - submits signed payment transactions to the Stellar network
//
// Keeps one cached account per signing seed, hands out sequence numbers
// under a per-account lock, records every attempt before it leaves the
// process, and resyncs the sequence after a bad-sequence rejection.

pub mod config;
pub mod gateway;
pub mod horizon;
pub mod identity;
pub mod logging;
pub mod storage;
pub mod transaction;

pub use config::{ConfigError, GatewayConfig};
pub use gateway::{
    AccountCache, SubmissionOutcome, SubmissionResult, SubmitError, TransactionSubmitter,
};
pub use horizon::{HorizonClient, LedgerClient};
pub use identity::{Address, Keypair};
pub use storage::{SledSubmissionStore, SubmissionStore};
