// Horizon module - the remote ledger's HTTP API
// Loads account sequence numbers and submits signed envelopes

mod client;
mod mock;
mod types;

pub use client::*;
pub use mock::*;
pub use types::*;
