// Gateway module - Transaction submission engine
// Caches accounts and their sequence numbers, submits signed transactions
// to the ledger and interprets the result

mod accounts;
mod rejection;
mod submitter;

pub use accounts::*;
pub use rejection::*;
pub use submitter::*;
