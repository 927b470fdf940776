// Transaction module - composing, hashing and encoding ledger transactions

mod builder;
mod codec;
mod model;
mod network;

pub use builder::*;
pub use codec::*;
pub use model::*;
pub use network::*;
