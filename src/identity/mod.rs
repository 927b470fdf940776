// Identity module - Stellar keypairs, addresses and transaction signatures

mod address;
mod keypair;
mod signer;

pub use address::*;
pub use keypair::*;
pub use signer::*;
