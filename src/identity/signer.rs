use crate::identity::{Address, Keypair};
use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use stellar_xdr::curr::{DecoratedSignature, Signature, SignatureHint};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Invalid signature length: expected 64, got {0}")]
    InvalidLength(usize),

    #[error("Invalid signature bytes: {0}")]
    InvalidBytes(String),
}

/// Produces and checks decorated signatures over transaction hashes
pub struct Signer;

impl Signer {
    /// Sign a transaction hash, attaching the signer's key hint
    pub fn sign_decorated(
        keypair: &Keypair,
        hash: &[u8; 32],
    ) -> Result<DecoratedSignature, SignatureError> {
        let signature = keypair.sign(hash).to_bytes();
        let signature: Signature = Signature(
            signature
                .to_vec()
                .try_into()
                .map_err(|_| SignatureError::InvalidLength(signature.len()))?,
        );

        Ok(DecoratedSignature {
            hint: SignatureHint(keypair.address().hint()),
            signature,
        })
    }

    /// Verify a decorated signature against an address and transaction hash
    pub fn verify(address: &Address, hash: &[u8; 32], decorated: &DecoratedSignature) -> bool {
        if decorated.hint.0 != address.hint() {
            return false;
        }

        let Ok(verifying_key) = VerifyingKey::from_bytes(address.as_bytes()) else {
            return false;
        };

        let bytes: &[u8] = decorated.signature.0.as_slice();
        let Ok(bytes) = <[u8; 64]>::try_from(bytes) else {
            return false;
        };

        verifying_key
            .verify(hash, &DalekSignature::from_bytes(&bytes))
            .is_ok()
    }
}
