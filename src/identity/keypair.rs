use crate::identity::Address;
use ed25519_dalek::{Signature, Signer as DalekSigner, SigningKey, Verifier};
use rand::rngs::OsRng;
use std::fmt;
use stellar_strkey::ed25519::PrivateKey as StrkeySeed;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeypairError {
    #[error("Invalid secret seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Ed25519 signing identity derived from a Stellar secret seed (`S...`)
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn random() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Parse a StrKey-encoded secret seed
    pub fn from_seed(seed: &str) -> Result<Self, KeypairError> {
        let decoded = StrkeySeed::from_string(seed)
            .map_err(|e| KeypairError::InvalidSeed(e.to_string()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&decoded.0),
        })
    }

    /// Build a keypair from the raw 32 seed bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        let bytes_array: [u8; 32] = bytes.try_into().map_err(|_| KeypairError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        })?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&bytes_array),
        })
    }

    /// StrKey-encoded secret seed
    pub fn seed(&self) -> String {
        StrkeySeed(self.signing_key.to_bytes()).to_string()
    }

    /// Public address of this keypair
    pub fn address(&self) -> Address {
        Address::from_bytes(self.public_key_bytes())
    }

    /// Raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign an arbitrary message
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Verify a signature produced by this keypair
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing_key
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }
}

// Never print the seed.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address().to_string())
            .finish()
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for Keypair {}
