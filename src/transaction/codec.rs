use crate::transaction::Network;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    DecoratedSignature, EnvelopeType, Limits, ReadXdr, Transaction, TransactionEnvelope,
    TransactionV1Envelope, VecM, WriteXdr,
};
use thiserror::Error;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode XDR: {0}")]
    EncodeError(String),

    #[error("Failed to decode XDR: {0}")]
    DecodeError(String),

    #[error("Invalid base64 string: {0}")]
    InvalidBase64(String),

    #[error("Too many signatures: {0}, at most 20 allowed")]
    TooManySignatures(usize),
}

/// Hash a transaction for signing on the given network
///
/// `SHA-256( SHA-256(passphrase) || XDR(ENVELOPE_TYPE_TX) || XDR(tx) )`
pub fn compute_hash(tx: &Transaction, network_passphrase: &str) -> Result<[u8; 32], CodecError> {
    let network_id = Network::new(network_passphrase).id();

    let envelope_type = EnvelopeType::Tx
        .to_xdr(Limits::none())
        .map_err(|e| CodecError::EncodeError(e.to_string()))?;
    let body = tx
        .to_xdr(Limits::none())
        .map_err(|e| CodecError::EncodeError(e.to_string()))?;

    let mut preimage = Vec::with_capacity(network_id.len() + envelope_type.len() + body.len());
    preimage.extend_from_slice(&network_id);
    preimage.extend_from_slice(&envelope_type);
    preimage.extend_from_slice(&body);

    Ok(Sha256::digest(&preimage).into())
}

/// Codec for the base64 XDR forms exchanged with the network
pub struct TransactionCodec;

impl TransactionCodec {
    /// Wrap a transaction and its signatures in a v1 envelope, base64 encoded
    pub fn encode_envelope(
        tx: Transaction,
        signatures: Vec<DecoratedSignature>,
    ) -> Result<String, CodecError> {
        let count = signatures.len();
        let signatures: VecM<DecoratedSignature, 20> = signatures
            .try_into()
            .map_err(|_| CodecError::TooManySignatures(count))?;

        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope { tx, signatures });
        let bytes = envelope
            .to_xdr(Limits::none())
            .map_err(|e| CodecError::EncodeError(e.to_string()))?;

        Ok(BASE64.encode(bytes))
    }

    /// Decode a base64 transaction envelope
    pub fn decode_envelope(b64: &str) -> Result<TransactionEnvelope, CodecError> {
        let bytes = BASE64
            .decode(b64)
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        TransactionEnvelope::from_xdr(bytes, Limits::none())
            .map_err(|e| CodecError::DecodeError(e.to_string()))
    }

    /// Encode a bare transaction body as base64 XDR
    pub fn encode_transaction(tx: &Transaction) -> Result<String, CodecError> {
        let bytes = tx
            .to_xdr(Limits::none())
            .map_err(|e| CodecError::EncodeError(e.to_string()))?;
        Ok(BASE64.encode(bytes))
    }

    /// Decode a base64 transaction body
    pub fn decode_transaction(b64: &str) -> Result<Transaction, CodecError> {
        let bytes = BASE64
            .decode(b64)
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        Transaction::from_xdr(bytes, Limits::none())
            .map_err(|e| CodecError::DecodeError(e.to_string()))
    }
}
