// Codec Tests
// Tests for network-separated hashing and base64 XDR encoding

use ledger_gateway::identity::Keypair;
use ledger_gateway::transaction::{
    compose, compute_hash, Asset, CodecError, Mutator, Network, Operation, TransactionCodec,
    PUBLIC_NETWORK_PASSPHRASE, TEST_NETWORK_PASSPHRASE,
};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{Limits, Transaction, WriteXdr};

fn sample_transaction(sequence: u64) -> Transaction {
    compose(vec![
        Mutator::SourceAccount(Keypair::from_bytes(&[1u8; 32]).unwrap().address()),
        Mutator::Sequence(sequence),
        Mutator::Network(Network::testnet()),
        Mutator::Operation(Operation::payment(
            Keypair::from_bytes(&[2u8; 32]).unwrap().address(),
            Asset::Native,
            10_000_000,
        )),
    ])
    .unwrap()
    .into_inner()
}

// ============================================================================
// HASHING
// ============================================================================

#[test]
fn test_hash_deterministic() {
    let tx = sample_transaction(5);

    let a = compute_hash(&tx, TEST_NETWORK_PASSPHRASE).unwrap();
    let b = compute_hash(&tx, TEST_NETWORK_PASSPHRASE).unwrap();

    assert_eq!(a, b);
}

/// Test: The same body hashes differently on different networks
#[test]
fn test_hash_network_separated() {
    let tx = sample_transaction(5);

    let test = compute_hash(&tx, TEST_NETWORK_PASSPHRASE).unwrap();
    let public = compute_hash(&tx, PUBLIC_NETWORK_PASSPHRASE).unwrap();

    assert_ne!(test, public);
}

#[test]
fn test_hash_changes_with_body() {
    let a = compute_hash(&sample_transaction(5), TEST_NETWORK_PASSPHRASE).unwrap();
    let b = compute_hash(&sample_transaction(6), TEST_NETWORK_PASSPHRASE).unwrap();

    assert_ne!(a, b);
}

/// Test: Hash matches the signature payload layout computed by hand
#[test]
fn test_hash_matches_manual_preimage() {
    let tx = sample_transaction(77);

    let network_id: [u8; 32] = Sha256::digest(TEST_NETWORK_PASSPHRASE.as_bytes()).into();
    let mut preimage = network_id.to_vec();
    // ENVELOPE_TYPE_TX = 2
    preimage.extend_from_slice(&[0, 0, 0, 2]);
    preimage.extend_from_slice(&tx.to_xdr(Limits::none()).unwrap());
    let expected: [u8; 32] = Sha256::digest(&preimage).into();

    assert_eq!(compute_hash(&tx, TEST_NETWORK_PASSPHRASE).unwrap(), expected);
}

#[test]
fn test_network_id() {
    let expected: [u8; 32] = Sha256::digest(PUBLIC_NETWORK_PASSPHRASE.as_bytes()).into();

    assert_eq!(Network::public().id(), expected);
    assert_eq!(Network::public().passphrase(), PUBLIC_NETWORK_PASSPHRASE);
    assert_ne!(Network::public().id(), Network::testnet().id());
}

// ============================================================================
// ENCODING
// ============================================================================

#[test]
fn test_transaction_base64_roundtrip() {
    let tx = sample_transaction(9);

    let encoded = TransactionCodec::encode_transaction(&tx).unwrap();
    let decoded = TransactionCodec::decode_transaction(&encoded).unwrap();

    assert_eq!(decoded, tx);
}

#[test]
fn test_decode_invalid_base64() {
    assert!(matches!(
        TransactionCodec::decode_envelope("not base64!!"),
        Err(CodecError::InvalidBase64(_))
    ));
}

#[test]
fn test_decode_truncated_xdr() {
    // Valid base64, but only a fragment of an envelope
    assert!(matches!(
        TransactionCodec::decode_envelope("AAAAAg=="),
        Err(CodecError::DecodeError(_))
    ));
}

#[test]
fn test_too_many_signatures() {
    let tx = sample_transaction(1);
    let keypair = Keypair::random();
    let hash = compute_hash(&tx, TEST_NETWORK_PASSPHRASE).unwrap();
    let signatures = (0..21)
        .map(|_| ledger_gateway::identity::Signer::sign_decorated(&keypair, &hash).unwrap())
        .collect();

    assert!(matches!(
        TransactionCodec::encode_envelope(tx, signatures),
        Err(CodecError::TooManySignatures(21))
    ));
}
