// Signer Tests
// Tests for decorated signatures over transaction hashes

use ledger_gateway::identity::{Keypair, Signer};

fn sample_hash() -> [u8; 32] {
    let mut hash = [0u8; 32];
    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = i as u8;
    }
    hash
}

/// Test: Signature carries the signer's hint and verifies
#[test]
fn test_sign_decorated_verifies() {
    let keypair = Keypair::random();
    let hash = sample_hash();

    let signature = Signer::sign_decorated(&keypair, &hash).unwrap();

    assert_eq!(signature.hint.0, keypair.address().hint());
    assert_eq!(signature.signature.0.len(), 64);
    assert!(Signer::verify(&keypair.address(), &hash, &signature));
}

/// Test: Signing is deterministic for Ed25519
#[test]
fn test_sign_decorated_deterministic() {
    let keypair = Keypair::random();
    let hash = sample_hash();

    let a = Signer::sign_decorated(&keypair, &hash).unwrap();
    let b = Signer::sign_decorated(&keypair, &hash).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_verify_wrong_address() {
    let keypair = Keypair::random();
    let other = Keypair::random();
    let hash = sample_hash();

    let signature = Signer::sign_decorated(&keypair, &hash).unwrap();

    assert!(!Signer::verify(&other.address(), &hash, &signature));
}

#[test]
fn test_verify_tampered_hash() {
    let keypair = Keypair::random();
    let hash = sample_hash();
    let signature = Signer::sign_decorated(&keypair, &hash).unwrap();

    let mut tampered = hash;
    tampered[0] ^= 0xff;

    assert!(!Signer::verify(&keypair.address(), &tampered, &signature));
}

/// Test: A valid signature with the wrong hint is rejected
#[test]
fn test_verify_wrong_hint() {
    let keypair = Keypair::random();
    let hash = sample_hash();
    let mut signature = Signer::sign_decorated(&keypair, &hash).unwrap();

    signature.hint.0[0] ^= 0xff;

    assert!(!Signer::verify(&keypair.address(), &hash, &signature));
}
