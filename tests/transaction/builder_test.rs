// Builder Tests
// Tests for composing transactions from mutators

use ledger_gateway::identity::{Address, Keypair, Signer};
use ledger_gateway::transaction::{
    build_envelope, build_unsigned, compose, Asset, ComposeError, Memo, Mutator, Network,
    Operation, OperationError, TransactionCodec, DEFAULT_BASE_FEE, TEST_NETWORK_PASSPHRASE,
};
use stellar_xdr::curr::{self as xdr, TransactionEnvelope};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn address() -> Address {
    Keypair::random().address()
}

fn payment(amount: i64) -> Operation {
    Operation::payment(address(), Asset::Native, amount)
}

fn base_mutators(source: Address, sequence: u64) -> Vec<Mutator> {
    vec![
        Mutator::SourceAccount(source),
        Mutator::Sequence(sequence),
        Mutator::Network(Network::testnet()),
    ]
}

// ============================================================================
// COMPOSITION
// ============================================================================

#[test]
fn test_compose_single_payment() {
    let source = address();
    let mut mutators = base_mutators(source, 42);
    mutators.push(payment(10).into());

    let unsigned = compose(mutators).unwrap();
    let tx = unsigned.transaction();

    assert_eq!(unsigned.source(), source);
    assert_eq!(unsigned.sequence(), 42);
    assert_eq!(tx.fee, DEFAULT_BASE_FEE);
    assert_eq!(tx.operations.len(), 1);
    assert_eq!(tx.memo, xdr::Memo::None);
    assert_eq!(tx.cond, xdr::Preconditions::None);
}

/// Test: Fee is the base fee times the number of operations
#[test]
fn test_fee_scales_with_operations() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(Mutator::BaseFee(250));
    mutators.push(payment(1).into());
    mutators.push(payment(2).into());
    mutators.push(payment(3).into());

    let unsigned = compose(mutators).unwrap();

    assert_eq!(unsigned.transaction().fee, 750);
}

/// Test: Operations keep the order their mutators were given in
#[test]
fn test_operation_order_preserved() {
    let first = address();
    let second = address();
    let mut mutators = base_mutators(address(), 1);
    mutators.push(Operation::payment(first, Asset::Native, 1).into());
    mutators.push(Operation::payment(second, Asset::Native, 2).into());

    let unsigned = compose(mutators).unwrap();
    let destinations: Vec<_> = unsigned
        .transaction()
        .operations
        .iter()
        .map(|op| match &op.body {
            xdr::OperationBody::Payment(p) => Address::from_muxed_account(&p.destination),
            other => panic!("unexpected operation: {:?}", other),
        })
        .collect();

    assert_eq!(destinations, vec![first, second]);
}

/// Test: Single-valued fields can be given in any order
#[test]
fn test_field_order_independent() {
    let source = address();
    let op = payment(5);
    let memo = Memo::Id(9);

    let a = compose(vec![
        Mutator::SourceAccount(source),
        Mutator::Sequence(3),
        Mutator::Network(Network::testnet()),
        Mutator::Memo(memo.clone()),
        Mutator::Operation(op.clone()),
    ])
    .unwrap();
    let b = compose(vec![
        Mutator::Operation(op),
        Mutator::Memo(memo),
        Mutator::Network(Network::testnet()),
        Mutator::Sequence(3),
        Mutator::SourceAccount(source),
    ])
    .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.hash().unwrap(), b.hash().unwrap());
}

#[test]
fn test_text_memo_applied() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(payment(1).into());
    mutators.push(Memo::Text("invoice 17".to_string()).into());

    let unsigned = compose(mutators).unwrap();

    match &unsigned.transaction().memo {
        xdr::Memo::Text(text) => assert_eq!(text.as_slice(), &b"invoice 17"[..]),
        other => panic!("unexpected memo: {:?}", other),
    }
}

// ============================================================================
// CONFLICTS AND MISSING FIELDS
// ============================================================================

#[test]
fn test_duplicate_source_conflicts() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(Mutator::SourceAccount(address()));
    mutators.push(payment(1).into());

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::MutatorConflict("source account"))
    ));
}

#[test]
fn test_duplicate_sequence_conflicts() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(Mutator::Sequence(2));
    mutators.push(payment(1).into());

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::MutatorConflict("sequence"))
    ));
}

#[test]
fn test_duplicate_memo_conflicts() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(payment(1).into());
    mutators.push(Memo::Id(1).into());
    mutators.push(Memo::Id(2).into());

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::MutatorConflict("memo"))
    ));
}

#[test]
fn test_missing_source() {
    let result = compose(vec![
        Mutator::Sequence(1),
        Mutator::Network(Network::testnet()),
        payment(1).into(),
    ]);

    assert!(matches!(
        result,
        Err(ComposeError::IncompleteTransaction("source account"))
    ));
}

#[test]
fn test_missing_network() {
    let result = compose(vec![
        Mutator::SourceAccount(address()),
        Mutator::Sequence(1),
        payment(1).into(),
    ]);

    assert!(matches!(
        result,
        Err(ComposeError::IncompleteTransaction("network"))
    ));
}

#[test]
fn test_no_operations() {
    let result = compose(base_mutators(address(), 1));

    assert!(matches!(
        result,
        Err(ComposeError::IncompleteTransaction("operations"))
    ));
}

#[test]
fn test_too_many_operations() {
    let mut mutators = base_mutators(address(), 1);
    for _ in 0..101 {
        mutators.push(payment(1).into());
    }

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::TooManyOperations(101))
    ));
}

#[test]
fn test_bad_operation() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(payment(0).into());

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::BadOperation(OperationError::InvalidAmount(_)))
    ));
}

#[test]
fn test_sequence_out_of_range() {
    let mut mutators = base_mutators(address(), u64::MAX);
    mutators.push(payment(1).into());

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::SequenceOutOfRange(u64::MAX))
    ));
}

#[test]
fn test_fee_overflow() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(Mutator::BaseFee(u32::MAX));
    mutators.push(payment(1).into());
    mutators.push(payment(1).into());

    assert!(matches!(
        compose(mutators),
        Err(ComposeError::FeeOverflow { .. })
    ));
}

// ============================================================================
// UNSIGNED AND SIGNED FORMS
// ============================================================================

/// Test: Unsigned builds carry sequence 0 for the counterparty to fill in
#[test]
fn test_build_unsigned_sequence_zero() {
    let source = address();
    let tx = build_unsigned(source, TEST_NETWORK_PASSPHRASE, payment(7), None).unwrap();

    assert_eq!(tx.seq_num.0, 0);
    assert_eq!(Address::from_muxed_account(&tx.source_account), source);
}

/// Test: Every signer contributes a verifiable signature
#[test]
fn test_build_envelope_multiple_signers() {
    let source = Keypair::random();
    let cosigner = Keypair::random();
    let mut mutators = base_mutators(source.address(), 11);
    mutators.push(payment(100).into());
    let unsigned = compose(mutators).unwrap();

    let envelope_xdr =
        build_envelope(&unsigned, &[source.clone(), cosigner.clone()]).unwrap();
    let hash = unsigned.hash().unwrap();

    match TransactionCodec::decode_envelope(&envelope_xdr).unwrap() {
        TransactionEnvelope::Tx(envelope) => {
            assert_eq!(&envelope.tx, unsigned.transaction());
            assert_eq!(envelope.signatures.len(), 2);
            assert!(Signer::verify(&source.address(), &hash, &envelope.signatures[0]));
            assert!(Signer::verify(&cosigner.address(), &hash, &envelope.signatures[1]));
        }
        other => panic!("unexpected envelope: {:?}", other),
    }
}

#[test]
fn test_build_envelope_no_signers() {
    let mut mutators = base_mutators(address(), 1);
    mutators.push(payment(1).into());
    let unsigned = compose(mutators).unwrap();

    let envelope_xdr = build_envelope(&unsigned, &[]).unwrap();

    match TransactionCodec::decode_envelope(&envelope_xdr).unwrap() {
        TransactionEnvelope::Tx(envelope) => assert!(envelope.signatures.is_empty()),
        other => panic!("unexpected envelope: {:?}", other),
    }
}
