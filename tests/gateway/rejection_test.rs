// Rejection Tests
// Tests for turning ledger result codes into handler errors

use ledger_gateway::gateway::RejectionReason;
use ledger_gateway::horizon::{ResultCodes, SubmitExtras, SubmitTransactionResponse};

fn ops(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

// ============================================================================
// TRANSACTION CODES
// ============================================================================

#[test]
fn test_transaction_codes() {
    let cases = [
        ("tx_bad_seq", RejectionReason::BadSequence),
        ("tx_bad_auth", RejectionReason::BadAuth),
        ("tx_bad_auth_extra", RejectionReason::BadAuth),
        ("tx_insufficient_fee", RejectionReason::InsufficientFee),
        ("tx_insufficient_balance", RejectionReason::InsufficientBalance),
        ("tx_no_source_account", RejectionReason::NoSourceAccount),
    ];

    for (code, expected) in cases {
        assert_eq!(RejectionReason::from_codes(Some(code), &[]), expected, "{}", code);
    }
}

// ============================================================================
// OPERATION CODES
// ============================================================================

#[test]
fn test_operation_codes() {
    let cases = [
        ("op_malformed", RejectionReason::Malformed),
        ("op_underfunded", RejectionReason::Underfunded),
        ("op_src_no_trust", RejectionReason::SourceNoTrust),
        ("op_src_not_authorized", RejectionReason::SourceNotAuthorized),
        ("op_no_destination", RejectionReason::NoDestination),
        ("op_no_trust", RejectionReason::NoTrust),
        ("op_not_authorized", RejectionReason::NotAuthorized),
        ("op_line_full", RejectionReason::LineFull),
        ("op_no_issuer", RejectionReason::NoIssuer),
        ("op_too_few_offers", RejectionReason::TooFewOffers),
        ("op_cross_self", RejectionReason::OfferCrossSelf),
        ("op_over_source_max", RejectionReason::OverSendMax),
    ];

    for (code, expected) in cases {
        assert_eq!(
            RejectionReason::from_codes(Some("tx_failed"), &ops(&[code])),
            expected,
            "{}",
            code
        );
    }
}

/// Test: The first operation that did not succeed decides
#[test]
fn test_first_failing_operation_wins() {
    let reason = RejectionReason::from_codes(
        Some("tx_failed"),
        &ops(&["op_success", "op_no_trust", "op_underfunded"]),
    );

    assert_eq!(reason, RejectionReason::NoTrust);
}

#[test]
fn test_unknown_codes() {
    let reason = RejectionReason::from_codes(Some("tx_too_late"), &ops(&["op_success"]));

    assert_eq!(
        reason,
        RejectionReason::Unknown {
            transaction: Some("tx_too_late".to_string()),
            operation: None,
        }
    );
    assert_eq!(reason.error_response().status, 500);
    assert_eq!(reason.error_response().code, "internal_server_error");
}

#[test]
fn test_no_codes_at_all() {
    assert!(matches!(
        RejectionReason::from_codes(None, &[]),
        RejectionReason::Unknown {
            transaction: None,
            operation: None
        }
    ));
}

// ============================================================================
// RESPONSES
// ============================================================================

#[test]
fn test_from_response() {
    let response = SubmitTransactionResponse::rejected(SubmitExtras {
        envelope_xdr: None,
        result_xdr: Some("AAAA".to_string()),
        result_codes: Some(ResultCodes {
            transaction: Some("tx_failed".to_string()),
            operations: Some(ops(&["op_line_full"])),
        }),
    });

    assert_eq!(RejectionReason::from_response(&response), RejectionReason::LineFull);
}

#[test]
fn test_retryable() {
    assert!(RejectionReason::BadSequence.is_retryable());
    assert!(RejectionReason::InsufficientFee.is_retryable());
    assert!(!RejectionReason::Underfunded.is_retryable());
    assert!(!RejectionReason::BadAuth.is_retryable());
}

#[test]
fn test_error_responses() {
    let underfunded = RejectionReason::Underfunded.error_response();
    assert_eq!(underfunded.code, "payment_underfunded");
    assert_eq!(underfunded.status, 400);

    let no_dest = RejectionReason::NoDestination.error_response();
    assert_eq!(no_dest.code, "payment_no_destination");

    let json = serde_json::to_value(RejectionReason::BadSequence.error_response()).unwrap();
    assert_eq!(json["code"], "bad_sequence");
    assert_eq!(json["status"], 400);
}
