// Rejection interpretation - turns ledger result codes into handler-facing errors

use crate::horizon::SubmitTransactionResponse;
use serde::Serialize;

/// Structured error body handlers return to clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    fn new(code: &str, message: &str, status: u16) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            status,
        }
    }
}

/// Why the network rejected a transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectionReason {
    BadSequence,
    BadAuth,
    InsufficientFee,
    InsufficientBalance,
    NoSourceAccount,
    Malformed,
    Underfunded,
    SourceNoTrust,
    SourceNotAuthorized,
    NoDestination,
    NoTrust,
    NotAuthorized,
    LineFull,
    NoIssuer,
    TooFewOffers,
    OfferCrossSelf,
    OverSendMax,
    Unknown {
        transaction: Option<String>,
        operation: Option<String>,
    },
}

impl RejectionReason {
    /// Interpret Horizon's transaction and operation result codes
    pub fn from_codes(transaction: Option<&str>, operations: &[String]) -> Self {
        match transaction {
            Some("tx_bad_seq") => return RejectionReason::BadSequence,
            Some("tx_bad_auth") | Some("tx_bad_auth_extra") => return RejectionReason::BadAuth,
            Some("tx_insufficient_fee") => return RejectionReason::InsufficientFee,
            Some("tx_insufficient_balance") => return RejectionReason::InsufficientBalance,
            Some("tx_no_source_account") => return RejectionReason::NoSourceAccount,
            _ => {}
        }

        // First operation that did not succeed decides
        let failing = operations.iter().map(String::as_str).find(|c| *c != "op_success");
        match failing {
            Some("op_malformed") => RejectionReason::Malformed,
            Some("op_underfunded") => RejectionReason::Underfunded,
            Some("op_src_no_trust") => RejectionReason::SourceNoTrust,
            Some("op_src_not_authorized") => RejectionReason::SourceNotAuthorized,
            Some("op_no_destination") => RejectionReason::NoDestination,
            Some("op_no_trust") => RejectionReason::NoTrust,
            Some("op_not_authorized") => RejectionReason::NotAuthorized,
            Some("op_line_full") => RejectionReason::LineFull,
            Some("op_no_issuer") => RejectionReason::NoIssuer,
            Some("op_too_few_offers") => RejectionReason::TooFewOffers,
            Some("op_cross_self") => RejectionReason::OfferCrossSelf,
            Some("op_over_source_max") => RejectionReason::OverSendMax,
            other => RejectionReason::Unknown {
                transaction: transaction.map(str::to_string),
                operation: other.map(str::to_string),
            },
        }
    }

    pub fn from_response(response: &SubmitTransactionResponse) -> Self {
        Self::from_codes(response.transaction_code(), response.operation_codes())
    }

    /// Whether resubmitting with a fresh sequence number can succeed unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RejectionReason::BadSequence | RejectionReason::InsufficientFee
        )
    }

    pub fn error_response(&self) -> ErrorResponse {
        match self {
            RejectionReason::BadSequence => ErrorResponse::new(
                "bad_sequence",
                "Sequence number out of sync with the network. Retry the request.",
                400,
            ),
            RejectionReason::BadAuth => {
                ErrorResponse::new("bad_auth", "Transaction signatures are invalid.", 400)
            }
            RejectionReason::InsufficientFee => {
                ErrorResponse::new("insufficient_fee", "Transaction fee is too low.", 400)
            }
            RejectionReason::InsufficientBalance => ErrorResponse::new(
                "insufficient_balance",
                "Source account cannot cover the fee and minimum balance.",
                400,
            ),
            RejectionReason::NoSourceAccount => {
                ErrorResponse::new("source_not_exist", "Source account does not exist.", 400)
            }
            RejectionReason::Malformed => {
                ErrorResponse::new("payment_malformed", "Operation is malformed.", 400)
            }
            RejectionReason::Underfunded => ErrorResponse::new(
                "payment_underfunded",
                "Source account does not have enough funds.",
                400,
            ),
            RejectionReason::SourceNoTrust => ErrorResponse::new(
                "payment_src_no_trust",
                "Source account has no trust line for the asset.",
                400,
            ),
            RejectionReason::SourceNotAuthorized => ErrorResponse::new(
                "payment_src_not_authorized",
                "Source account is not authorized to send the asset.",
                400,
            ),
            RejectionReason::NoDestination => ErrorResponse::new(
                "payment_no_destination",
                "Destination account does not exist.",
                400,
            ),
            RejectionReason::NoTrust => ErrorResponse::new(
                "payment_no_trust",
                "Destination has no trust line for the asset.",
                400,
            ),
            RejectionReason::NotAuthorized => ErrorResponse::new(
                "payment_not_authorized",
                "Destination is not authorized to hold the asset. Authorize it first.",
                400,
            ),
            RejectionReason::LineFull => ErrorResponse::new(
                "payment_line_full",
                "Payment would take the destination over its trust line limit.",
                400,
            ),
            RejectionReason::NoIssuer => {
                ErrorResponse::new("payment_no_issuer", "Asset issuer does not exist.", 400)
            }
            RejectionReason::TooFewOffers => ErrorResponse::new(
                "payment_too_few_offers",
                "Not enough offers to satisfy the payment path.",
                400,
            ),
            RejectionReason::OfferCrossSelf => ErrorResponse::new(
                "payment_offer_cross_self",
                "Payment path would cross one of the source's own offers.",
                400,
            ),
            RejectionReason::OverSendMax => ErrorResponse::new(
                "payment_over_sendmax",
                "Payment cannot be made within send_max.",
                400,
            ),
            RejectionReason::Unknown { .. } => ErrorResponse::new(
                "internal_server_error",
                "Transaction failed, please try again.",
                500,
            ),
        }
    }
}
