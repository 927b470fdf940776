use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base64 XDR `TransactionResult` Horizon returns when a transaction's
/// sequence number is not the account's next one (`txBAD_SEQ`, fee 0)
pub const TX_BAD_SEQ_RESULT_XDR: &str = "AAAAAAAAAAD////7AAAAAA==";

/// Errors talking to the ledger's HTTP API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HorizonError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Subset of Horizon's account resource the gateway needs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    /// Current sequence number, as a decimal string
    pub sequence: String,
}

impl AccountResponse {
    pub fn new(id: impl Into<String>, sequence: u64) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.to_string(),
        }
    }

    /// Sequence number as an unsigned counter
    ///
    /// The ledger stores sequences as non-negative `i64`, so anything outside
    /// that range is rejected.
    pub fn sequence_number(&self) -> Result<u64, HorizonError> {
        self.sequence
            .parse::<i64>()
            .ok()
            .and_then(|sequence| u64::try_from(sequence).ok())
            .ok_or_else(|| {
                HorizonError::InvalidResponse(format!(
                    "invalid sequence number '{}'",
                    self.sequence
                ))
            })
    }
}

// ============================================================================
// SUBMISSIONS
// ============================================================================

/// Machine-readable result codes of a rejected transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Option<Vec<String>>,
}

/// Diagnostic payload Horizon attaches to a rejection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitExtras {
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_codes: Option<ResultCodes>,
}

/// Response to a transaction submission: `ledger` on success, `extras` on rejection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionResponse {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub ledger: Option<u64>,
    #[serde(default)]
    pub extras: Option<SubmitExtras>,
}

impl SubmitTransactionResponse {
    pub fn success(hash: impl Into<String>, ledger: u64) -> Self {
        Self {
            hash: Some(hash.into()),
            ledger: Some(ledger),
            extras: None,
        }
    }

    pub fn rejected(extras: SubmitExtras) -> Self {
        Self {
            hash: None,
            ledger: None,
            extras: Some(extras),
        }
    }

    pub fn is_success(&self) -> bool {
        self.ledger.is_some()
    }

    pub fn result_xdr(&self) -> Option<&str> {
        self.extras.as_ref()?.result_xdr.as_deref()
    }

    pub fn transaction_code(&self) -> Option<&str> {
        self.extras
            .as_ref()?
            .result_codes
            .as_ref()?
            .transaction
            .as_deref()
    }

    pub fn operation_codes(&self) -> &[String] {
        self.extras
            .as_ref()
            .and_then(|e| e.result_codes.as_ref())
            .and_then(|c| c.operations.as_deref())
            .unwrap_or(&[])
    }
}
