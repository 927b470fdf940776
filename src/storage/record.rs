use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a submitted transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Persisted, network call in flight or outcome unknown
    Sending,
    /// Included in a ledger
    Succeeded,
    /// Rejected by the network
    Failed,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Sending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Sending => "sending",
            SubmissionStatus::Succeeded => "success",
            SubmissionStatus::Failed => "failure",
        };
        f.write_str(s)
    }
}

/// Audit entry for one attempted transaction, keyed by its hash
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    transaction_id: String,
    status: SubmissionStatus,
    source: String,
    submitted_at: DateTime<Utc>,
    succeeded_at: Option<DateTime<Utc>>,
    ledger: Option<u64>,
    envelope_xdr: String,
    result_xdr: Option<String>,
}

impl SubmissionRecord {
    /// New record in `Sending` state
    pub fn sending(
        transaction_id: impl Into<String>,
        source: impl Into<String>,
        submitted_at: DateTime<Utc>,
        envelope_xdr: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status: SubmissionStatus::Sending,
            source: source.into(),
            submitted_at,
            succeeded_at: None,
            ledger: None,
            envelope_xdr: envelope_xdr.into(),
            result_xdr: None,
        }
    }

    pub fn mark_succeeded(&mut self, ledger: u64, at: DateTime<Utc>) {
        self.status = SubmissionStatus::Succeeded;
        self.ledger = Some(ledger);
        self.succeeded_at = Some(at);
    }

    pub fn mark_failed(&mut self, result_xdr: impl Into<String>) {
        self.status = SubmissionStatus::Failed;
        self.result_xdr = Some(result_xdr.into());
    }

    /// Hex-encoded transaction hash
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn succeeded_at(&self) -> Option<DateTime<Utc>> {
        self.succeeded_at
    }

    pub fn ledger(&self) -> Option<u64> {
        self.ledger
    }

    pub fn envelope_xdr(&self) -> &str {
        &self.envelope_xdr
    }

    pub fn result_xdr(&self) -> Option<&str> {
        self.result_xdr.as_deref()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
