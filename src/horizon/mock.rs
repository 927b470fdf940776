// Mock ledger client - scripted Horizon stand-in for tests and dry runs

use super::{
    AccountResponse, HorizonError, LedgerClient, ResultCodes, SubmitExtras,
    SubmitTransactionResponse, TX_BAD_SEQ_RESULT_XDR,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted answer to `submit_transaction`
#[derive(Clone, Debug)]
pub enum MockSubmitResponse {
    /// Accepted into the given ledger
    Success { ledger: u64 },
    /// Rejected by the network
    Rejected {
        result_xdr: Option<String>,
        transaction_code: Option<String>,
        operation_codes: Vec<String>,
    },
    /// The request never produced a response
    NetworkError(String),
}

impl MockSubmitResponse {
    /// Rejection for a stale sequence number
    pub fn bad_sequence() -> Self {
        MockSubmitResponse::Rejected {
            result_xdr: Some(TX_BAD_SEQ_RESULT_XDR.to_string()),
            transaction_code: Some("tx_bad_seq".to_string()),
            operation_codes: Vec::new(),
        }
    }

    /// Failed transaction with one failing operation
    pub fn operation_failed(operation_code: &str) -> Self {
        MockSubmitResponse::Rejected {
            result_xdr: Some("AAAAAAAAAGT/////AAAAAQAAAAAAAAAB/////gAAAAA=".to_string()),
            transaction_code: Some("tx_failed".to_string()),
            operation_codes: vec![operation_code.to_string()],
        }
    }
}

/// Mock implementation of `LedgerClient`
///
/// Submissions succeed with increasing ledger numbers unless a response
/// has been queued.
pub struct MockLedgerClient {
    accounts: Mutex<HashMap<String, u64>>,
    responses: Mutex<VecDeque<MockSubmitResponse>>,
    submitted: Mutex<Vec<String>>,
    lookup_failure: Mutex<Option<HorizonError>>,
    load_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    next_ledger: AtomicU64,
    delay_ms: u64,
}

impl MockLedgerClient {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            responses: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            lookup_failure: Mutex::new(None),
            load_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            next_ledger: AtomicU64::new(1000),
            delay_ms: 0,
        }
    }

    /// Register an account with its current sequence number
    pub fn with_account(self, address: &str, sequence: u64) -> Self {
        self.set_sequence(address, sequence);
        self
    }

    /// Add a delay before every response
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Queue scripted submission responses, consumed in order
    pub fn with_responses<I>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = MockSubmitResponse>,
    {
        self.responses.lock().extend(responses);
        self
    }

    /// Make every account lookup fail
    pub fn with_lookup_failure(self, error: HorizonError) -> Self {
        *self.lookup_failure.lock() = Some(error);
        self
    }

    /// Overwrite the network's view of an account's sequence number
    pub fn set_sequence(&self, address: &str, sequence: u64) {
        self.accounts.lock().insert(address.to_string(), sequence);
    }

    pub fn push_response(&self, response: MockSubmitResponse) {
        self.responses.lock().push_back(response);
    }

    pub fn clear_lookup_failure(&self) {
        *self.lookup_failure.lock() = None;
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Envelopes received so far, in arrival order
    pub fn submitted_envelopes(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }

    async fn pause(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn load_account(&self, address: &str) -> Result<AccountResponse, HorizonError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if let Some(error) = self.lookup_failure.lock().clone() {
            return Err(error);
        }

        self.accounts
            .lock()
            .get(address)
            .map(|sequence| AccountResponse::new(address, *sequence))
            .ok_or_else(|| HorizonError::AccountNotFound(address.to_string()))
    }

    async fn submit_transaction(
        &self,
        envelope_xdr: &str,
    ) -> Result<SubmitTransactionResponse, HorizonError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().push(envelope_xdr.to_string());
        self.pause().await;

        let scripted = self.responses.lock().pop_front();
        match scripted {
            None => {
                let ledger = self.next_ledger.fetch_add(1, Ordering::SeqCst);
                Ok(SubmitTransactionResponse::success(
                    format!("mock-{}", ledger),
                    ledger,
                ))
            }
            Some(MockSubmitResponse::Success { ledger }) => Ok(
                SubmitTransactionResponse::success(format!("mock-{}", ledger), ledger),
            ),
            Some(MockSubmitResponse::Rejected {
                result_xdr,
                transaction_code,
                operation_codes,
            }) => Ok(SubmitTransactionResponse::rejected(SubmitExtras {
                envelope_xdr: Some(envelope_xdr.to_string()),
                result_xdr,
                result_codes: Some(ResultCodes {
                    transaction: transaction_code,
                    operations: if operation_codes.is_empty() {
                        None
                    } else {
                        Some(operation_codes)
                    },
                }),
            })),
            Some(MockSubmitResponse::NetworkError(message)) => Err(HorizonError::Http(message)),
        }
    }
}
