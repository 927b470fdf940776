// Transaction submitter - sequences, signs, records and submits transactions
//
// One protocol, two entry points: `submit` composes the body from an
// operation and memo, `sign_and_submit_raw` takes a body built elsewhere.
// Both then
//   1. advance the account's sequence under its lock,
//   2. hash and sign for the configured network,
//   3. persist a `Sending` record,
//   4. submit once and persist the terminal record,
//   5. reload the sequence from the ledger after a bad-sequence rejection.

use super::{Account, AccountCache, AccountError, RejectionReason};
use crate::horizon::{HorizonError, LedgerClient, SubmitTransactionResponse, TX_BAD_SEQ_RESULT_XDR};
use crate::identity::{Address, Signer};
use crate::storage::{StoreError, SubmissionRecord, SubmissionStore};
use crate::transaction::{
    compose, compute_hash, to_ledger_sequence, ComposeError, Memo, Mutator, Network, Operation,
    TransactionCodec, DEFAULT_BASE_FEE,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use stellar_xdr::curr::{SequenceNumber, Transaction};
use thiserror::Error;
use tracing::{error, info, warn};

/// Result code recorded when a rejection carries none
pub const EMPTY_RESULT_CODE: &str = "<empty>";

/// Source of timestamps for submission records
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// ============================================================================
// SUBMIT ERROR
// ============================================================================

/// Errors returned by the submitter; none of them are retried internally
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Nothing was sent to the network
    #[error("Could not record submission, transaction not sent: {0}")]
    PersistenceError(#[source] StoreError),

    /// The request left but no response came back; the record stays `Sending`
    #[error("Transaction submission failed: {0}")]
    Submission(#[source] HorizonError),

    #[error("Submission task aborted: {0}")]
    Interrupted(String),
}

impl SubmitError {
    /// Errors caused by the caller's input rather than the environment
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SubmitError::Account(AccountError::InvalidCredential(_))
                | SubmitError::Compose(_)
                | SubmitError::SigningFailed(_)
                | SubmitError::EncodingFailed(_)
        )
    }
}

// ============================================================================
// SUBMISSION OUTCOME
// ============================================================================

/// How the network answered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResult {
    Succeeded {
        ledger: u64,
    },
    Failed {
        result_code: String,
        reason: RejectionReason,
    },
}

/// Everything a handler needs to report one submission
#[derive(Clone, Debug)]
pub struct SubmissionOutcome {
    pub transaction_id: String,
    pub source: Address,
    pub sequence: u64,
    pub envelope_xdr: String,
    pub response: SubmitTransactionResponse,
    pub result: SubmissionResult,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, SubmissionResult::Succeeded { .. })
    }

    pub fn ledger(&self) -> Option<u64> {
        match self.result {
            SubmissionResult::Succeeded { ledger } => Some(ledger),
            SubmissionResult::Failed { .. } => None,
        }
    }

    pub fn result_code(&self) -> Option<&str> {
        match &self.result {
            SubmissionResult::Succeeded { .. } => None,
            SubmissionResult::Failed { result_code, .. } => Some(result_code),
        }
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match &self.result {
            SubmissionResult::Succeeded { .. } => None,
            SubmissionResult::Failed { reason, .. } => Some(reason),
        }
    }
}

// ============================================================================
// SUBMITTER
// ============================================================================

/// Submits transactions for the accounts whose seeds it is given
pub struct TransactionSubmitter {
    client: Arc<dyn LedgerClient>,
    store: Arc<dyn SubmissionStore>,
    accounts: AccountCache,
    network: Network,
    base_fee: u32,
    clock: Clock,
}

impl TransactionSubmitter {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        store: Arc<dyn SubmissionStore>,
        network_passphrase: &str,
    ) -> Self {
        Self {
            accounts: AccountCache::new(client.clone()),
            client,
            store,
            network: Network::new(network_passphrase),
            base_fee: DEFAULT_BASE_FEE,
            clock: Arc::new(Utc::now),
        }
    }

    /// Use a custom time source for record timestamps
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Fee per operation for transactions composed by `submit`
    pub fn with_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn accounts(&self) -> &AccountCache {
        &self.accounts
    }

    /// Load an account into the cache ahead of its first submission
    pub async fn init_account(&self, seed: &str) -> Result<(), SubmitError> {
        self.accounts.get_or_load(seed).await?;
        Ok(())
    }

    /// Build a transaction around one operation and submit it
    pub async fn submit(
        &self,
        seed: &str,
        operation: Operation,
        memo: Option<Memo>,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let account = self.accounts.get_or_load(seed).await?;

        // Composed before the sequence advances so a bad operation never
        // consumes a number; the placeholder is overwritten in `send`.
        let mut mutators = vec![
            Mutator::SourceAccount(account.address()),
            Mutator::Sequence(0),
            Mutator::Network(self.network.clone()),
            Mutator::BaseFee(self.base_fee),
            Mutator::Operation(operation),
        ];
        if let Some(memo) = memo {
            mutators.push(Mutator::Memo(memo));
        }
        let unsigned = compose(mutators)?;

        self.send(account, unsigned.into_inner()).await
    }

    /// Sequence, sign and submit a transaction body built elsewhere
    pub async fn sign_and_submit_raw(
        &self,
        seed: &str,
        tx: Transaction,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let account = self.accounts.get_or_load(seed).await?;
        self.send(account, tx).await
    }

    async fn send(
        &self,
        account: Arc<Account>,
        mut tx: Transaction,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let address = account.address();

        // The account lock is held only inside `next_sequence`.
        let sequence = account.next_sequence().await?;
        tx.seq_num = SequenceNumber(
            to_ledger_sequence(sequence).map_err(|e| SubmitError::EncodingFailed(e.to_string()))?,
        );

        let hash = compute_hash(&tx, self.network.passphrase()).map_err(|e| {
            error!(%address, sequence, error = %e, "error calculating transaction hash");
            SubmitError::EncodingFailed(e.to_string())
        })?;
        let signature = Signer::sign_decorated(account.keypair(), &hash).map_err(|e| {
            error!(%address, sequence, error = %e, "error signing transaction");
            SubmitError::SigningFailed(e.to_string())
        })?;
        let envelope_xdr = TransactionCodec::encode_envelope(tx, vec![signature]).map_err(|e| {
            error!(%address, sequence, error = %e, "cannot encode transaction envelope");
            SubmitError::EncodingFailed(e.to_string())
        })?;
        let transaction_id = hex::encode(hash);

        let record = SubmissionRecord::sending(
            transaction_id.clone(),
            address.to_string(),
            (self.clock)(),
            envelope_xdr.clone(),
        );
        if let Err(e) = self.store.persist(&record) {
            error!(%address, %transaction_id, error = %e, "cannot persist sending record, not submitting");
            return Err(SubmitError::PersistenceError(e));
        }

        // From here on the attempt must finish even if the caller goes away.
        let attempt = Attempt {
            client: self.client.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            account,
            record,
            sequence,
        };
        tokio::spawn(attempt.run())
            .await
            .map_err(|e| SubmitError::Interrupted(e.to_string()))?
    }
}

// ============================================================================
// IN-FLIGHT ATTEMPT
// ============================================================================

/// Network half of a submission, run as its own task
struct Attempt {
    client: Arc<dyn LedgerClient>,
    store: Arc<dyn SubmissionStore>,
    clock: Clock,
    account: Arc<Account>,
    record: SubmissionRecord,
    sequence: u64,
}

impl Attempt {
    async fn run(self) -> Result<SubmissionOutcome, SubmitError> {
        let Attempt {
            client,
            store,
            clock,
            account,
            mut record,
            sequence,
        } = self;
        let address = account.address();
        let transaction_id = record.transaction_id().to_string();

        let response = match client.submit_transaction(record.envelope_xdr()).await {
            Ok(response) => response,
            Err(e) => {
                error!(%address, %transaction_id, error = %e, "error submitting transaction");
                return Err(SubmitError::Submission(e));
            }
        };

        let result = match response.ledger {
            Some(ledger) => {
                record.mark_succeeded(ledger, clock());
                info!(%address, %transaction_id, sequence, ledger, "transaction succeeded");
                SubmissionResult::Succeeded { ledger }
            }
            None => {
                let result_code = response
                    .result_xdr()
                    .unwrap_or(EMPTY_RESULT_CODE)
                    .to_string();
                record.mark_failed(result_code.clone());
                let reason = RejectionReason::from_response(&response);
                warn!(%address, %transaction_id, sequence, %result_code, ?reason, "transaction rejected");
                SubmissionResult::Failed {
                    result_code,
                    reason,
                }
            }
        };

        // The network already answered, so a bookkeeping failure here must not
        // be reported as "not sent".
        if let Err(e) = store.persist(&record) {
            error!(%address, %transaction_id, error = %e, "cannot persist submission result");
        }

        if let SubmissionResult::Failed { result_code, .. } = &result {
            if result_code == TX_BAD_SEQ_RESULT_XDR {
                info!(%address, "syncing sequence number");
                match account.resync(client.as_ref()).await {
                    Ok(synced) => info!(%address, sequence = synced, "sequence number synced"),
                    Err(e) => error!(%address, error = %e, "error updating sequence number"),
                }
            }
        }

        Ok(SubmissionOutcome {
            transaction_id,
            source: address,
            sequence,
            envelope_xdr: record.envelope_xdr().to_string(),
            response,
            result,
        })
    }
}
