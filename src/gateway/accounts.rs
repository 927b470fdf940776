// Account cache - per-seed signing identities and their sequence counters
//
// Accounts are loaded from the ledger on first use and live for the life of
// the process. The number of entries is bounded by the operator-configured
// seeds, so there is no eviction.

use crate::horizon::{HorizonError, LedgerClient};
use crate::identity::{Address, Keypair, KeypairError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

/// Errors resolving an account
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] KeypairError),

    #[error("Account lookup failed for {address}: {source}")]
    AccountLookupFailed {
        address: String,
        #[source]
        source: HorizonError,
    },

    #[error("Sequence number exhausted for {0}")]
    SequenceExhausted(String),
}

// ============================================================================
// ACCOUNT
// ============================================================================

/// A signing identity known to the gateway
///
/// The sequence lock guards only local bookkeeping: the increment before a
/// submission and the reload after a bad-sequence rejection. It is never
/// held while a transaction is in flight.
pub struct Account {
    keypair: Keypair,
    address: Address,
    sequence: Mutex<u64>,
}

impl Account {
    pub fn new(keypair: Keypair, sequence: u64) -> Self {
        let address = keypair.address();
        Self {
            keypair,
            address,
            sequence: Mutex::new(sequence),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Last sequence number handed out (or loaded from the ledger)
    pub async fn sequence(&self) -> u64 {
        *self.sequence.lock().await
    }

    /// Advance the counter by one and return the new value
    ///
    /// The counter is left unchanged when it cannot advance.
    pub async fn next_sequence(&self) -> Result<u64, AccountError> {
        let mut sequence = self.sequence.lock().await;
        let next = sequence
            .checked_add(1)
            .ok_or_else(|| AccountError::SequenceExhausted(self.address.to_string()))?;
        *sequence = next;
        Ok(next)
    }

    /// Replace the cached counter with the ledger's current value
    ///
    /// Holds the lock across the lookup so no submission picks a number
    /// from the stale counter meanwhile.
    pub async fn resync(&self, client: &dyn LedgerClient) -> Result<u64, AccountError> {
        let mut sequence = self.sequence.lock().await;
        let address = self.address.to_string();

        let loaded = client
            .load_account(&address)
            .await
            .and_then(|response| response.sequence_number())
            .map_err(|source| AccountError::AccountLookupFailed {
                address: address.clone(),
                source,
            })?;

        debug!(%address, from = *sequence, to = loaded, "sequence number reloaded");
        *sequence = loaded;
        Ok(loaded)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ACCOUNT CACHE
// ============================================================================

type Slot = Arc<OnceCell<Arc<Account>>>;

/// Process-wide map from secret seed to account
///
/// Each seed owns a slot that is filled at most once. Concurrent misses on
/// the same seed wait for a single ledger lookup instead of issuing one each.
pub struct AccountCache {
    client: Arc<dyn LedgerClient>,
    accounts: RwLock<HashMap<String, Slot>>,
}

impl AccountCache {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            client,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached account for `seed`, loading it from the ledger on a miss
    ///
    /// Failed loads are not cached; the next caller retries the lookup.
    pub async fn get_or_load(&self, seed: &str) -> Result<Arc<Account>, AccountError> {
        if let Some(account) = self.get(seed) {
            return Ok(account);
        }

        // Invalid seeds never get a slot.
        let keypair = Keypair::from_seed(seed)?;
        let slot = self.slot(seed);

        let account = slot
            .get_or_try_init(|| async move {
                self.fetch(keypair).await.map(Arc::new)
            })
            .await?;
        Ok(account.clone())
    }

    /// Fetch an account's current state without touching the cache
    pub async fn load(&self, seed: &str) -> Result<Account, AccountError> {
        let keypair = Keypair::from_seed(seed)?;
        self.fetch(keypair).await
    }

    /// Cached account, if any
    pub fn get(&self, seed: &str) -> Option<Arc<Account>> {
        self.accounts
            .read()
            .get(seed)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of loaded accounts
    pub fn len(&self) -> usize {
        self.accounts
            .read()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, seed: &str) -> Slot {
        if let Some(slot) = self.accounts.read().get(seed) {
            return slot.clone();
        }
        self.accounts
            .write()
            .entry(seed.to_string())
            .or_default()
            .clone()
    }

    async fn fetch(&self, keypair: Keypair) -> Result<Account, AccountError> {
        let address = keypair.address().to_string();

        let sequence = self
            .client
            .load_account(&address)
            .await
            .and_then(|response| response.sequence_number())
            .map_err(|source| AccountError::AccountLookupFailed {
                address: address.clone(),
                source,
            })?;

        info!(%address, sequence, "account loaded");
        Ok(Account::new(keypair, sequence))
    }
}
