// Ledger client - talks to the network's public HTTP API (Horizon)

use super::{AccountResponse, HorizonError, SubmitTransactionResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout for Horizon calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote ledger the gateway reads sequence numbers from and submits to
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Load the current state of an account
    async fn load_account(&self, address: &str) -> Result<AccountResponse, HorizonError>;

    /// Submit a base64 XDR transaction envelope
    ///
    /// A rejection by the network is an `Ok` response carrying `extras`;
    /// `Err` means the outcome is unknown.
    async fn submit_transaction(
        &self,
        envelope_xdr: &str,
    ) -> Result<SubmitTransactionResponse, HorizonError>;
}

/// `LedgerClient` backed by a Horizon server
pub struct HorizonClient {
    base_url: String,
    http: reqwest::Client,
}

impl HorizonClient {
    /// Create a client with the default timeout
    pub fn new(base_url: &str) -> Result<Self, HorizonError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose requests fail after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, HorizonError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HorizonError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LedgerClient for HorizonClient {
    async fn load_account(&self, address: &str) -> Result<AccountResponse, HorizonError> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        debug!(%url, "loading account");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| HorizonError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(HorizonError::AccountNotFound(address.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HorizonError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<AccountResponse>()
            .await
            .map_err(|e| HorizonError::InvalidResponse(e.to_string()))
    }

    async fn submit_transaction(
        &self,
        envelope_xdr: &str,
    ) -> Result<SubmitTransactionResponse, HorizonError> {
        let url = format!("{}/transactions", self.base_url);

        let response = self
            .http
            .post(&url)
            .form(&[("tx", envelope_xdr)])
            .send()
            .await
            .map_err(|e| HorizonError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HorizonError::Http(e.to_string()))?;

        // Rejections come back as 400 problem documents with `extras`.
        match serde_json::from_str::<SubmitTransactionResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.extras.is_some() => Ok(parsed),
            _ => {
                warn!(status = status.as_u16(), "unexpected transaction submission response");
                Err(HorizonError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
