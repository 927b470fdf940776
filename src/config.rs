// Gateway configuration - loaded from TOML and validated before use

use crate::identity::{Address, Keypair};
use crate::logging::LogFormat;
use crate::transaction::{asset_code, TEST_NETWORK_PASSPHRASE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Signing accounts the gateway operates
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Seed payments are sent from
    pub base_seed: Option<String>,
    /// Seed that signs allow-trust operations; defaults to `base_seed`
    pub authorizing_seed: Option<String>,
    /// Issuer of the assets the gateway authorizes
    pub issuing_account_id: Option<String>,
}

/// An asset the gateway is allowed to send
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub code: String,
    pub issuer: String,
}

/// Top-level gateway configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub horizon_url: String,
    pub network_passphrase: String,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Fee per operation in stroops
    #[serde(default = "default_base_fee")]
    pub base_fee: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("gateway.db")
}

fn default_base_fee() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl GatewayConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a TOML file; call `validate` before use
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn with_horizon_url(mut self, url: &str) -> Self {
        self.horizon_url = url.to_string();
        self
    }

    pub fn with_network_passphrase(mut self, passphrase: &str) -> Self {
        self.network_passphrase = passphrase.to_string();
        self
    }

    pub fn with_database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_base_seed(mut self, seed: &str) -> Self {
        self.accounts.base_seed = Some(seed.to_string());
        self
    }

    pub fn with_authorizing_seed(mut self, seed: &str) -> Self {
        self.accounts.authorizing_seed = Some(seed.to_string());
        self
    }

    pub fn with_asset(mut self, code: &str, issuer: &str) -> Self {
        self.assets.push(AssetConfig {
            code: code.to_string(),
            issuer: issuer.to_string(),
        });
        self
    }

    /// Seed used to sign allow-trust operations
    pub fn authorizing_seed(&self) -> Option<&str> {
        self.accounts
            .authorizing_seed
            .as_deref()
            .or(self.accounts.base_seed.as_deref())
    }

    pub fn is_asset_allowed(&self, code: &str, issuer: &str) -> bool {
        self.assets
            .iter()
            .any(|asset| asset.code == code && asset.issuer == issuer)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_passphrase.is_empty() {
            return Err(ConfigError::Invalid(
                "network_passphrase param is required".to_string(),
            ));
        }

        if !(self.horizon_url.starts_with("http://") || self.horizon_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "horizon_url must be an http(s) URL, got '{}'",
                self.horizon_url
            )));
        }

        if self.base_fee == 0 {
            return Err(ConfigError::Invalid("base_fee must be > 0".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }

        match &self.accounts.base_seed {
            None => {
                return Err(ConfigError::Invalid(
                    "accounts.base_seed param is required".to_string(),
                ))
            }
            Some(seed) => {
                Keypair::from_seed(seed).map_err(|_| {
                    ConfigError::Invalid("accounts.base_seed is invalid".to_string())
                })?;
            }
        }

        if let Some(seed) = &self.accounts.authorizing_seed {
            Keypair::from_seed(seed).map_err(|_| {
                ConfigError::Invalid("accounts.authorizing_seed is invalid".to_string())
            })?;
        }

        if let Some(account_id) = &self.accounts.issuing_account_id {
            Address::parse(account_id).map_err(|_| {
                ConfigError::Invalid("accounts.issuing_account_id is invalid".to_string())
            })?;
        }

        for asset in &self.assets {
            asset_code(&asset.code).map_err(|_| {
                ConfigError::Invalid(format!("assets: invalid code '{}'", asset.code))
            })?;
            Address::parse(&asset.issuer).map_err(|_| {
                ConfigError::Invalid(format!("assets: invalid issuer for '{}'", asset.code))
            })?;
        }

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            horizon_url: "https://horizon-testnet.stellar.org".to_string(),
            network_passphrase: TEST_NETWORK_PASSPHRASE.to_string(),
            database_path: default_database_path(),
            base_fee: default_base_fee(),
            request_timeout_secs: default_request_timeout_secs(),
            log_format: LogFormat::default(),
            accounts: AccountsConfig::default(),
            assets: Vec::new(),
        }
    }
}
