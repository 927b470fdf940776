// Command line interface for the `gateway` binary

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Payment gateway for the Stellar network
#[derive(Parser, Debug)]
#[command(name = "gateway", version, propagate_version = true)]
pub struct Cli {
    /// Path to the gateway configuration file (TOML)
    #[arg(long, short = 'c', env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    pub config: PathBuf,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, env = "GATEWAY_LOG_LEVEL", default_value = "ledger_gateway=info,gateway=info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a random keypair and print it as JSON
    CreateKeypair,
    /// Load an account and its sequence number from the network
    InitAccount(InitAccountArgs),
    /// Send a payment from the base account
    Pay(PayArgs),
    /// Authorize a trustor to hold one of the configured assets
    Authorize(AuthorizeArgs),
    /// Build and sign a payment envelope without submitting it
    Build(BuildArgs),
    /// Show the stored record for a submitted transaction
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct InitAccountArgs {
    /// Secret seed to load; defaults to the configured base seed
    #[arg(long, env = "GATEWAY_SEED")]
    pub seed: Option<String>,
}

#[derive(Args, Debug)]
pub struct PayArgs {
    #[arg(long)]
    pub destination: String,

    /// Decimal amount, up to 7 fractional digits
    #[arg(long)]
    pub amount: String,

    /// Credit asset code; native when omitted
    #[arg(long, requires = "asset_issuer")]
    pub asset_code: Option<String>,

    #[arg(long, requires = "asset_code")]
    pub asset_issuer: Option<String>,

    /// One of text, id, hash, return
    #[arg(long, requires = "memo")]
    pub memo_type: Option<String>,

    #[arg(long, requires = "memo_type")]
    pub memo: Option<String>,
}

#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    #[arg(long)]
    pub trustor: String,

    #[arg(long)]
    pub asset_code: String,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source account address
    #[arg(long)]
    pub source: String,

    /// Sequence number to use as is
    #[arg(long)]
    pub sequence: u64,

    #[arg(long)]
    pub destination: String,

    /// Decimal amount, up to 7 fractional digits
    #[arg(long)]
    pub amount: String,

    /// Secret seed to sign with, repeatable
    #[arg(long = "signer")]
    pub signers: Vec<String>,

    /// Credit asset code; native when omitted
    #[arg(long, requires = "asset_issuer")]
    pub asset_code: Option<String>,

    #[arg(long, requires = "asset_code")]
    pub asset_issuer: Option<String>,

    /// One of text, id, hash, return
    #[arg(long, requires = "memo")]
    pub memo_type: Option<String>,

    #[arg(long, requires = "memo_type")]
    pub memo: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Hex transaction hash
    pub transaction_id: String,
}
