// Gateway binary - loads configuration, wires the submitter and runs one command

mod cli;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use ledger_gateway::config::GatewayConfig;
use ledger_gateway::gateway::{SubmissionOutcome, SubmissionResult, TransactionSubmitter};
use ledger_gateway::horizon::HorizonClient;
use ledger_gateway::identity::{Address, Keypair};
use ledger_gateway::logging;
use ledger_gateway::storage::{SledSubmissionStore, SubmissionStore};
use ledger_gateway::transaction::{
    build_envelope, compose, parse_amount, Asset, Memo, Mutator, Network, Operation,
};

use cli::{AuthorizeArgs, BuildArgs, Cli, Commands, InitAccountArgs, PayArgs, StatusArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Needs neither configuration nor network
    if let Commands::CreateKeypair = cli.command {
        return create_keypair();
    }

    let config = GatewayConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    config.validate()?;

    logging::init_logging(&cli.log_level, config.log_format);

    let store = Arc::new(
        SledSubmissionStore::open(&config.database_path).with_context(|| {
            format!(
                "failed to open database at {}",
                config.database_path.display()
            )
        })?,
    );

    match cli.command {
        Commands::CreateKeypair => unreachable!("handled before configuration is loaded"),
        Commands::Status(args) => status(store.as_ref(), args),
        Commands::Build(args) => build(&config, args),
        command => {
            let client = Arc::new(HorizonClient::with_timeout(
                &config.horizon_url,
                Duration::from_secs(config.request_timeout_secs),
            )?);
            let submitter =
                TransactionSubmitter::new(client, store.clone(), &config.network_passphrase)
                    .with_base_fee(config.base_fee);

            tracing::info!(
                horizon = %config.horizon_url,
                network = %config.network_passphrase,
                "gateway started"
            );

            let result = match command {
                Commands::InitAccount(args) => init_account(&config, &submitter, args).await,
                Commands::Pay(args) => pay(&config, &submitter, args).await,
                Commands::Authorize(args) => authorize(&config, &submitter, args).await,
                _ => unreachable!("offline commands handled above"),
            };

            store.flush()?;
            result
        }
    }
}

fn create_keypair() -> Result<()> {
    let keypair = Keypair::random();
    let body = serde_json::json!({
        "public_key": keypair.address().to_string(),
        "private_key": keypair.seed(),
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn base_seed(config: &GatewayConfig) -> Result<&str> {
    config
        .accounts
        .base_seed
        .as_deref()
        .ok_or_else(|| anyhow!("accounts.base_seed is not configured"))
}

async fn init_account(
    config: &GatewayConfig,
    submitter: &TransactionSubmitter,
    args: InitAccountArgs,
) -> Result<()> {
    let seed = match args.seed.as_deref() {
        Some(seed) => seed,
        None => base_seed(config)?,
    };

    submitter.init_account(seed).await?;
    let account = submitter
        .accounts()
        .get(seed)
        .ok_or_else(|| anyhow!("account missing from cache after load"))?;

    let body = serde_json::json!({
        "address": account.address().to_string(),
        "sequence": account.sequence().await,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn pay(config: &GatewayConfig, submitter: &TransactionSubmitter, args: PayArgs) -> Result<()> {
    let destination = Address::parse(&args.destination).context("invalid destination")?;
    let amount = parse_amount(&args.amount).context("invalid amount")?;

    let asset = asset_from_args(config, args.asset_code, args.asset_issuer)?;
    let memo = memo_from_args(args.memo_type, args.memo)?;

    let outcome = submitter
        .submit(
            base_seed(config)?,
            Operation::payment(destination, asset, amount),
            memo,
        )
        .await?;
    report(&outcome)
}

async fn authorize(
    config: &GatewayConfig,
    submitter: &TransactionSubmitter,
    args: AuthorizeArgs,
) -> Result<()> {
    let seed = config
        .authorizing_seed()
        .ok_or_else(|| anyhow!("no authorizing seed configured"))?;
    let issuer = config
        .accounts
        .issuing_account_id
        .as_deref()
        .ok_or_else(|| anyhow!("accounts.issuing_account_id is not configured"))?;

    if !config.is_asset_allowed(&args.asset_code, issuer) {
        bail!("asset {} is not issued by {}", args.asset_code, issuer);
    }

    let trustor = Address::parse(&args.trustor).context("invalid trustor")?;
    let outcome = submitter
        .submit(
            seed,
            Operation::allow_trust(trustor, args.asset_code, true),
            None,
        )
        .await?;
    report(&outcome)
}

fn build(config: &GatewayConfig, args: BuildArgs) -> Result<()> {
    let body = build_envelope_json(config, args)?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn build_envelope_json(config: &GatewayConfig, args: BuildArgs) -> Result<serde_json::Value> {
    let source = Address::parse(&args.source).context("invalid source")?;
    let destination = Address::parse(&args.destination).context("invalid destination")?;
    let amount = parse_amount(&args.amount).context("invalid amount")?;
    let signers = args
        .signers
        .iter()
        .map(|seed| Keypair::from_seed(seed))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid signer")?;
    let asset = asset_from_args(config, args.asset_code, args.asset_issuer)?;
    let memo = memo_from_args(args.memo_type, args.memo)?;

    let mut mutators = vec![
        Mutator::SourceAccount(source),
        Mutator::Sequence(args.sequence),
        Mutator::Network(Network::new(config.network_passphrase.clone())),
        Mutator::BaseFee(config.base_fee),
        Mutator::Operation(Operation::payment(destination, asset, amount)),
    ];
    mutators.extend(memo.map(Mutator::Memo));
    let unsigned = compose(mutators)?;

    Ok(serde_json::json!({
        "hash": hex::encode(unsigned.hash()?),
        "transaction_envelope": build_envelope(&unsigned, &signers)?,
    }))
}

/// Native when both are absent, a configured credit asset when both are given
fn asset_from_args(
    config: &GatewayConfig,
    code: Option<String>,
    issuer: Option<String>,
) -> Result<Asset> {
    match (code, issuer) {
        (Some(code), Some(issuer)) => {
            if !config.is_asset_allowed(&code, &issuer) {
                bail!("asset {}:{} is not allowed", code, issuer);
            }
            Ok(Asset::credit(
                code,
                Address::parse(&issuer).context("invalid asset issuer")?,
            ))
        }
        (None, None) => Ok(Asset::Native),
        _ => bail!("asset code and issuer must be given together"),
    }
}

fn memo_from_args(memo_type: Option<String>, value: Option<String>) -> Result<Option<Memo>> {
    match (memo_type, value) {
        (Some(memo_type), Some(value)) => Ok(Some(
            Memo::from_type_and_value(&memo_type, &value).context("invalid memo")?,
        )),
        (None, None) => Ok(None),
        _ => bail!("memo type and memo must be given together"),
    }
}

fn status(store: &SledSubmissionStore, args: StatusArgs) -> Result<()> {
    let record = store
        .get(&args.transaction_id)?
        .ok_or_else(|| anyhow!("no record for transaction {}", args.transaction_id))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn report(outcome: &SubmissionOutcome) -> Result<()> {
    match &outcome.result {
        SubmissionResult::Succeeded { ledger } => {
            let body = serde_json::json!({
                "hash": outcome.transaction_id,
                "ledger": ledger,
                "source": outcome.source.to_string(),
                "sequence": outcome.sequence,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        SubmissionResult::Failed {
            result_code,
            reason,
        } => {
            let body = serde_json::json!({
                "hash": outcome.transaction_id,
                "result_xdr": result_code,
                "error": reason.error_response(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            bail!("transaction {} rejected", outcome.transaction_id)
        }
    }
}
