//! relay-bundler
//!
//! Funds a spender account and sends its token transfer in one private
//! bundle, targeting a single block a few blocks ahead.
//!
//! ```text
//!   env + optional TOML ──▶ config ──▶ wallets (funding, spender)
//!                                        │
//!   chain client ◀───────────────────────┤
//!        │                               ▼
//!        └────────▶ workflow: build ─▶ sign ─▶ simulate ─▶ submit ─▶ confirm
//!                                                 │            │
//!                                                 └── relay ◀──┘
//! ```
//!
//! Exit status is 0 when the run reaches a resolved state (included, not
//! included, or rejected by simulation) and 1 on any fatal error.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use relay_bundler::blockchain::{BlockchainClient, KeyHolder, Wallet};
use relay_bundler::config::loader::load_or_default;
use relay_bundler::config::{BundlerConfig, EnvConfig};
use relay_bundler::gas::ConfiguredGasPrice;
use relay_bundler::observability::init_logging;
use relay_bundler::relay::Resolution;
use relay_bundler::{BundleWorkflow, BundlerError, FlashbotsRelay, RunOutcome};

#[derive(Parser)]
#[command(name = "relay-bundler")]
#[command(about = "Submit a funded token transfer as a private relay bundle", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; defaults apply without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after simulation instead of submitting.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability.log_level) {
        eprintln!("Warning: logging already initialized: {}", e);
    }

    tracing::info!("relay-bundler v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&config, cli.dry_run).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &BundlerConfig, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env = EnvConfig::from_env().map_err(BundlerError::from)?;

    let chain_id = config.chain.chain_id;
    let funding = Wallet::from_private_key(&env.secrets.funding_key, chain_id)
        .map_err(|e| BundlerError::Configuration(format!("GAS_TANK_PRIVATE_KEY: {}", e)))?;
    let spender = Wallet::from_private_key(&env.secrets.spender_key, chain_id)
        .map_err(|e| BundlerError::Configuration(format!("USER_PRIVATE_KEY: {}", e)))?;

    println!("Funding Wallet Address: {}", funding.address());
    println!("Spender Wallet Address: {}", spender.address());

    let chain = BlockchainClient::new(config.chain.clone(), &env.secrets.api_key)
        .await
        .map_err(BundlerError::ChainRead)?;
    let gas = ConfiguredGasPrice::from_config(&config.gas, &env.transfer.base_gas_price_gwei, &chain)?;
    let relay = FlashbotsRelay::new(&config.relay, &config.workflow, funding.clone(), chain.clone())?;

    tracing::info!(
        relay = %relay.url(),
        funding = %funding.address(),
        spender = %spender.address(),
        dry_run,
        "Components initialized"
    );

    let outcome = BundleWorkflow::new(config, &env.transfer, &chain, &relay, &funding, &spender, &gas)
        .dry_run(dry_run)
        .run()
        .await?;

    println!("Target Block: {}", outcome.target());
    report(&outcome);
    Ok(())
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::SimulationRejected { failure, .. } => {
            println!("Simulation Rejected: {}", failure);
        }
        RunOutcome::Simulated { report, .. } => {
            println!("Simulation Succeeded: {} gas used", report.total_gas_used);
            for (index, trace) in report.results.iter().enumerate() {
                println!("  [{}] {} gas_used={}", index, trace.tx_hash, trace.gas_used);
            }
        }
        RunOutcome::Resolved { bundle_hash, resolution, .. } => {
            println!("Bundle Hash: {}", bundle_hash);
            match resolution {
                Resolution::Included(receipts) => {
                    println!("Bundle Included:");
                    for receipt in receipts {
                        println!("  {}", receipt);
                    }
                }
                Resolution::BlockPassedWithoutInclusion => {
                    println!("Target block passed without inclusion");
                }
                Resolution::AccountNonceTooHigh => {
                    println!("Account nonce too high, bundle can no longer be included");
                }
            }
        }
    }
}
