//! # RewardSync CLI
//!
//! Prepares the contribution allocation snapshot and claims contributor
//! rewards on behalf of a list of accounts.
//!
//! ## Usage
//!
//! ```bash
//! # Build snapshot.json from the points tables in settings.json
//! rewardsync snapshot --output snapshot.json
//!
//! # Claim for every wallet in a snapshot, without broadcasting
//! rewardsync claim --from-snapshot snapshot.json --dry-run
//!
//! # Claim for two accounts in a given period
//! rewardsync claim --account 0x... --account 0x... --period 2026-01
//! ```
//!
//! Outcome lines go to stdout, logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rewardsync_app::{
    run_claim, run_snapshot, App, AppBuilder, AppError, ClaimInputs, RewardSyncConfig,
};
use rewardsync_claimer::ClaimReport;
use tracing::info;

const SERVICE: &str = "rewardsync";

// ==================== CLI DEFINITION ====================

#[derive(Parser)]
#[command(name = "rewardsync")]
#[command(about = "Contribution snapshot and reward claim tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// JSON-RPC endpoint, overrides settings and RPC_URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the allocation snapshot artifact
    Snapshot {
        /// Output file for the snapshot
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the on-chain boundNodeCount lookup
        #[arg(long)]
        no_onchain: bool,
    },

    /// Claim rewards for a list of accounts
    Claim {
        /// Account to claim for (repeatable)
        #[arg(short, long = "account")]
        accounts: Vec<String>,

        /// File with one account per line
        #[arg(long)]
        accounts_file: Option<PathBuf>,

        /// Also claim for every wallet in this snapshot artifact
        #[arg(long)]
        from_snapshot: Option<PathBuf>,

        /// Distribution period, e.g. 2026-01
        #[arg(short, long)]
        period: Option<String>,

        /// Pause between accounts in milliseconds
        #[arg(long)]
        throttle_ms: Option<u64>,

        /// Sign transactions but do not broadcast them
        #[arg(long)]
        dry_run: bool,
    },
}

// ==================== COMMANDS ====================

fn load_config(cli: &Cli) -> Result<RewardSyncConfig, AppError> {
    let mut builder = AppBuilder::<RewardSyncConfig>::new(SERVICE).verbose(cli.verbose);
    if let Some(path) = &cli.config {
        builder = builder.config_path(path);
    }
    let App { settings, .. } = builder.build()?;

    let mut config = settings.config;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    if let Some(url) = &cli.rpc_url {
        config.ledger.endpoint = url.clone();
    }
    Ok(config)
}

async fn snapshot(
    mut config: RewardSyncConfig,
    output: Option<PathBuf>,
    no_onchain: bool,
) -> Result<(), AppError> {
    if let Some(output) = output {
        config.snapshot.output = output;
    }
    if no_onchain {
        config.snapshot.onchain_enrichment = false;
    }

    let plan = config.snapshot_plan()?;
    let summary = run_snapshot(&plan).await?;
    println!("{summary}");
    Ok(())
}

async fn claim(config: RewardSyncConfig, inputs: ClaimInputs) -> Result<(), AppError> {
    let plan = config.claim_plan(&inputs)?;
    info!(
        accounts = plan.accounts.len(),
        period = %plan.period,
        dry_run = plan.dry_run,
        "starting claim run"
    );

    let outcomes = run_claim(plan, |raw, outcome| println!("{raw}\t{outcome}")).await?;
    println!("{}", ClaimReport::from_outcomes(&outcomes));
    Ok(())
}

// ==================== MAIN ====================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Snapshot { output, no_onchain } => snapshot(config, output, no_onchain).await,
        Commands::Claim {
            accounts,
            accounts_file,
            from_snapshot,
            period,
            throttle_ms,
            dry_run,
        } => {
            let mut config = config;
            if let Some(path) = accounts_file {
                config.claim.accounts_file = Some(path);
            }
            if let Some(period) = period {
                config.claim.period = period;
            }
            if let Some(ms) = throttle_ms {
                config.claim.throttle_ms = ms;
            }
            let inputs = ClaimInputs {
                accounts,
                snapshot: from_snapshot,
                dry_run,
            };
            claim(config, inputs).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
