//! RewardSync configuration and its validation into run plans.
//!
//! `RewardSyncConfig` is what lives in `settings.json`. It is loosely typed
//! (addresses are strings, tables are raw JSON) so a half-filled file still
//! loads. The `*_plan` methods turn it into fully validated inputs and report
//! every problem as [`AppError::Config`] before any network I/O happens.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::Address;
use rewardsync_aggregator::{read_snapshot, PointsTable};
use rewardsync_core::Account;
use rewardsync_keystore::{load_signing_key_with, KeySource};
use rewardsync_ledger::{ClaimSigner, FeeParams, JsonRpcLedger};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::AppError;

pub const DEFAULT_ENDPOINT: &str = "https://ethereum-sepolia.publicnode.com";
pub const DEFAULT_PERIOD: &str = "2026-01";
pub const DEFAULT_OUTPUT: &str = "snapshot.json";

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_NODE_REWARDS_ADDRESS: &str = "NODE_REWARDS_ADDRESS";
pub const ENV_CONTRIBUTOR_REWARD_ADDRESS: &str = "CONTRIBUTOR_REWARD_ADDRESS";
pub const ENV_REWARD_TOKEN_ADDRESS: &str = "REWARD_TOKEN_ADDRESS";
pub const ENV_PERIOD: &str = "PERIOD";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSyncConfig {
    pub ledger: LedgerSettings,
    pub snapshot: SnapshotSettings,
    pub claim: ClaimSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    /// Queried with `eth_chainId` when unset.
    pub chain_id: Option<u64>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            chain_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// NodeRewards contract used for `boundNodeCount` enrichment.
    pub node_rewards_address: Option<String>,
    pub dev_points: Map<String, Value>,
    pub node_points: Map<String, Value>,
    /// CSV of `address,points`, appended after `dev_points`.
    pub dev_points_file: Option<PathBuf>,
    /// CSV of `address,points`, appended after `node_points`.
    pub node_points_file: Option<PathBuf>,
    pub output: PathBuf,
    pub onchain_enrichment: bool,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            node_rewards_address: None,
            dev_points: Map::new(),
            node_points: Map::new(),
            dev_points_file: None,
            node_points_file: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            onchain_enrichment: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimSettings {
    pub contributor_reward_address: Option<String>,
    pub reward_token: Option<String>,
    pub period: String,
    pub accounts: Vec<String>,
    /// One address per line, `#` starts a comment line.
    pub accounts_file: Option<PathBuf>,
    pub signing_key: KeySource,
    pub throttle_ms: u64,
    pub gas: FeeParams,
}

impl Default for ClaimSettings {
    fn default() -> Self {
        Self {
            contributor_reward_address: None,
            reward_token: None,
            period: DEFAULT_PERIOD.to_string(),
            accounts: Vec::new(),
            accounts_file: None,
            signing_key: KeySource::default(),
            throttle_ms: 3000,
            gas: FeeParams::default(),
        }
    }
}

impl RewardSyncConfig {
    /// Apply the environment variables the deployment scripts export.
    /// Unset or blank variables leave the file value alone.
    pub fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            env(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = var(ENV_RPC_URL) {
            debug!(var = ENV_RPC_URL, "overriding ledger.endpoint");
            self.ledger.endpoint = v;
        }
        if let Some(v) = var(ENV_NODE_REWARDS_ADDRESS) {
            self.snapshot.node_rewards_address = Some(v);
        }
        if let Some(v) = var(ENV_CONTRIBUTOR_REWARD_ADDRESS) {
            self.claim.contributor_reward_address = Some(v);
        }
        if let Some(v) = var(ENV_REWARD_TOKEN_ADDRESS) {
            self.claim.reward_token = Some(v);
        }
        if let Some(v) = var(ENV_PERIOD) {
            self.claim.period = v;
        }
    }

    fn ledger_plan(&self) -> Result<LedgerPlan, AppError> {
        let endpoint = self.ledger.endpoint.trim();
        if endpoint.is_empty() {
            return Err(config_error("ledger.endpoint is empty"));
        }
        Ok(LedgerPlan {
            endpoint: endpoint.to_string(),
            request_timeout: Duration::from_secs(self.ledger.request_timeout_secs.max(1)),
        })
    }

    /// Validate everything the `snapshot` command needs.
    pub fn snapshot_plan(&self) -> Result<SnapshotPlan, AppError> {
        let settings = &self.snapshot;

        let mut dev = PointsTable::from_json("snapshot.dev_points", &settings.dev_points)?;
        if let Some(path) = &settings.dev_points_file {
            dev.extend(PointsTable::load_csv(path)?);
        }
        let mut node = PointsTable::from_json("snapshot.node_points", &settings.node_points)?;
        if let Some(path) = &settings.node_points_file {
            node.extend(PointsTable::load_csv(path)?);
        }
        if dev.is_empty() && node.is_empty() {
            warn!("both points tables are empty, the snapshot will be empty");
        }

        let node_rewards = optional_address(
            "snapshot.node_rewards_address",
            settings.node_rewards_address.as_deref(),
        )?;

        Ok(SnapshotPlan {
            ledger: self.ledger_plan()?,
            node_rewards,
            onchain_enrichment: settings.onchain_enrichment,
            dev,
            node,
            output: settings.output.clone(),
        })
    }

    /// Validate everything the `claim` command needs, reading the signing
    /// key from the process environment.
    pub fn claim_plan(&self, inputs: &ClaimInputs) -> Result<ClaimPlan, AppError> {
        self.claim_plan_with(inputs, |name| std::env::var(name).ok())
    }

    /// Like [`claim_plan`](Self::claim_plan) with an injectable environment
    /// lookup for `KeySource::Env`.
    pub fn claim_plan_with<F>(&self, inputs: &ClaimInputs, env: F) -> Result<ClaimPlan, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = &self.claim;

        let contract = required_address(
            "claim.contributor_reward_address",
            ENV_CONTRIBUTOR_REWARD_ADDRESS,
            settings.contributor_reward_address.as_deref(),
        )?;
        let reward_token = required_address(
            "claim.reward_token",
            ENV_REWARD_TOKEN_ADDRESS,
            settings.reward_token.as_deref(),
        )?;

        let period = settings.period.trim().to_string();
        if period.is_empty() {
            return Err(config_error("claim.period is empty"));
        }

        let secret = load_signing_key_with(&settings.signing_key, env)?;
        let signer = ClaimSigner::from_secret_bytes(secret.as_bytes())?;

        let accounts = self.collect_accounts(inputs)?;
        if accounts.is_empty() {
            return Err(config_error("no accounts to claim for"));
        }

        Ok(ClaimPlan {
            ledger: self.ledger_plan()?,
            chain_id: self.ledger.chain_id,
            contract,
            reward_token,
            period,
            accounts,
            signer,
            throttle: Duration::from_millis(settings.throttle_ms),
            fees: settings.gas,
            dry_run: inputs.dry_run,
        })
    }

    /// Settings list, then `--account` flags, then the accounts file, then
    /// the wallets of a snapshot artifact. Nothing is deduplicated.
    fn collect_accounts(&self, inputs: &ClaimInputs) -> Result<Vec<String>, AppError> {
        let mut accounts = self.claim.accounts.clone();
        accounts.extend(inputs.accounts.iter().cloned());

        if let Some(path) = &self.claim.accounts_file {
            accounts.extend(read_account_lines(path)?);
        }
        if let Some(path) = &inputs.snapshot {
            let snapshot = read_snapshot(path)?;
            debug!(path = %path.display(), wallets = snapshot.len(), "claiming for snapshot wallets");
            accounts.extend(snapshot.wallets().iter().map(Account::to_checksum));
        }
        Ok(accounts)
    }
}

/// Command-line inputs to the claim plan that are not settings.
#[derive(Debug, Clone, Default)]
pub struct ClaimInputs {
    /// `--account` flags, in order.
    pub accounts: Vec<String>,
    /// Snapshot artifact whose wallets are appended to the account list.
    pub snapshot: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPlan {
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl LedgerPlan {
    pub fn connect(&self) -> Result<JsonRpcLedger, AppError> {
        Ok(JsonRpcLedger::connect(&self.endpoint, self.request_timeout)?)
    }
}

#[derive(Debug)]
pub struct SnapshotPlan {
    pub ledger: LedgerPlan,
    pub node_rewards: Option<Address>,
    pub onchain_enrichment: bool,
    pub dev: PointsTable,
    pub node: PointsTable,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct ClaimPlan {
    pub ledger: LedgerPlan,
    pub chain_id: Option<u64>,
    pub contract: Address,
    pub reward_token: Address,
    pub period: String,
    /// Raw input lines; malformed ones are reported per account at run time.
    pub accounts: Vec<String>,
    pub signer: ClaimSigner,
    pub throttle: Duration,
    pub fees: FeeParams,
    pub dry_run: bool,
}

fn config_error(msg: impl Into<String>) -> AppError {
    AppError::Config(msg.into())
}

fn parse_address(field: &str, raw: &str) -> Result<Address, AppError> {
    Account::parse(raw)
        .map(|account| account.address())
        .map_err(|_| config_error(format!("{field}: {raw:?} is not a valid address")))
}

fn optional_address(field: &str, raw: Option<&str>) -> Result<Option<Address>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_address(field, raw).map(Some),
    }
}

fn required_address(field: &str, env: &str, raw: Option<&str>) -> Result<Address, AppError> {
    optional_address(field, raw)?
        .ok_or_else(|| config_error(format!("{field} is not set (or export {env})")))
}

fn read_account_lines(path: &Path) -> Result<Vec<String>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| config_error(format!("failed to read {}: {e}", path.display())))?;
    Ok(parse_account_lines(&text))
}

/// Non-blank, non-comment lines, trimmed. Validation happens per account.
pub fn parse_account_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
