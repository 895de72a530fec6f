//! Contribution collector: validates points tables, looks up on-chain bound
//! node counts, and merges both tables into one record per account.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use rewardsync_core::{Account, ContributionRecord};
use rewardsync_ledger::{bound_node_count, LedgerClient};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{AggregatorError, Result};

/// Ordered `account → points` table.
///
/// Entries keep their source order and are not collapsed. Two keys that
/// differ only in letter case are both kept, and [`PointsTable::get`] returns
/// the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsTable {
    name: String,
    entries: Vec<(Account, u64)>,
}

impl PointsTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Build from already-typed pairs; account keys are still validated.
    pub fn from_pairs<'a, I>(name: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut table = Self::new(name);
        for (raw, points) in pairs {
            table.push(raw, points)?;
        }
        Ok(table)
    }

    /// Build from a JSON object in the settings file, preserving key order.
    pub fn from_json(name: &str, object: &Map<String, Value>) -> Result<Self> {
        let mut table = Self::new(name);
        for (raw, value) in object {
            let points = value.as_u64().ok_or_else(|| AggregatorError::InvalidPoints {
                table: name.to_string(),
                account: raw.clone(),
                value: value.to_string(),
            })?;
            table.push(raw, points)?;
        }
        Ok(table)
    }

    /// Parse `address,points` lines. Blank lines, `#` comments and an
    /// `address,...` header are ignored.
    pub fn from_csv(name: &str, text: &str) -> Result<Self> {
        let mut table = Self::new(name);
        let mut first_row = true;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(',').map(str::trim);
            let raw = fields.next().unwrap_or_default();
            let value = fields.next().ok_or_else(|| AggregatorError::MalformedLine {
                table: name.to_string(),
                line: line_no,
                reason: "expected `address,points`".to_string(),
            })?;
            if fields.next().is_some() {
                return Err(AggregatorError::MalformedLine {
                    table: name.to_string(),
                    line: line_no,
                    reason: "too many columns".to_string(),
                });
            }
            if std::mem::take(&mut first_row) && raw.eq_ignore_ascii_case("address") {
                continue;
            }
            let points = value.parse::<u64>().map_err(|_| AggregatorError::InvalidPoints {
                table: name.to_string(),
                account: raw.to_string(),
                value: value.to_string(),
            })?;
            table.push(raw, points)?;
        }
        Ok(table)
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AggregatorError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_csv(&path.display().to_string(), &text)
    }

    fn push(&mut self, raw: &str, points: u64) -> Result<()> {
        if raw.trim().is_empty() {
            warn!(table = %self.name, "ignoring blank account key");
            return Ok(());
        }
        let account = Account::parse(raw).map_err(|_| AggregatorError::InvalidAccount {
            table: self.name.clone(),
            raw: raw.to_string(),
        })?;
        self.entries.push((account, points));
        Ok(())
    }

    /// Append another table's entries after this one's.
    pub fn extend(&mut self, other: PointsTable) {
        self.entries.extend(other.entries);
    }

    /// Points for the first entry with this canonical account.
    pub fn get(&self, account: &Account) -> Option<u64> {
        self.entries
            .iter()
            .find(|(a, _)| a == account)
            .map(|&(_, points)| points)
    }

    /// Accounts in source order, duplicates included.
    pub fn accounts(&self) -> impl Iterator<Item = Account> + '_ {
        self.entries.iter().map(|&(account, _)| account)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-chain `boundNodeCount` per account. Missing accounts read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundCounts(HashMap<Account, u64>);

impl BoundCounts {
    pub fn get(&self, account: &Account) -> u64 {
        self.0.get(account).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, account: Account, count: u64) {
        self.0.insert(account, count);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Distinct accounts, dev table first, then node-only accounts.
fn candidate_order(dev: &PointsTable, node: &PointsTable) -> Vec<Account> {
    let mut seen = HashSet::new();
    dev.accounts()
        .chain(node.accounts())
        .filter(|account| seen.insert(*account))
        .collect()
}

/// One record per distinct canonical account appearing in either table.
///
/// Zero-point accounts are kept here; filtering is the snapshot's job.
pub fn merge_records(
    dev: &PointsTable,
    node: &PointsTable,
    bounds: &BoundCounts,
) -> Vec<ContributionRecord> {
    candidate_order(dev, node)
        .into_iter()
        .map(|account| {
            ContributionRecord::new(
                account,
                dev.get(&account).unwrap_or(0),
                node.get(&account).unwrap_or(0),
            )
            .with_bound_node_count(bounds.get(&account))
        })
        .collect()
}

/// Looks up optional on-chain data for the accounts in the points tables.
///
/// Enrichment is best-effort. Every failure degrades to a count of 0 and is
/// never returned as an error.
pub struct ContributionCollector {
    ledger: Option<Arc<dyn LedgerClient>>,
    node_rewards: Option<Address>,
}

impl ContributionCollector {
    /// Collector that never touches the network.
    pub fn offline() -> Self {
        Self {
            ledger: None,
            node_rewards: None,
        }
    }

    pub fn new(ledger: Arc<dyn LedgerClient>, node_rewards: Option<Address>) -> Self {
        Self {
            ledger: Some(ledger),
            node_rewards,
        }
    }

    /// Query `boundNodeCount` once per distinct account.
    pub async fn collect_bounds(&self, dev: &PointsTable, node: &PointsTable) -> BoundCounts {
        let mut bounds = BoundCounts::default();

        let (ledger, contract) = match (&self.ledger, self.node_rewards) {
            (Some(ledger), Some(contract)) => (ledger, contract),
            _ => {
                debug!("on-chain enrichment disabled, bound node counts default to 0");
                return bounds;
            }
        };

        if let Err(e) = ledger.chain_id().await {
            warn!(error = %e, "ledger unreachable, bound node counts default to 0");
            return bounds;
        }

        let accounts = candidate_order(dev, node);
        for account in &accounts {
            match bound_node_count(ledger.as_ref(), contract, account.address()).await {
                Ok(count) => {
                    bounds.insert(*account, clamp_u64(count));
                }
                Err(e) => {
                    warn!(%account, error = %e, "boundNodeCount lookup failed, using 0");
                }
            }
        }

        info!(
            accounts = accounts.len(),
            resolved = bounds.len(),
            "collected on-chain bound node counts"
        );
        bounds
    }
}

fn clamp_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.to::<u64>()
    }
}
