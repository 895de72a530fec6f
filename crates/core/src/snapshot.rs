//! Contribution records and the allocation snapshot artifact.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Account, CoreError};

/// Merged per-account contribution.
///
/// Field names on the wire follow the `raw` rows of the snapshot artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    #[serde(rename = "wallet")]
    pub account: Account,
    #[serde(rename = "devAmount")]
    pub dev_points: u64,
    #[serde(rename = "nodeAmount")]
    pub node_points: u64,
    #[serde(default)]
    pub bound_node_count: u64,
}

impl ContributionRecord {
    pub fn new(account: Account, dev_points: u64, node_points: u64) -> Self {
        Self {
            account,
            dev_points,
            node_points,
            bound_node_count: 0,
        }
    }

    pub fn with_bound_node_count(mut self, count: u64) -> Self {
        self.bound_node_count = count;
        self
    }

    /// Whether this record carries any allocation at all.
    pub fn has_points(&self) -> bool {
        self.dev_points > 0 || self.node_points > 0
    }
}

/// Allocation table in the shape `allocatePoints(wallets, devAmounts, nodeAmounts)`
/// expects, plus the full records for auditing.
///
/// The four columns are index-aligned; the only constructor enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSnapshot {
    wallets: Vec<Account>,
    dev_amounts: Vec<u64>,
    node_amounts: Vec<u64>,
    raw: Vec<ContributionRecord>,
}

impl AllocationSnapshot {
    /// Project already-filtered, already-deduplicated records into columns.
    pub fn from_records(records: Vec<ContributionRecord>) -> Self {
        Self {
            wallets: records.iter().map(|r| r.account).collect(),
            dev_amounts: records.iter().map(|r| r.dev_points).collect(),
            node_amounts: records.iter().map(|r| r.node_points).collect(),
            raw: records,
        }
    }

    pub fn wallets(&self) -> &[Account] {
        &self.wallets
    }

    pub fn dev_amounts(&self) -> &[u64] {
        &self.dev_amounts
    }

    pub fn node_amounts(&self) -> &[u64] {
        &self.node_amounts
    }

    pub fn raw(&self) -> &[ContributionRecord] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            wallets: self.wallets.len(),
            total_dev: self.dev_amounts.iter().map(|&v| v as u128).sum(),
            total_node: self.node_amounts.iter().map(|&v| v as u128).sum(),
        }
    }

    /// Check the column invariants of a snapshot read back from disk.
    pub fn validate(&self) -> crate::Result<()> {
        let (w, d, n, r) = (
            self.wallets.len(),
            self.dev_amounts.len(),
            self.node_amounts.len(),
            self.raw.len(),
        );
        if w != d || w != n || w != r {
            return Err(CoreError::MisalignedSnapshot {
                wallets: w,
                dev: d,
                node: n,
                raw: r,
            });
        }

        let mut seen = HashSet::with_capacity(w);
        for (index, record) in self.raw.iter().enumerate() {
            let wallet = self.wallets[index];
            if record.account != wallet
                || record.dev_points != self.dev_amounts[index]
                || record.node_points != self.node_amounts[index]
            {
                return Err(CoreError::RowMismatch {
                    index,
                    wallet: wallet.to_string(),
                });
            }
            if !seen.insert(wallet) {
                return Err(CoreError::DuplicateWallet(wallet.to_string()));
            }
        }
        Ok(())
    }
}

/// Totals reported after a snapshot is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub wallets: usize,
    pub total_dev: u128,
    pub total_node: u128,
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wallets={} total_dev={} total_node={}",
            self.wallets, self.total_dev, self.total_node
        )
    }
}
