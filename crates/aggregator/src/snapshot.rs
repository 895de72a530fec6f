//! Snapshot builder: filters merged records down to the accounts that carry
//! an allocation and projects them into the `allocatePoints` columns.

use rewardsync_core::{AllocationSnapshot, ContributionRecord};
use tracing::{debug, info};

use crate::collector::{merge_records, BoundCounts, ContributionCollector, PointsTable};

/// Builds [`AllocationSnapshot`]s from the two points tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic for identical inputs: dev-table accounts first in table
    /// order, then node-only accounts in table order. Accounts with no points
    /// in either table are dropped.
    pub fn build(
        &self,
        dev: &PointsTable,
        node: &PointsTable,
        bounds: &BoundCounts,
    ) -> AllocationSnapshot {
        let merged = merge_records(dev, node, bounds);
        let candidates = merged.len();

        let records: Vec<ContributionRecord> = merged
            .into_iter()
            .filter(|record| {
                let keep = record.has_points();
                if !keep {
                    debug!(account = %record.account, "dropping account with zero points");
                }
                keep
            })
            .collect();

        debug!(candidates, kept = records.len(), "filtered contribution records");
        AllocationSnapshot::from_records(records)
    }
}

/// Collect optional on-chain counts and build the snapshot in one step.
pub async fn generate_snapshot(
    collector: &ContributionCollector,
    dev: &PointsTable,
    node: &PointsTable,
) -> AllocationSnapshot {
    info!(
        dev_entries = dev.len(),
        node_entries = node.len(),
        "generating allocation snapshot"
    );
    let bounds = collector.collect_bounds(dev, node).await;
    SnapshotBuilder::new().build(dev, node, &bounds)
}
