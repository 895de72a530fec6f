//! The two top-level runs, wired from validated plans.

use std::sync::Arc;

use rewardsync_aggregator::{generate_snapshot, write_snapshot, ContributionCollector};
use rewardsync_claimer::{ClaimOrchestrator, ClaimSubmitter};
use rewardsync_core::{ClaimOutcome, SnapshotSummary};
use rewardsync_ledger::{DryRunLedger, LedgerClient};
use tracing::{info, warn};

use crate::{AppError, ClaimPlan, SnapshotPlan};

/// Build the allocation snapshot and write the artifact.
///
/// Enrichment problems, including an unusable endpoint, only downgrade the
/// run to offline mode.
pub async fn run_snapshot(plan: &SnapshotPlan) -> Result<SnapshotSummary, AppError> {
    let collector = match (plan.onchain_enrichment, plan.node_rewards) {
        (true, Some(node_rewards)) => match plan.ledger.connect() {
            Ok(ledger) => ContributionCollector::new(Arc::new(ledger), Some(node_rewards)),
            Err(e) => {
                warn!(error = %e, "ledger client unavailable, skipping enrichment");
                ContributionCollector::offline()
            }
        },
        _ => ContributionCollector::offline(),
    };

    let snapshot = generate_snapshot(&collector, &plan.dev, &plan.node).await;
    write_snapshot(&plan.output, &snapshot)?;
    Ok(snapshot.summary())
}

/// Run the claim loop, reporting each outcome through `on_outcome` as soon as
/// it is known.
///
/// Only startup problems are returned as errors. Per-account problems are in
/// the outcome list.
pub async fn run_claim<F>(plan: ClaimPlan, on_outcome: F) -> Result<Vec<ClaimOutcome>, AppError>
where
    F: FnMut(&str, &ClaimOutcome),
{
    let rpc: Arc<dyn LedgerClient> = Arc::new(plan.ledger.connect()?);
    let ledger: Arc<dyn LedgerClient> = if plan.dry_run {
        info!("dry run: transactions are signed but not broadcast");
        Arc::new(DryRunLedger::new(rpc))
    } else {
        rpc
    };

    let submitter =
        ClaimSubmitter::connect(ledger, plan.signer, plan.contract, plan.fees, plan.chain_id)
            .await?;
    let orchestrator = ClaimOrchestrator::new(submitter).with_throttle(plan.throttle);

    Ok(orchestrator
        .run_with(&plan.accounts, &plan.period, plan.reward_token, on_outcome)
        .await)
}
