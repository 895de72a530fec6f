//! Sequential claim loop.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use rewardsync_core::{Account, ClaimOutcome, ClaimTarget, SkipReason};
use tokio::time;
use tracing::{error, info, warn};

use crate::report::ClaimReport;
use crate::submitter::ClaimSubmitter;

/// Pause between two consecutive accounts.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(3000);

/// Runs the per-account claim state machine over an account list.
pub struct ClaimOrchestrator {
    submitter: ClaimSubmitter,
    throttle: Duration,
}

impl ClaimOrchestrator {
    pub fn new(submitter: ClaimSubmitter) -> Self {
        Self {
            submitter,
            throttle: DEFAULT_THROTTLE,
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Process every account in order and return one outcome per input.
    pub async fn run(
        &self,
        accounts: &[String],
        period: &str,
        reward_token: Address,
    ) -> Vec<ClaimOutcome> {
        self.run_with(accounts, period, reward_token, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_outcome` with the raw input line
    /// as soon as each account is done.
    pub async fn run_with<F>(
        &self,
        accounts: &[String],
        period: &str,
        reward_token: Address,
        mut on_outcome: F,
    ) -> Vec<ClaimOutcome>
    where
        F: FnMut(&str, &ClaimOutcome),
    {
        info!(
            accounts = accounts.len(),
            period,
            %reward_token,
            throttle_ms = self.throttle.as_millis() as u64,
            "claim run starting"
        );

        let mut outcomes = Vec::with_capacity(accounts.len());
        for (i, raw) in accounts.iter().enumerate() {
            let outcome = self.process(raw, period, reward_token).await;
            on_outcome(raw, &outcome);
            outcomes.push(outcome);

            if i + 1 < accounts.len() && !self.throttle.is_zero() {
                time::sleep(self.throttle).await;
            }
        }

        info!(report = %ClaimReport::from_outcomes(&outcomes), "claim run finished");
        outcomes
    }

    async fn process(&self, raw: &str, period: &str, reward_token: Address) -> ClaimOutcome {
        let account = match Account::parse(raw) {
            Ok(account) => account,
            Err(e) => {
                warn!(input = raw, error = %e, "skipping malformed account");
                return ClaimOutcome::invalid_address();
            }
        };
        let target = ClaimTarget {
            account,
            period: period.to_string(),
            reward_token,
        };

        let entitlement = match self.submitter.query_entitlement(&target).await {
            Ok(amount) => amount,
            Err(e) => {
                warn!(%account, error = %e, "entitlement query failed");
                return ClaimOutcome::Skipped(SkipReason::QueryFailed);
            }
        };

        if entitlement == U256::ZERO {
            info!(%account, "nothing to claim");
            return ClaimOutcome::Skipped(SkipReason::ZeroEntitlement);
        }
        info!(%account, %entitlement, "claiming");

        match self.submitter.submit_claim(&target).await {
            Ok(hash) => {
                info!(%account, tx = %hash, "claim submitted");
                ClaimOutcome::Submitted(hash)
            }
            Err(e) => {
                error!(%account, error = %e, "claim submission failed");
                ClaimOutcome::Failed(e.to_string())
            }
        }
    }
}
