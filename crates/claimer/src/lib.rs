//! RewardSync Claimer
//!
//! Walks an ordered account list, checks each account's entitlement on the
//! ContributorReward contract and submits `claimReward` for the non-zero ones.
//!
//! Accounts are processed strictly one after another through a single
//! signing identity. A failure on one account is recorded as that account's
//! [`ClaimOutcome`](rewardsync_core::ClaimOutcome) and never aborts the run.

pub mod orchestrator;
pub mod report;
pub mod submitter;
#[cfg(test)]
mod tests;

pub use orchestrator::{ClaimOrchestrator, DEFAULT_THROTTLE};
pub use report::ClaimReport;
pub use submitter::ClaimSubmitter;

use rewardsync_ledger::LedgerError;
use thiserror::Error;

/// Errors that stop a claim run before the first account is processed.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("could not determine chain id: {0}")]
    ChainId(#[source] LedgerError),
}

pub type Result<T> = std::result::Result<T, ClaimError>;
