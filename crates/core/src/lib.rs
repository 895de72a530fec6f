//! RewardSync Core
//!
//! Types shared by every RewardSync crate: canonical accounts, contribution
//! records, the allocation snapshot handed to governance, and per-account
//! claim outcomes.

pub mod account;
pub mod claim;
pub mod snapshot;

pub use account::Account;
pub use claim::{ClaimOutcome, ClaimTarget, SkipReason, INVALID_ADDRESS};
pub use snapshot::{AllocationSnapshot, ContributionRecord, SnapshotSummary};

pub use alloy_primitives::{Address, B256, U256};

use thiserror::Error;

/// Errors raised while validating core values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid account address: {0:?}")]
    InvalidAccount(String),
    #[error("snapshot columns misaligned: wallets={wallets}, devAmounts={dev}, nodeAmounts={node}, raw={raw}")]
    MisalignedSnapshot {
        wallets: usize,
        dev: usize,
        node: usize,
        raw: usize,
    },
    #[error("snapshot row {index} disagrees with raw record for {wallet}")]
    RowMismatch { index: usize, wallet: String },
    #[error("duplicate wallet in snapshot: {0}")]
    DuplicateWallet(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
