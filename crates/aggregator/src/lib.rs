//! RewardSync Aggregator
//!
//! Merges the developer and node points tables into one record per account,
//! optionally enriches them with on-chain bound-node counts, and builds the
//! deduplicated allocation snapshot that is handed to the governance
//! `allocatePoints` call.

pub mod artifact;
pub mod collector;
pub mod snapshot;

pub use artifact::{read_snapshot, write_snapshot};
pub use collector::{merge_records, BoundCounts, ContributionCollector, PointsTable};
pub use snapshot::{generate_snapshot, SnapshotBuilder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("{table}: invalid account {raw:?}")]
    InvalidAccount { table: String, raw: String },
    #[error("{table}: points for {account} must be a non-negative integer, got {value}")]
    InvalidPoints {
        table: String,
        account: String,
        value: String,
    },
    #[error("{table}:{line}: {reason}")]
    MalformedLine {
        table: String,
        line: usize,
        reason: String,
    },
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("failed to write snapshot {path}: {reason}")]
    Write { path: String, reason: String },
    #[error("snapshot {path} is invalid: {reason}")]
    InvalidSnapshot { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
