//! Claim targets and the per-account outcome of a claim run.

use std::fmt;

use alloy_primitives::{Address, B256};

use crate::Account;

/// Reason attached to `Failed` when an input line is not an address.
pub const INVALID_ADDRESS: &str = "invalid-address";

/// One account to claim for, in one distribution period, in one payout token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimTarget {
    pub account: Account,
    /// Must equal the ledger's period string exactly.
    pub period: String,
    pub reward_token: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    ZeroEntitlement,
    QueryFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroEntitlement => "zero-entitlement",
            Self::QueryFailed => "query-failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one input account.
///
/// `Submitted` means the ledger accepted the transaction into its pool, not
/// that it has been mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Skipped(SkipReason),
    Submitted(B256),
    Failed(String),
}

impl ClaimOutcome {
    pub fn invalid_address() -> Self {
        Self::Failed(INVALID_ADDRESS.to_string())
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped({reason})"),
            Self::Submitted(hash) => write!(f, "submitted({hash})"),
            Self::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}
