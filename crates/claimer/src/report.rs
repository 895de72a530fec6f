//! Per-run tallies of claim outcomes, printed as the closing summary line.

use std::fmt;

use rewardsync_core::ClaimOutcome;
use serde::Serialize;

/// Tallies of one claim run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClaimReport {
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ClaimReport {
    pub fn from_outcomes(outcomes: &[ClaimOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut report, outcome| {
            match outcome {
                ClaimOutcome::Submitted(_) => report.submitted += 1,
                ClaimOutcome::Skipped(_) => report.skipped += 1,
                ClaimOutcome::Failed(_) => report.failed += 1,
            }
            report
        })
    }

    pub fn total(&self) -> usize {
        self.submitted + self.skipped + self.failed
    }
}

impl fmt::Display for ClaimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} submitted={} skipped={} failed={}",
            self.total(),
            self.submitted,
            self.skipped,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use rewardsync_core::SkipReason;

    #[test]
    fn test_tallies() {
        let report = ClaimReport::from_outcomes(&[
            ClaimOutcome::Submitted(B256::ZERO),
            ClaimOutcome::Skipped(SkipReason::ZeroEntitlement),
            ClaimOutcome::Skipped(SkipReason::QueryFailed),
            ClaimOutcome::invalid_address(),
        ]);
        assert_eq!(report.submitted, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.to_string(), "processed=4 submitted=1 skipped=2 failed=1");
    }
}
