//! Reading and writing the snapshot artifact.

use std::fs;
use std::io::Write;
use std::path::Path;

use rewardsync_core::AllocationSnapshot;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{AggregatorError, Result};

/// Write `snapshot` as pretty-printed JSON.
///
/// The file is written to a sibling temp file and renamed into place, so a
/// reader never observes a partial artifact.
pub fn write_snapshot(path: &Path, snapshot: &AllocationSnapshot) -> Result<()> {
    let write_err = |reason: String| AggregatorError::Write {
        path: path.display().to_string(),
        reason,
    };

    let mut json = serde_json::to_string_pretty(snapshot).map_err(|e| write_err(e.to_string()))?;
    json.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    tmp.write_all(json.as_bytes())
        .map_err(|e| write_err(e.to_string()))?;
    tmp.flush().map_err(|e| write_err(e.to_string()))?;
    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;

    let summary = snapshot.summary();
    info!(
        path = %path.display(),
        wallets = summary.wallets,
        total_dev = %summary.total_dev,
        total_node = %summary.total_node,
        "snapshot written"
    );
    Ok(())
}

/// Load a snapshot artifact and check its column invariants.
pub fn read_snapshot(path: &Path) -> Result<AllocationSnapshot> {
    let text = fs::read_to_string(path).map_err(|e| AggregatorError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let invalid = |reason: String| AggregatorError::InvalidSnapshot {
        path: path.display().to_string(),
        reason,
    };
    let snapshot: AllocationSnapshot =
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
    snapshot.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(snapshot)
}
