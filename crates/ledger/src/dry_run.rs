//! Dry-run decorator: reads hit the real ledger, submissions are recorded
//! locally and never broadcast.
//!
//! Recorded submissions still advance the nonce that `sequence_number`
//! reports, so consecutive signed transactions stay distinct. A dry-run
//! ledger is driven by a single signer.

use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{keccak256, Address, Bytes, B256};
use tracing::{info, warn};

use crate::{LedgerClient, Result};

pub struct DryRunLedger {
    inner: Arc<dyn LedgerClient>,
    submissions: Mutex<Vec<Bytes>>,
}

impl DryRunLedger {
    pub fn new(inner: Arc<dyn LedgerClient>) -> Self {
        Self {
            inner,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Raw transactions that would have been broadcast, in order.
    pub fn submissions(&self) -> Vec<Bytes> {
        self.recorded().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.recorded().len()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<Bytes>> {
        self.submissions.lock().unwrap_or_else(|poisoned| {
            warn!("dry-run submission log was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait::async_trait]
impl LedgerClient for DryRunLedger {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.inner.call(to, data).await
    }

    async fn chain_id(&self) -> Result<u64> {
        self.inner.chain_id().await
    }

    async fn sequence_number(&self, account: Address) -> Result<u64> {
        let onchain = self.inner.sequence_number(account).await?;
        Ok(onchain + self.submission_count() as u64)
    }

    async fn submit_raw(&self, raw: Bytes) -> Result<B256> {
        let hash = keccak256(&raw);
        info!(tx = %hash, len = raw.len(), "dry-run: recorded transaction");
        self.recorded().push(raw);
        Ok(hash)
    }
}
