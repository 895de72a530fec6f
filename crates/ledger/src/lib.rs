//! RewardSync Ledger
//!
//! Client-side access to the remote EVM ledger: the [`LedgerClient`] seam,
//! its JSON-RPC implementation, a dry-run decorator, ABI bindings for the
//! reward contracts, and local EIP-1559 signing.
//!
//! This crate does NOT implement any contract. It only builds calls against
//! them and moves bytes over RPC.

pub mod contract;
pub mod dry_run;
pub mod rpc;
pub mod signer;

pub use contract::{bound_node_count, claim_reward_calldata, claimable};
pub use dry_run::DryRunLedger;
pub use rpc::JsonRpcLedger;
pub use signer::{ClaimSigner, FeeParams, SignedTransaction};

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
    #[error("rpc {method} failed: {reason}")]
    Rpc { method: &'static str, reason: String },
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
    #[error("signing failed: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Narrow view of the ledger the engines are allowed to use.
///
/// Every method is a single request/response. Implementations must not
/// retry, batch or reorder calls.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read-only contract call against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Chain id used for EIP-155 replay protection.
    async fn chain_id(&self) -> Result<u64>;

    /// Next sequence number (nonce) for `account`, including pending transactions.
    async fn sequence_number(&self, account: Address) -> Result<u64>;

    /// Broadcast a signed, EIP-2718 encoded transaction and return its hash.
    async fn submit_raw(&self, raw: Bytes) -> Result<B256>;
}

#[async_trait::async_trait]
impl<L: LedgerClient + ?Sized> LedgerClient for Arc<L> {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        (**self).call(to, data).await
    }

    async fn chain_id(&self) -> Result<u64> {
        (**self).chain_id().await
    }

    async fn sequence_number(&self, account: Address) -> Result<u64> {
        (**self).sequence_number(account).await
    }

    async fn submit_raw(&self, raw: Bytes) -> Result<B256> {
        (**self).submit_raw(raw).await
    }
}
