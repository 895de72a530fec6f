//! ABI bindings and call builders for the reward contracts.
//!
//! Only the functions this tool touches are declared.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::debug;

use crate::{LedgerClient, LedgerError, Result};

sol! {
    /// Per-period reward pool that contributors claim from.
    interface IContributorReward {
        function claimReward(string period, address token) external;
        function claimable(string period, address token, address account) external view returns (uint256);
    }

    /// Governance-fed points ledger the snapshot is prepared for.
    interface INodeRewards {
        function boundNodeCount(address wallet) external view returns (uint256);
    }
}

/// Calldata for `claimable(period, token, account)`.
pub fn claimable_calldata(period: &str, token: Address, account: Address) -> Bytes {
    IContributorReward::claimableCall {
        period: period.to_string(),
        token,
        account,
    }
    .abi_encode()
    .into()
}

/// Calldata for `claimReward(period, token)`.
pub fn claim_reward_calldata(period: &str, token: Address) -> Bytes {
    IContributorReward::claimRewardCall {
        period: period.to_string(),
        token,
    }
    .abi_encode()
    .into()
}

/// Calldata for `boundNodeCount(wallet)`.
pub fn bound_node_count_calldata(wallet: Address) -> Bytes {
    INodeRewards::boundNodeCountCall { wallet }.abi_encode().into()
}

/// Amount `account` can claim for `period` in `token`.
pub async fn claimable<L: LedgerClient + ?Sized>(
    ledger: &L,
    contract: Address,
    period: &str,
    token: Address,
    account: Address,
) -> Result<U256> {
    let data = ledger
        .call(contract, claimable_calldata(period, token, account))
        .await?;
    debug!(%account, returned = data.len(), "claimable returned");
    IContributorReward::claimableCall::abi_decode_returns(&data).map_err(|e| {
        LedgerError::Decode {
            what: "claimable",
            reason: e.to_string(),
        }
    })
}

/// Number of nodes bound to `wallet` on the NodeRewards contract.
pub async fn bound_node_count<L: LedgerClient + ?Sized>(
    ledger: &L,
    contract: Address,
    wallet: Address,
) -> Result<U256> {
    let data = ledger
        .call(contract, bound_node_count_calldata(wallet))
        .await?;
    INodeRewards::boundNodeCountCall::abi_decode_returns(&data).map_err(|e| LedgerError::Decode {
        what: "boundNodeCount",
        reason: e.to_string(),
    })
}
