//! Claim submitter: entitlement queries and signed `claimReward` submissions
//! through a [`LedgerClient`].

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use rewardsync_core::ClaimTarget;
use rewardsync_ledger::{
    claim_reward_calldata, claimable, ClaimSigner, FeeParams, LedgerClient,
    Result as LedgerResult,
};
use tracing::{debug, info};

use crate::{ClaimError, Result};

pub struct ClaimSubmitter {
    ledger: Arc<dyn LedgerClient>,
    signer: ClaimSigner,
    /// ContributorReward contract address.
    contract: Address,
    fees: FeeParams,
    chain_id: u64,
}

impl ClaimSubmitter {
    /// Resolve the chain id (configured, or one `eth_chainId` call) and bind
    /// the signer to it.
    pub async fn connect(
        ledger: Arc<dyn LedgerClient>,
        signer: ClaimSigner,
        contract: Address,
        fees: FeeParams,
        chain_id: Option<u64>,
    ) -> Result<Self> {
        let chain_id = match chain_id {
            Some(id) => id,
            None => ledger.chain_id().await.map_err(ClaimError::ChainId)?,
        };
        info!(
            chain_id,
            signer = %signer.address(),
            %contract,
            gas_limit = fees.gas_limit,
            "claim submitter ready"
        );
        Ok(Self {
            ledger,
            signer,
            contract,
            fees,
            chain_id,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Read-only `claimable(period, token, account)`.
    pub async fn query_entitlement(&self, target: &ClaimTarget) -> LedgerResult<U256> {
        claimable(
            self.ledger.as_ref(),
            self.contract,
            &target.period,
            target.reward_token,
            target.account.address(),
        )
        .await
    }

    /// Sign and broadcast `claimReward(period, token)`.
    ///
    /// The nonce is fetched from the ledger on every call and never cached.
    pub async fn submit_claim(&self, target: &ClaimTarget) -> LedgerResult<B256> {
        let nonce = self.ledger.sequence_number(self.signer.address()).await?;
        let input = claim_reward_calldata(&target.period, target.reward_token);
        let signed = self
            .signer
            .sign_call(self.chain_id, nonce, self.contract, input, &self.fees)?;
        debug!(account = %target.account, nonce, local_hash = %signed.hash, "signed claim");

        self.ledger.submit_raw(signed.raw).await
    }
}
