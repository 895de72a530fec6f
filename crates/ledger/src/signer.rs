//! Local transaction signing.
//!
//! The private key stays in process memory. Only the signed, encoded
//! transaction leaves this module.

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy_primitives::{keccak256, Address, Bytes, TxKind, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result};

const GWEI: u128 = 1_000_000_000;

/// Fixed gas budget and EIP-1559 fee caps applied to every claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeParams {
    pub gas_limit: u64,
    pub max_fee_per_gas_wei: u128,
    pub max_priority_fee_per_gas_wei: u128,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            gas_limit: 400_000,
            max_fee_per_gas_wei: 3 * GWEI,
            max_priority_fee_per_gas_wei: GWEI,
        }
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: B256,
    pub nonce: u64,
}

/// secp256k1 signer for claim transactions.
pub struct ClaimSigner {
    inner: PrivateKeySigner,
}

impl ClaimSigner {
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self> {
        let inner = PrivateKeySigner::from_slice(secret)
            .map_err(|e| LedgerError::Signing(format!("invalid private key: {e}")))?;
        Ok(Self { inner })
    }

    /// Account that pays for and sends the claims.
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Build and sign an EIP-1559 contract call with zero value.
    pub fn sign_call(
        &self,
        chain_id: u64,
        nonce: u64,
        to: Address,
        input: Bytes,
        fees: &FeeParams,
    ) -> Result<SignedTransaction> {
        let tx = TxEip1559 {
            chain_id,
            nonce,
            gas_limit: fees.gas_limit,
            max_fee_per_gas: fees.max_fee_per_gas_wei,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas_wei,
            to: TxKind::Call(to),
            value: U256::ZERO,
            access_list: Default::default(),
            input,
        };

        let signature = self
            .inner
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| LedgerError::Signing(e.to_string()))?;
        let envelope = TxEnvelope::from(tx.into_signed(signature));
        let raw = envelope.encoded_2718();
        let hash = keccak256(&raw);

        Ok(SignedTransaction {
            raw: raw.into(),
            hash,
            nonce,
        })
    }
}

impl std::fmt::Debug for ClaimSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::claim_reward_calldata;

    // Hardhat/Anvil development account #0.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn dev_signer() -> ClaimSigner {
        let secret: [u8; 32] = hex::decode(DEV_KEY).unwrap().try_into().unwrap();
        ClaimSigner::from_secret_bytes(&secret).unwrap()
    }

    #[test]
    fn test_address_from_known_key() {
        assert_eq!(dev_signer().address().to_checksum(None), DEV_ADDRESS);
    }

    #[test]
    fn test_zero_key_rejected() {
        assert!(matches!(
            ClaimSigner::from_secret_bytes(&[0u8; 32]),
            Err(LedgerError::Signing(_))
        ));
    }

    #[test]
    fn test_default_fees() {
        let fees = FeeParams::default();
        assert_eq!(fees.gas_limit, 400_000);
        assert_eq!(fees.max_fee_per_gas_wei, 3_000_000_000);
        assert_eq!(fees.max_priority_fee_per_gas_wei, 1_000_000_000);
    }

    #[test]
    fn test_signed_call_is_typed_and_hashed() {
        let signer = dev_signer();
        let input = claim_reward_calldata("2026-01", Address::repeat_byte(0x22));
        let signed = signer
            .sign_call(11155111, 7, Address::repeat_byte(0x33), input, &FeeParams::default())
            .unwrap();

        assert_eq!(signed.raw[0], 0x02, "EIP-1559 type byte");
        assert_eq!(signed.hash, keccak256(&signed.raw));
        assert_eq!(signed.nonce, 7);
    }

    #[test]
    fn test_nonce_changes_hash() {
        let signer = dev_signer();
        let to = Address::repeat_byte(0x33);
        let input = claim_reward_calldata("2026-01", Address::repeat_byte(0x22));
        let fees = FeeParams::default();
        let a = signer.sign_call(1, 0, to, input.clone(), &fees).unwrap();
        let b = signer.sign_call(1, 1, to, input, &fees).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", dev_signer());
        assert!(!rendered.contains("ac0974"));
        assert!(rendered.contains("ClaimSigner"));
    }
}
