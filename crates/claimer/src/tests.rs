//! Integration tests for the claim run.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
    use rewardsync_core::{ClaimOutcome, SkipReason, INVALID_ADDRESS};
    use rewardsync_ledger::{
        ClaimSigner, DryRunLedger, FeeParams, LedgerClient, LedgerError,
        Result as LedgerResult,
    };

    use crate::{ClaimError, ClaimOrchestrator, ClaimReport, ClaimSubmitter};

    // Hardhat/Anvil development account #0.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const PERIOD: &str = "2026-01";

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn line(byte: u8) -> String {
        addr(byte).to_string()
    }

    fn signer() -> ClaimSigner {
        let secret: [u8; 32] = hex::decode(DEV_KEY).unwrap().try_into().unwrap();
        ClaimSigner::from_secret_bytes(&secret).unwrap()
    }

    /// In-memory ledger with scripted entitlements.
    ///
    /// Accounts missing from `entitlements` have 0. A `None` entry makes the
    /// query fail like a transport error.
    #[derive(Default)]
    struct ScriptedLedger {
        entitlements: HashMap<Address, Option<u64>>,
        fail_submit: bool,
        fail_chain_id: bool,
        nonce: AtomicU64,
        queries: AtomicUsize,
        chain_id_calls: AtomicUsize,
        nonces_served: Mutex<Vec<u64>>,
        broadcasts: Mutex<Vec<Bytes>>,
    }

    impl ScriptedLedger {
        fn with(entitlements: &[(Address, Option<u64>)]) -> Self {
            Self {
                entitlements: entitlements.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn broadcast_count(&self) -> usize {
            self.broadcasts.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl LedgerClient for ScriptedLedger {
        async fn call(&self, _to: Address, data: Bytes) -> LedgerResult<Bytes> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            // claimable(string,address,address): the account is the third head word.
            let account = Address::from_slice(&data[4 + 64 + 12..4 + 96]);
            match self.entitlements.get(&account).copied().unwrap_or(Some(0)) {
                Some(amount) => Ok(Bytes::from(U256::from(amount).to_be_bytes::<32>().to_vec())),
                None => Err(LedgerError::Rpc {
                    method: "eth_call",
                    reason: "connection reset".into(),
                }),
            }
        }

        async fn chain_id(&self) -> LedgerResult<u64> {
            self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_chain_id {
                return Err(LedgerError::Rpc {
                    method: "eth_chainId",
                    reason: "connection refused".into(),
                });
            }
            Ok(11155111)
        }

        async fn sequence_number(&self, _account: Address) -> LedgerResult<u64> {
            let nonce = self.nonce.load(Ordering::SeqCst);
            self.nonces_served.lock().unwrap().push(nonce);
            Ok(nonce)
        }

        async fn submit_raw(&self, raw: Bytes) -> LedgerResult<B256> {
            if self.fail_submit {
                return Err(LedgerError::Rpc {
                    method: "eth_sendRawTransaction",
                    reason: "insufficient funds for gas".into(),
                });
            }
            self.nonce.fetch_add(1, Ordering::SeqCst);
            let hash = keccak256(&raw);
            self.broadcasts.lock().unwrap().push(raw);
            Ok(hash)
        }
    }

    async fn orchestrator(ledger: Arc<dyn LedgerClient>) -> ClaimOrchestrator {
        let submitter = ClaimSubmitter::connect(
            ledger,
            signer(),
            addr(0xc0),
            FeeParams::default(),
            Some(11155111),
        )
        .await
        .unwrap();
        ClaimOrchestrator::new(submitter).with_throttle(Duration::ZERO)
    }

    // =========================================================================
    // Per-account state machine
    // =========================================================================

    #[tokio::test]
    async fn test_zero_entitlement_is_skipped_without_submission() {
        let ledger = Arc::new(ScriptedLedger::with(&[(addr(0xb), Some(0))]));
        let outcomes = orchestrator(ledger.clone())
            .await
            .run(&[line(0xb)], PERIOD, addr(0x70))
            .await;

        assert_eq!(outcomes, vec![ClaimOutcome::Skipped(SkipReason::ZeroEntitlement)]);
        assert_eq!(ledger.broadcast_count(), 0);
        assert!(ledger.nonces_served.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_is_skipped_and_run_continues() {
        let ledger = Arc::new(ScriptedLedger::with(&[(addr(0xc), None), (addr(0xd), Some(5))]));
        let outcomes = orchestrator(ledger.clone())
            .await
            .run(&[line(0xc), line(0xd)], PERIOD, addr(0x70))
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], ClaimOutcome::Skipped(SkipReason::QueryFailed));
        assert!(outcomes[1].is_submitted());
        assert_eq!(ledger.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_accounts_claim_independently() {
        let ledger = Arc::new(ScriptedLedger::with(&[(addr(0xd), Some(50))]));
        let outcomes = orchestrator(ledger.clone())
            .await
            .run(&[line(0xd), line(0xd)], PERIOD, addr(0x70))
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(ClaimOutcome::is_submitted));
        assert_ne!(outcomes[0], outcomes[1], "each claim is a distinct transaction");
        assert_eq!(*ledger.nonces_served.lock().unwrap(), vec![0, 1]);
        assert_eq!(ledger.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_account_fails_without_network() {
        let ledger = Arc::new(ScriptedLedger::default());
        let outcomes = orchestrator(ledger.clone())
            .await
            .run(&["0x1234".to_string(), "   ".to_string()], PERIOD, addr(0x70))
            .await;

        assert_eq!(
            outcomes,
            vec![
                ClaimOutcome::Failed(INVALID_ADDRESS.to_string()),
                ClaimOutcome::Failed(INVALID_ADDRESS.to_string()),
            ]
        );
        assert_eq!(ledger.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_is_isolated() {
        let ledger = Arc::new(ScriptedLedger {
            fail_submit: true,
            ..ScriptedLedger::with(&[(addr(0x1), Some(10)), (addr(0x2), Some(0))])
        });
        let outcomes = orchestrator(ledger.clone())
            .await
            .run(&[line(0x1), line(0x2)], PERIOD, addr(0x70))
            .await;

        match &outcomes[0] {
            ClaimOutcome::Failed(reason) => assert!(reason.contains("insufficient funds")),
            other => panic!("expected failure, got {other}"),
        }
        assert_eq!(outcomes[1], ClaimOutcome::Skipped(SkipReason::ZeroEntitlement));
    }

    #[tokio::test]
    async fn test_outcomes_follow_input_order() {
        let ledger = Arc::new(ScriptedLedger::with(&[
            (addr(0x1), Some(1)),
            (addr(0x2), None),
            (addr(0x3), Some(0)),
        ]));
        let input = vec![line(0x3), "bogus".to_string(), line(0x1), line(0x2), line(0x3)];
        let mut streamed = Vec::new();
        let outcomes = orchestrator(ledger)
            .await
            .run_with(&input, PERIOD, addr(0x70), |raw, outcome| {
                streamed.push((raw.to_string(), outcome.clone()))
            })
            .await;

        assert_eq!(outcomes.len(), input.len());
        assert_eq!(outcomes[0], ClaimOutcome::Skipped(SkipReason::ZeroEntitlement));
        assert_eq!(outcomes[1], ClaimOutcome::invalid_address());
        assert!(outcomes[2].is_submitted());
        assert_eq!(outcomes[3], ClaimOutcome::Skipped(SkipReason::QueryFailed));
        assert_eq!(outcomes[4], ClaimOutcome::Skipped(SkipReason::ZeroEntitlement));

        let streamed_lines: Vec<_> = streamed.iter().map(|(raw, _)| raw.clone()).collect();
        assert_eq!(streamed_lines, input);

        let report = ClaimReport::from_outcomes(&outcomes);
        assert_eq!((report.submitted, report.skipped, report.failed), (1, 3, 1));
    }

    #[tokio::test]
    async fn test_empty_account_list_yields_no_outcomes() {
        let ledger = Arc::new(ScriptedLedger::default());
        let outcomes = orchestrator(ledger).await.run(&[], PERIOD, addr(0x70)).await;
        assert!(outcomes.is_empty());
    }

    // =========================================================================
    // Chain id, throttle and dry run
    // =========================================================================

    #[tokio::test]
    async fn test_chain_id_queried_once_when_not_configured() {
        let ledger = Arc::new(ScriptedLedger::with(&[(addr(0x1), Some(1))]));
        let submitter = ClaimSubmitter::connect(
            ledger.clone(),
            signer(),
            addr(0xc0),
            FeeParams::default(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(submitter.chain_id(), 11155111);

        ClaimOrchestrator::new(submitter)
            .with_throttle(Duration::ZERO)
            .run(&[line(0x1), line(0x1)], PERIOD, addr(0x70))
            .await;
        assert_eq!(ledger.chain_id_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_id_failure_is_fatal() {
        let ledger = Arc::new(ScriptedLedger {
            fail_chain_id: true,
            ..ScriptedLedger::default()
        });
        let result =
            ClaimSubmitter::connect(ledger, signer(), addr(0xc0), FeeParams::default(), None).await;
        assert!(matches!(result, Err(ClaimError::ChainId(_))));
    }

    #[tokio::test]
    async fn test_throttle_between_accounts_only() {
        let ledger = Arc::new(ScriptedLedger::default());
        let throttled = orchestrator(ledger.clone())
            .await
            .with_throttle(Duration::from_millis(40));

        let start = Instant::now();
        throttled
            .run(&[line(0x1), line(0x2), line(0x3)], PERIOD, addr(0x70))
            .await;
        assert!(start.elapsed() >= Duration::from_millis(80));

        let single = orchestrator(ledger)
            .await
            .with_throttle(Duration::from_secs(30));
        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            single.run(&[line(0x1)], PERIOD, addr(0x70)),
        )
        .await;
        assert!(finished.is_ok(), "no pause after the last account");
    }

    #[tokio::test]
    async fn test_dry_run_records_instead_of_broadcasting() {
        let inner = Arc::new(ScriptedLedger {
            fail_submit: true,
            ..ScriptedLedger::with(&[(addr(0x1), Some(7)), (addr(0x2), Some(0))])
        });
        let dry = Arc::new(DryRunLedger::new(inner.clone()));
        let outcomes = orchestrator(dry.clone())
            .await
            .run(&[line(0x1), line(0x2)], PERIOD, addr(0x70))
            .await;

        assert!(outcomes[0].is_submitted());
        assert_eq!(outcomes[1], ClaimOutcome::Skipped(SkipReason::ZeroEntitlement));
        assert_eq!(dry.submission_count(), 1);
        assert_eq!(inner.broadcast_count(), 0);
        assert_eq!(
            outcomes[0],
            ClaimOutcome::Submitted(keccak256(&dry.submissions()[0]))
        );
    }

    #[tokio::test]
    async fn test_dry_run_duplicates_get_distinct_transactions() {
        let inner = Arc::new(ScriptedLedger {
            fail_submit: true,
            nonce: AtomicU64::new(9),
            ..ScriptedLedger::with(&[(addr(0xd), Some(50))])
        });
        let dry = Arc::new(DryRunLedger::new(inner.clone()));
        let outcomes = orchestrator(dry.clone())
            .await
            .run(&[line(0xd), line(0xd)], PERIOD, addr(0x70))
            .await;

        assert!(outcomes.iter().all(ClaimOutcome::is_submitted));
        assert_ne!(outcomes[0], outcomes[1]);
        assert_eq!(dry.submission_count(), 2);
        assert_ne!(dry.submissions()[0], dry.submissions()[1]);
        // The inner ledger only ever reports the on-chain nonce.
        assert_eq!(*inner.nonces_served.lock().unwrap(), vec![9, 9]);
        assert_eq!(inner.broadcast_count(), 0);
    }
}
