//! JSON-RPC 2.0 ledger client over HTTP.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U64};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::json;
use tracing::debug;

use crate::{LedgerClient, LedgerError, Result};

/// Default transport timeout. There is no other caller-side timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`LedgerClient`] backed by a standard Ethereum JSON-RPC endpoint.
pub struct JsonRpcLedger {
    endpoint: String,
    client: HttpClient,
}

impl JsonRpcLedger {
    /// Build a client for `endpoint`. No request is sent until the first call.
    pub fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(endpoint)
            .map_err(|e| LedgerError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn rpc_error(method: &'static str) -> impl FnOnce(jsonrpsee::core::ClientError) -> LedgerError {
    move |e| LedgerError::Rpc {
        method,
        reason: e.to_string(),
    }
}

#[async_trait::async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        debug!(%to, len = data.len(), "eth_call");
        let request = json!({ "to": to, "data": data });
        self.client
            .request("eth_call", rpc_params![request, "latest"])
            .await
            .map_err(rpc_error("eth_call"))
    }

    async fn chain_id(&self) -> Result<u64> {
        let id: U64 = self
            .client
            .request("eth_chainId", rpc_params![])
            .await
            .map_err(rpc_error("eth_chainId"))?;
        Ok(id.to::<u64>())
    }

    async fn sequence_number(&self, account: Address) -> Result<u64> {
        let nonce: U64 = self
            .client
            .request("eth_getTransactionCount", rpc_params![account, "pending"])
            .await
            .map_err(rpc_error("eth_getTransactionCount"))?;
        debug!(%account, nonce = nonce.to::<u64>(), "fetched sequence number");
        Ok(nonce.to::<u64>())
    }

    async fn submit_raw(&self, raw: Bytes) -> Result<B256> {
        debug!(len = raw.len(), "eth_sendRawTransaction");
        self.client
            .request("eth_sendRawTransaction", rpc_params![raw])
            .await
            .map_err(rpc_error("eth_sendRawTransaction"))
    }
}
