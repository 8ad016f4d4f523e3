//! Chain client abstraction.
//!
//! Signing and account sequencing happen behind the broadcast gateway; this
//! process only hands it unsigned messages and reads back the transaction
//! response. Three implementations:
//! - [`GatewayChainClient`]: JSON-over-HTTP to the signing gateway
//! - [`DryRunChainClient`]: observation mode, logs instead of sending
//! - [`MockChainClient`]: records messages for tests

use crate::error::{ExecutorError, ExecutorResult};
use liquidator_core::{
    DerivativeOrder, DerivativeOrderData, MarketMetadata, OutboundMessage, SubaccountId,
};
use liquidator_exchange::BoxFuture;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for gateway requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BROADCAST_PATH: &str = "/broadcast";
const HEALTH_PATH: &str = "/health";

/// Chain acknowledgement of a synchronously broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastAck {
    #[serde(alias = "txhash")]
    pub tx_hash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
}

impl BroadcastAck {
    pub fn is_accepted(&self) -> bool {
        self.code == 0
    }

    /// Turn a non-zero response code into a rejection.
    pub fn into_result(self) -> ExecutorResult<Self> {
        if self.is_accepted() {
            Ok(self)
        } else {
            Err(ExecutorError::BroadcastRejected {
                code: self.code,
                raw_log: self.raw_log,
            })
        }
    }
}

/// Chain-side capabilities used by the liquidation pipeline.
pub trait ChainClient: Send + Sync {
    /// Bech32 address transactions are signed with.
    fn self_address(&self) -> &str;

    /// Build a chain-format order for `subaccount_id`.
    fn create_derivative_order(
        &self,
        subaccount_id: &SubaccountId,
        data: &DerivativeOrderData,
        market: &MarketMetadata,
    ) -> ExecutorResult<DerivativeOrder> {
        Ok(DerivativeOrder::from_order_data(subaccount_id, data, market)?)
    }

    /// Broadcast `msg` and wait for the chain's check-tx verdict.
    fn sync_broadcast_msg<'a>(
        &'a self,
        msg: &'a OutboundMessage,
    ) -> BoxFuture<'a, ExecutorResult<BroadcastAck>>;

    /// Whether the chain endpoint is reachable.
    fn is_ready(&self) -> BoxFuture<'_, bool>;
}

/// Arc wrapper for ChainClient trait objects.
pub type DynChainClient = Arc<dyn ChainClient>;

#[derive(Debug, Serialize)]
struct BroadcastRequest<'a> {
    chain_id: &'a str,
    signer: &'a str,
    msgs: [&'a OutboundMessage; 1],
}

/// Broadcast gateway client.
pub struct GatewayChainClient {
    client: Client,
    base_url: String,
    chain_id: String,
    self_address: String,
}

impl GatewayChainClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - gateway HTTP endpoint
    /// * `chain_id` - chain the gateway signs for
    /// * `self_address` - account the gateway signs with
    pub fn new(
        base_url: impl Into<String>,
        chain_id: impl Into<String>,
        self_address: impl Into<String>,
    ) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                ExecutorError::ConnectionError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain_id: chain_id.into(),
            self_address: self_address.into(),
        })
    }
}

impl ChainClient for GatewayChainClient {
    fn self_address(&self) -> &str {
        &self.self_address
    }

    fn sync_broadcast_msg<'a>(
        &'a self,
        msg: &'a OutboundMessage,
    ) -> BoxFuture<'a, ExecutorResult<BroadcastAck>> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, BROADCAST_PATH);
            let request = BroadcastRequest {
                chain_id: &self.chain_id,
                signer: &self.self_address,
                msgs: [msg],
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| ExecutorError::ConnectionError(format!("HTTP request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExecutorError::BroadcastFailed(format!("HTTP {status}: {body}")));
            }

            let ack: BroadcastAck = response
                .json()
                .await
                .map_err(|e| ExecutorError::BroadcastFailed(format!("Malformed response: {e}")))?;
            debug!(tx_hash = %ack.tx_hash, code = ack.code, "Gateway broadcast response");
            ack.into_result()
        })
    }

    fn is_ready(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, HEALTH_PATH);
            match self.client.get(&url).send().await {
                Ok(response) => response.status().is_success(),
                Err(e) => {
                    debug!(error = %e, "Gateway not ready");
                    false
                }
            }
        })
    }
}

/// Observation-mode client: every message is logged and acknowledged.
#[derive(Debug, Clone)]
pub struct DryRunChainClient {
    self_address: String,
}

impl DryRunChainClient {
    pub fn new(self_address: impl Into<String>) -> Self {
        Self {
            self_address: self_address.into(),
        }
    }
}

impl ChainClient for DryRunChainClient {
    fn self_address(&self) -> &str {
        &self.self_address
    }

    fn sync_broadcast_msg<'a>(
        &'a self,
        msg: &'a OutboundMessage,
    ) -> BoxFuture<'a, ExecutorResult<BroadcastAck>> {
        Box::pin(async move {
            let payload = serde_json::to_string(msg).map_err(|e| {
                ExecutorError::BroadcastFailed(format!("Message serialization: {e}"))
            })?;
            info!(
                type_url = msg.type_url(),
                signer = msg.signer(),
                payload = %payload,
                "[DRY-RUN] Liquidation message not broadcast"
            );
            Ok(BroadcastAck {
                tx_hash: "dry-run".to_string(),
                code: 0,
                raw_log: String::new(),
            })
        })
    }

    fn is_ready(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { true })
    }
}

/// Mock chain client for testing.
#[derive(Debug)]
pub struct MockChainClient {
    self_address: String,
    /// Recorded broadcasts for verification.
    broadcasts: Mutex<Vec<OutboundMessage>>,
    /// Results to return, in order; once empty, broadcasts succeed.
    results: Mutex<VecDeque<ExecutorResult<BroadcastAck>>>,
    ready: AtomicBool,
    /// Panic inside the next broadcast.
    panic_next: AtomicBool,
}

impl MockChainClient {
    pub fn new(self_address: impl Into<String>) -> Self {
        Self {
            self_address: self_address.into(),
            broadcasts: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
            ready: AtomicBool::new(true),
            panic_next: AtomicBool::new(false),
        }
    }

    /// Queue the result of a future broadcast.
    pub fn push_result(&self, result: ExecutorResult<BroadcastAck>) {
        self.results.lock().push_back(result);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Make the next broadcast panic.
    pub fn panic_on_next_broadcast(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub fn broadcasts(&self) -> Vec<OutboundMessage> {
        self.broadcasts.lock().clone()
    }

    pub fn clear_broadcasts(&self) {
        self.broadcasts.lock().clear();
    }

    fn next_result(&self) -> ExecutorResult<BroadcastAck> {
        let queued = self.results.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(BroadcastAck {
                tx_hash: format!("MOCK{:04}", self.broadcasts.lock().len()),
                code: 0,
                raw_log: String::new(),
            })
        })
    }
}

impl ChainClient for MockChainClient {
    fn self_address(&self) -> &str {
        &self.self_address
    }

    fn sync_broadcast_msg<'a>(
        &'a self,
        msg: &'a OutboundMessage,
    ) -> BoxFuture<'a, ExecutorResult<BroadcastAck>> {
        Box::pin(async move {
            if self.panic_next.swap(false, Ordering::SeqCst) {
                panic!("mock chain client panic");
            }
            self.broadcasts.lock().push(msg.clone());
            self.next_result()?.into_result()
        })
    }

    fn is_ready(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move { self.ready.load(Ordering::SeqCst) })
    }
}
