//! Message broadcast with per-message failure isolation.

use crate::chain::{BroadcastAck, DynChainClient};
use crate::error::ExecutorResult;
use liquidator_core::OutboundMessage;
use liquidator_telemetry::FuncTimer;
use tracing::{error, info};

/// Submits liquidation messages through the chain client.
pub struct Broadcaster {
    chain: DynChainClient,
}

impl Broadcaster {
    pub fn new(chain: DynChainClient) -> Self {
        Self { chain }
    }

    /// Broadcast `msg`, logging the outcome. A failure concerns only `msg`.
    pub async fn broadcast(&self, msg: &OutboundMessage) -> ExecutorResult<BroadcastAck> {
        let timer = FuncTimer::start("SyncBroadcastMsg");
        let result = self.chain.sync_broadcast_msg(msg).await;
        timer.finish(result.is_err());

        match &result {
            Ok(ack) => info!(
                tx_hash = %ack.tx_hash,
                type_url = msg.type_url(),
                signer = msg.signer(),
                "Liquidation broadcast accepted"
            ),
            Err(e) => error!(
                error = %e,
                type_url = msg.type_url(),
                signer = msg.signer(),
                "Liquidation broadcast failed"
            ),
        }
        result
    }

    pub fn chain(&self) -> &DynChainClient {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainClient;
    use crate::error::ExecutorError;
    use liquidator_core::MsgLiquidatePosition;
    use std::sync::Arc;

    fn message(subaccount: &str) -> OutboundMessage {
        OutboundMessage::LiquidatePosition(MsgLiquidatePosition {
            sender: "inj1sender".to_string(),
            subaccount_id: subaccount.to_string(),
            market_id: "0xmarket".to_string(),
            order: None,
        })
    }

    #[tokio::test]
    async fn test_failure_is_local_to_message() {
        let chain = Arc::new(MockChainClient::new("inj1sender"));
        chain.push_result(Err(ExecutorError::BroadcastFailed("timeout".to_string())));
        let broadcaster = Broadcaster::new(chain.clone());

        assert!(broadcaster.broadcast(&message("0xa")).await.is_err());
        assert!(broadcaster.broadcast(&message("0xb")).await.is_ok());
        assert_eq!(chain.broadcasts(), vec![message("0xa"), message("0xb")]);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_code() {
        let chain = Arc::new(MockChainClient::new("inj1sender"));
        chain.push_result(Ok(BroadcastAck {
            tx_hash: "ABC".to_string(),
            code: 11,
            raw_log: "out of gas".to_string(),
        }));
        let broadcaster = Broadcaster::new(chain);

        let err = broadcaster.broadcast(&message("0xa")).await.unwrap_err();
        assert!(matches!(err, ExecutorError::BroadcastRejected { code: 11, .. }));
    }
}
