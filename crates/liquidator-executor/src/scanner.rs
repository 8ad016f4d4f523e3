//! Liquidable position scanning.

use crate::error::ExecutorResult;
use liquidator_core::PositionSnapshot;
use liquidator_exchange::DynExchangeClient;
use liquidator_telemetry::FuncTimer;
use tracing::{debug, warn};

/// Queries the exchange for liquidable positions in one market.
pub struct PositionScanner {
    exchange: DynExchangeClient,
}

impl PositionScanner {
    pub fn new(exchange: DynExchangeClient) -> Self {
        Self { exchange }
    }

    /// Positions in `market_id` eligible for liquidation.
    ///
    /// An empty list is a normal outcome. Snapshots reported for another
    /// market are dropped.
    pub async fn fetch_liquidable_positions(
        &self,
        market_id: &str,
    ) -> ExecutorResult<Vec<PositionSnapshot>> {
        let timer = FuncTimer::start("LiquidablePositions");
        let result = self.exchange.liquidable_positions(market_id).await;
        timer.finish(result.is_err());

        let positions: Vec<PositionSnapshot> = result?
            .into_iter()
            .filter(|position| {
                let matches = position.market_id == market_id;
                if !matches {
                    warn!(
                        requested = market_id,
                        reported = %position.market_id,
                        subaccount_id = %position.subaccount_id,
                        "Dropping position reported for another market"
                    );
                }
                matches
            })
            .collect();

        debug!(market_id, count = positions.len(), "Scan complete");
        Ok(positions)
    }
}
