//! Derivative market metadata lookup.
//!
//! Markets are fetched once at startup and never refreshed: tick sizes and
//! quote decimals are fixed for the lifetime of the process.

use crate::client::ExchangeClient;
use crate::error::{ExchangeError, ExchangeResult};
use liquidator_core::MarketMetadata;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Quote token description from the indexer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTokenMeta {
    #[serde(default)]
    pub symbol: String,
    pub decimals: u32,
}

/// Raw derivative market entry from the indexer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDerivativeMarket {
    #[serde(alias = "marketId")]
    pub market_id: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default, alias = "marketStatus")]
    pub market_status: String,
    #[serde(default, alias = "quoteTokenMeta")]
    pub quote_token_meta: Option<RawTokenMeta>,
    #[serde(alias = "minPriceTickSize")]
    pub min_price_tick_size: Decimal,
    #[serde(alias = "minQuantityTickSize")]
    pub min_quantity_tick_size: Decimal,
    #[serde(default, alias = "initialMarginRatio")]
    pub initial_margin_ratio: Decimal,
    #[serde(default, alias = "maintenanceMarginRatio")]
    pub maintenance_margin_ratio: Decimal,
    #[serde(default, alias = "makerFeeRate")]
    pub maker_fee_rate: Decimal,
    #[serde(default, alias = "takerFeeRate")]
    pub taker_fee_rate: Decimal,
}

impl RawDerivativeMarket {
    /// Convert to validated metadata.
    pub fn into_metadata(self) -> ExchangeResult<MarketMetadata> {
        let quote = self.quote_token_meta.ok_or_else(|| {
            ExchangeError::UnexpectedResponse(format!(
                "market {} has no quote token meta",
                self.market_id
            ))
        })?;

        let market = MarketMetadata {
            id: self.market_id,
            ticker: self.ticker,
            quote_decimals: quote.decimals,
            min_price_tick_size: self.min_price_tick_size,
            min_quantity_tick_size: self.min_quantity_tick_size,
            initial_margin_ratio: self.initial_margin_ratio,
            maintenance_margin_ratio: self.maintenance_margin_ratio,
            maker_fee_rate: self.maker_fee_rate,
            taker_fee_rate: self.taker_fee_rate,
        };
        market.validate()?;
        Ok(market)
    }
}

/// Market id -> metadata lookup.
#[derive(Debug, Default)]
pub struct MarketsAssistant {
    derivative_markets: HashMap<String, Arc<MarketMetadata>>,
}

impl MarketsAssistant {
    /// Index `markets` by id. Markets failing validation are left out.
    pub fn new(markets: impl IntoIterator<Item = MarketMetadata>) -> Self {
        let derivative_markets = markets
            .into_iter()
            .filter(|m| match m.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(market_id = %m.id, error = %e, "Ignoring invalid market");
                    false
                }
            })
            .map(|m| (m.id.clone(), Arc::new(m)))
            .collect();
        Self { derivative_markets }
    }

    /// Load every derivative market from the exchange.
    pub async fn initialize_from_exchange(exchange: &dyn ExchangeClient) -> ExchangeResult<Self> {
        let markets = exchange.derivative_markets().await?;
        let assistant = Self::new(markets);

        info!(
            market_count = assistant.len(),
            "Markets assistant initialized"
        );
        for market in assistant.derivative_markets.values() {
            debug!(market = %market, "Loaded derivative market");
        }

        Ok(assistant)
    }

    pub fn derivative_market(&self, market_id: &str) -> Option<Arc<MarketMetadata>> {
        self.derivative_markets.get(market_id).cloned()
    }

    /// Like [`Self::derivative_market`] but an unknown id is an error.
    pub fn require_derivative_market(&self, market_id: &str) -> ExchangeResult<Arc<MarketMetadata>> {
        self.derivative_market(market_id)
            .ok_or_else(|| ExchangeError::MarketNotFound(market_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.derivative_markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derivative_markets.is_empty()
    }
}
