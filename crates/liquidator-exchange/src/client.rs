//! Exchange indexer client.
//!
//! The bot needs three queries from the indexer: liquidable positions for a
//! market, the derivative market list, and the API version for a startup
//! diagnostic. They are exposed through the [`ExchangeClient`] trait so the
//! liquidation loop can run against a scripted stand-in in tests.

use crate::error::{ExchangeError, ExchangeResult};
use crate::markets::RawDerivativeMarket;
use liquidator_core::{MarketMetadata, PositionSnapshot};
use parking_lot::Mutex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Default timeout for indexer requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const VERSION_PATH: &str = "/api/exchange/meta/v1/version";
const DERIVATIVE_MARKETS_PATH: &str = "/api/exchange/derivative/v1/markets";
const LIQUIDABLE_POSITIONS_PATH: &str = "/api/exchange/derivative/v1/liquidable_positions";

/// Indexer build information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub build: HashMap<String, String>,
}

impl VersionInfo {
    pub fn build_date(&self) -> &str {
        self.build.get("BuildDate").map(String::as_str).unwrap_or("unknown")
    }
}

/// Query capability of the exchange indexer.
pub trait ExchangeClient: Send + Sync {
    /// Positions in `market_id` currently eligible for liquidation.
    fn liquidable_positions<'a>(
        &'a self,
        market_id: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<Vec<PositionSnapshot>>>;

    /// All derivative markets, already validated.
    fn derivative_markets(&self) -> BoxFuture<'_, ExchangeResult<Vec<MarketMetadata>>>;

    /// Indexer version.
    fn version(&self) -> BoxFuture<'_, ExchangeResult<VersionInfo>>;
}

/// Arc wrapper for ExchangeClient trait objects.
pub type DynExchangeClient = Arc<dyn ExchangeClient>;

#[derive(Debug, Deserialize)]
struct PositionsResponse {
    #[serde(default)]
    positions: Vec<PositionSnapshot>,
}

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<serde_json::Value>,
}

/// JSON-over-HTTP client for the indexer gateway.
pub struct HttpExchangeClient {
    client: Client,
    base_url: String,
}

impl HttpExchangeClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - indexer HTTP endpoint, without trailing path
    pub fn new(base_url: impl Into<String>) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ExchangeError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::HttpClient(format!("{path}: HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ExchangeError::UnexpectedResponse(format!("{path}: {e}")))
    }
}

impl ExchangeClient for HttpExchangeClient {
    fn liquidable_positions<'a>(
        &'a self,
        market_id: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<Vec<PositionSnapshot>>> {
        Box::pin(async move {
            let response: PositionsResponse = self
                .get_json(LIQUIDABLE_POSITIONS_PATH, &[("market_id", market_id)])
                .await?;
            debug!(market_id, count = response.positions.len(), "Fetched liquidable positions");
            Ok(response.positions)
        })
    }

    fn derivative_markets(&self) -> BoxFuture<'_, ExchangeResult<Vec<MarketMetadata>>> {
        Box::pin(async move {
            let response: MarketsResponse = self.get_json(DERIVATIVE_MARKETS_PATH, &[]).await?;
            Ok(parse_markets(response.markets))
        })
    }

    fn version(&self) -> BoxFuture<'_, ExchangeResult<VersionInfo>> {
        Box::pin(async move { self.get_json(VERSION_PATH, &[]).await })
    }
}

/// Parse market entries, skipping the ones that cannot be used.
fn parse_markets(entries: Vec<serde_json::Value>) -> Vec<MarketMetadata> {
    let mut markets = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawDerivativeMarket>(entry)
            .map_err(ExchangeError::from)
            .and_then(RawDerivativeMarket::into_metadata);
        match parsed {
            Ok(market) => markets.push(market),
            Err(e) => warn!(idx, error = %e, "Skipping unusable derivative market"),
        }
    }
    markets
}

/// Scripted exchange client for testing.
///
/// Liquidable-position responses are consumed in order; once the script is
/// exhausted every scan returns an empty list.
#[derive(Debug, Default)]
pub struct MockExchangeClient {
    positions: Mutex<VecDeque<Result<Vec<PositionSnapshot>, String>>>,
    markets: Vec<MarketMetadata>,
    version: Option<VersionInfo>,
    scan_calls: AtomicUsize,
    scanned_markets: Mutex<Vec<String>>,
}

impl MockExchangeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markets(markets: Vec<MarketMetadata>) -> Self {
        Self {
            markets,
            ..Self::default()
        }
    }

    pub fn set_version(&mut self, version: VersionInfo) {
        self.version = Some(version);
    }

    /// Queue a successful scan result.
    pub fn push_positions(&self, positions: Vec<PositionSnapshot>) {
        self.positions.lock().push_back(Ok(positions));
    }

    /// Queue a failed scan.
    pub fn push_error(&self, message: impl Into<String>) {
        self.positions.lock().push_back(Err(message.into()));
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn scanned_markets(&self) -> Vec<String> {
        self.scanned_markets.lock().clone()
    }
}

impl ExchangeClient for MockExchangeClient {
    fn liquidable_positions<'a>(
        &'a self,
        market_id: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<Vec<PositionSnapshot>>> {
        Box::pin(async move {
            self.scan_calls.fetch_add(1, Ordering::SeqCst);
            self.scanned_markets.lock().push(market_id.to_string());
            match self.positions.lock().pop_front() {
                Some(Ok(positions)) => Ok(positions),
                Some(Err(message)) => Err(ExchangeError::HttpClient(message)),
                None => Ok(Vec::new()),
            }
        })
    }

    fn derivative_markets(&self) -> BoxFuture<'_, ExchangeResult<Vec<MarketMetadata>>> {
        Box::pin(async move { Ok(self.markets.clone()) })
    }

    fn version(&self) -> BoxFuture<'_, ExchangeResult<VersionInfo>> {
        Box::pin(async move {
            self.version
                .clone()
                .ok_or_else(|| ExchangeError::HttpClient("version unavailable".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpExchangeClient::new("http://localhost:4444/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:4444");
    }

    #[test]
    fn test_positions_response_parsing() {
        let json = r#"{
            "positions": [{
                "market_id": "0xmarket",
                "subaccount_id": "0xsub",
                "direction": "long",
                "quantity": "1",
                "mark_price": "3400000000"
            }],
            "paging": { "total": 1 }
        }"#;
        let response: PositionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.positions.len(), 1);
        assert_eq!(response.positions[0].mark_price, "3400000000");
    }

    #[test]
    fn test_empty_positions_response() {
        let response: PositionsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.positions.is_empty());
    }

    #[test]
    fn test_parse_markets_skips_bad_entries() {
        let entries = vec![
            serde_json::json!({
                "market_id": "0xgood",
                "ticker": "BTC/USDT PERP",
                "quote_token_meta": { "decimals": 6 },
                "min_price_tick_size": "1000000",
                "min_quantity_tick_size": "0.0001"
            }),
            serde_json::json!({ "market_id": "0xbad" }),
            serde_json::json!({
                "market_id": "0xzero_tick",
                "quote_token_meta": { "decimals": 6 },
                "min_price_tick_size": "0",
                "min_quantity_tick_size": "0.0001"
            }),
        ];
        let markets = parse_markets(entries);
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].id, "0xgood");
    }

    #[test]
    fn test_version_build_date() {
        let json = r#"{ "version": "v1.12.0", "build": { "BuildDate": "20240101" } }"#;
        let version: VersionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(version.build_date(), "20240101");
        assert_eq!(VersionInfo::default().build_date(), "unknown");
    }

    #[tokio::test]
    async fn test_mock_replays_script_then_empties() {
        let mock = MockExchangeClient::new();
        mock.push_error("boom");
        mock.push_positions(vec![]);

        assert!(mock.liquidable_positions("m").await.is_err());
        assert!(mock.liquidable_positions("m").await.unwrap().is_empty());
        assert!(mock.liquidable_positions("m").await.unwrap().is_empty());
        assert_eq!(mock.scan_calls(), 3);
        assert_eq!(mock.scanned_markets(), vec!["m", "m", "m"]);
    }
}
