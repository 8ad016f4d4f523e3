//! Network profiles.
//!
//! `mainnet` and `testnet` resolve to fixed endpoints; `custom` takes every
//! endpoint from the config file. The broadcast gateway has no public preset
//! and is always configured explicitly.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

const MAINNET_CHAIN_ID: &str = "injective-1";
const MAINNET_EXCHANGE_URL: &str = "https://sentry.exchange.grpc-web.injective.network";
const TESTNET_CHAIN_ID: &str = "injective-888";
const TESTNET_EXCHANGE_URL: &str = "https://k8s.testnet.exchange.grpc-web.injective.network";

/// `[network]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// `mainnet`, `testnet` or `custom`.
    #[serde(default = "default_network_name")]
    pub name: String,
    /// Chain id (custom networks only).
    #[serde(default)]
    pub chain_id: Option<String>,
    /// Exchange indexer HTTP endpoint (custom networks only).
    #[serde(default)]
    pub exchange_url: Option<String>,
    /// Broadcast gateway HTTP endpoint. Required in trading mode.
    #[serde(default)]
    pub chain_gateway_url: Option<String>,
}

fn default_network_name() -> String {
    "mainnet".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
            chain_id: None,
            exchange_url: None,
            chain_gateway_url: None,
        }
    }
}

/// Resolved endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: String,
    pub exchange_url: String,
    pub chain_gateway_url: Option<String>,
}

impl NetworkProfile {
    pub fn resolve(config: &NetworkConfig) -> AppResult<Self> {
        let gateway = non_empty(config.chain_gateway_url.as_deref());

        match config.name.as_str() {
            "mainnet" | "testnet" => {
                if config.chain_id.is_some() || config.exchange_url.is_some() {
                    warn!(
                        network = %config.name,
                        "chain_id and exchange_url are ignored for preset networks"
                    );
                }
                let (chain_id, exchange_url) = if config.name == "mainnet" {
                    (MAINNET_CHAIN_ID, MAINNET_EXCHANGE_URL)
                } else {
                    (TESTNET_CHAIN_ID, TESTNET_EXCHANGE_URL)
                };
                Ok(Self {
                    name: config.name.clone(),
                    chain_id: chain_id.to_string(),
                    exchange_url: exchange_url.to_string(),
                    chain_gateway_url: gateway,
                })
            }
            "custom" => {
                let chain_id = non_empty(config.chain_id.as_deref()).ok_or_else(|| {
                    AppError::Config("custom network requires network.chain_id".to_string())
                })?;
                let exchange_url = non_empty(config.exchange_url.as_deref()).ok_or_else(|| {
                    AppError::Config("custom network requires network.exchange_url".to_string())
                })?;
                Ok(Self {
                    name: config.name.clone(),
                    chain_id,
                    exchange_url,
                    chain_gateway_url: gateway,
                })
            }
            other => Err(AppError::InvalidNetwork(other.to_string())),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
