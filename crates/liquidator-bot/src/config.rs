//! Application configuration.
//!
//! [`AppConfig`] mirrors the TOML file. [`AppConfig::validate`] turns it into
//! the immutable [`LiquidatorSettings`] the application runs with; every
//! startup-fatal configuration problem surfaces there.

use crate::error::{AppError, AppResult};
use crate::network::{NetworkConfig, NetworkProfile};
use liquidator_core::AccountAddress;
use liquidator_executor::{AccountContext, DelegationContext, OrderSizingPolicy};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Build liquidation messages and log them without broadcasting.
    #[default]
    Observation,
    /// Broadcast through the chain gateway.
    Trading,
}

/// `[account]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Bech32 address the gateway signs with.
    pub address: String,
    #[serde(default)]
    pub subaccount_index: u32,
    /// Granter to liquidate on behalf of. Empty disables delegation.
    #[serde(default)]
    pub granter_address: String,
    #[serde(default)]
    pub granter_subaccount_index: u32,
}

/// `[liquidation]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationConfig {
    pub market_id: String,
    /// Maximum order quantity. Empty means unbounded.
    #[serde(default)]
    pub max_order_amount: String,
    /// Maximum order notional in mark-price units. Empty means unbounded.
    #[serde(default)]
    pub max_order_notional: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    10
}

impl Default for LiquidationConfig {
    fn default() -> Self {
        Self {
            market_id: String::new(),
            max_order_amount: String::new(),
            max_order_notional: String::new(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// `[telemetry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Listen address for the `/metrics` endpoint. Unset disables it.
    #[serde(default)]
    pub metrics_addr: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_addr: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub liquidation: LiquidationConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// How long to wait for the exchange and chain at startup.
    #[serde(default = "default_service_wait_timeout_secs")]
    pub service_wait_timeout_secs: u64,
}

fn default_service_wait_timeout_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::default(),
            network: NetworkConfig::default(),
            account: AccountConfig::default(),
            liquidation: LiquidationConfig::default(),
            telemetry: TelemetryConfig::default(),
            service_wait_timeout_secs: default_service_wait_timeout_secs(),
        }
    }
}

/// Validated, immutable settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidatorSettings {
    pub mode: OperatingMode,
    pub network: NetworkProfile,
    pub delegation: DelegationContext,
    pub market_id: String,
    pub policy: OrderSizingPolicy,
    pub poll_interval: Duration,
    pub service_wait_timeout: Duration,
    pub metrics_addr: Option<SocketAddr>,
}

impl LiquidatorSettings {
    pub fn is_observation_mode(&self) -> bool {
        self.mode == OperatingMode::Observation
    }

    pub fn self_address(&self) -> &str {
        self.delegation.self_account.address.as_str()
    }
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn is_observation_mode(&self) -> bool {
        self.mode == OperatingMode::Observation
    }

    /// Validate and resolve into [`LiquidatorSettings`].
    pub fn validate(&self) -> AppResult<LiquidatorSettings> {
        let network = NetworkProfile::resolve(&self.network)?;
        if self.mode == OperatingMode::Trading && network.chain_gateway_url.is_none() {
            return Err(AppError::Config(
                "trading mode requires network.chain_gateway_url".to_string(),
            ));
        }

        let market_id = self.liquidation.market_id.trim();
        if market_id.is_empty() {
            return Err(AppError::Config("liquidation.market_id is required".to_string()));
        }
        if self.liquidation.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "liquidation.poll_interval_secs must be positive".to_string(),
            ));
        }

        let self_account = AccountContext::new(
            AccountAddress::from_bech32(self.account.address.trim())?,
            self.account.subaccount_index,
        );
        let granter = self.account.granter_address.trim();
        let delegation = if granter.is_empty() {
            DelegationContext::direct(self_account)
        } else {
            let granter = AccountContext::new(
                AccountAddress::from_bech32(granter)?,
                self.account.granter_subaccount_index,
            );
            DelegationContext::delegated(self_account, granter)
        };

        let policy = OrderSizingPolicy::from_config(
            &self.liquidation.max_order_amount,
            &self.liquidation.max_order_notional,
        )?;

        let metrics_addr = match self.telemetry.metrics_addr.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(addr) => Some(addr.parse::<SocketAddr>().map_err(|e| {
                AppError::Config(format!("telemetry.metrics_addr {addr:?} is invalid: {e}"))
            })?),
        };

        Ok(LiquidatorSettings {
            mode: self.mode,
            network,
            delegation,
            market_id: market_id.to_string(),
            policy,
            poll_interval: Duration::from_secs(self.liquidation.poll_interval_secs),
            service_wait_timeout: Duration::from_secs(self.service_wait_timeout_secs),
            metrics_addr,
        })
    }
}
