//! Shared fixtures: a BTC perpetual market, accounts and positions.

use liquidator_bot::{AppConfig, LiquidatorSettings};
use liquidator_core::{MarketMetadata, PositionDirection, PositionSnapshot};
use liquidator_exchange::{MockExchangeClient, VersionInfo};
use rust_decimal_macros::dec;
use std::collections::HashMap;

pub const MARKET_ID: &str = "0x4ca0f92fc28be0c9761326016b5a1a2177dd6375558365116b5bdda9abc229ce";
pub const SELF_ADDRESS: &str = "inj14au322k9munkmx5wrchz9q30juf5wjgz2cfqku";
pub const GRANTER_ADDRESS: &str = "inj1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc54tm65y";
pub const GRANTER_SUBACCOUNT_3: &str =
    "0x0102030405060708090a0b0c0d0e0f1011121314000000000000000000000003";
pub const LIQUIDATED_SUBACCOUNT: &str =
    "0x00000000000000000000000000000000000000aa000000000000000000000000";

pub fn btc_usdt_perp() -> MarketMetadata {
    MarketMetadata {
        id: MARKET_ID.to_string(),
        ticker: "BTC/USDT PERP".to_string(),
        quote_decimals: 6,
        min_price_tick_size: dec!(1000000),
        min_quantity_tick_size: dec!(0.0001),
        initial_margin_ratio: dec!(0.095),
        maintenance_margin_ratio: dec!(0.025),
        maker_fee_rate: dec!(-0.0001),
        taker_fee_rate: dec!(0.001),
    }
}

pub fn position(direction: &str, quantity: &str, mark_price: &str) -> PositionSnapshot {
    PositionSnapshot {
        market_id: MARKET_ID.to_string(),
        subaccount_id: LIQUIDATED_SUBACCOUNT.to_string(),
        direction: PositionDirection::from(direction),
        quantity: quantity.to_string(),
        mark_price: mark_price.to_string(),
        ticker: Some("BTC/USDT PERP".to_string()),
        entry_price: None,
        liquidation_price: None,
        margin: None,
    }
}

/// Exchange mock that knows the BTC market and reports a version.
pub fn exchange() -> MockExchangeClient {
    let mut exchange = MockExchangeClient::with_markets(vec![btc_usdt_perp()]);
    exchange.set_version(VersionInfo {
        version: "v1.14.0".to_string(),
        build: HashMap::from([("BuildDate".to_string(), "20240601".to_string())]),
    });
    exchange
}

/// Observation-mode settings; `extra_account` is appended to `[account]`.
pub fn settings(extra_account: &str, extra_liquidation: &str) -> LiquidatorSettings {
    let toml = format!(
        r#"
        service_wait_timeout_secs = 5

        [network]
        name = "testnet"

        [account]
        address = "{SELF_ADDRESS}"
        {extra_account}

        [liquidation]
        market_id = "{MARKET_ID}"
        {extra_liquidation}
        "#
    );
    AppConfig::from_toml_str(&toml).unwrap().validate().unwrap()
}
