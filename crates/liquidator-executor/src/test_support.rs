//! Shared fixtures for executor tests.

use crate::builder::{AccountContext, DelegationContext};
use liquidator_core::{AccountAddress, MarketMetadata, PositionDirection, PositionSnapshot};
use rust_decimal_macros::dec;

pub const BTC_USDT_PERP_ID: &str =
    "0x4ca0f92fc28be0c9761326016b5a1a2177dd6375558365116b5bdda9abc229ce";

pub const SELF_ADDRESS: &str = "inj14au322k9munkmx5wrchz9q30juf5wjgz2cfqku";
pub const SELF_SUBACCOUNT_1: &str =
    "0xaf79152ac5df276d9a8e1e2e22822f9713474902000000000000000000000001";

pub const GRANTER_ADDRESS: &str = "inj1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc54tm65y";
pub const GRANTER_SUBACCOUNT_3: &str =
    "0x0102030405060708090a0b0c0d0e0f1011121314000000000000000000000003";

pub fn btc_usdt_perp() -> MarketMetadata {
    MarketMetadata {
        id: BTC_USDT_PERP_ID.to_string(),
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

pub fn position_in(market_id: &str, direction: &str, quantity: &str, mark_price: &str) -> PositionSnapshot {
    PositionSnapshot {
        market_id: market_id.to_string(),
        subaccount_id: "0x00000000000000000000000000000000000000aa000000000000000000000000"
            .to_string(),
        direction: PositionDirection::from(direction),
        quantity: quantity.to_string(),
        mark_price: mark_price.to_string(),
        ticker: Some("BTC/USDT PERP".to_string()),
        entry_price: None,
        liquidation_price: None,
        margin: None,
    }
}

pub fn position(direction: &str, quantity: &str, mark_price: &str) -> PositionSnapshot {
    position_in(BTC_USDT_PERP_ID, direction, quantity, mark_price)
}

fn account(address: &str, index: u32) -> AccountContext {
    AccountContext::new(AccountAddress::from_bech32(address).unwrap(), index)
}

pub fn direct_delegation() -> DelegationContext {
    DelegationContext::direct(account(SELF_ADDRESS, 1))
}

pub fn granted_delegation() -> DelegationContext {
    DelegationContext::delegated(account(SELF_ADDRESS, 1), account(GRANTER_ADDRESS, 3))
}
