//! Order-related types and identifiers.
//!
//! `DerivativeOrderData` is the human-readable order request;
//! `DerivativeOrder` is the chain-format order embedded in a liquidation
//! message.

use crate::address::SubaccountId;
use crate::decimal::{Price, Quantity};
use crate::error::Result;
use crate::market::MarketMetadata;
use crate::position::PositionDirection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Exchange order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    /// Order type used to liquidate a position with `direction`.
    ///
    /// Short positions are liquidated with SELL orders and everything else
    /// with BUY orders. This mirrors the behaviour observed against the
    /// exchange and is intentionally not "the opposite side".
    pub fn for_liquidation(direction: PositionDirection) -> Self {
        match direction {
            PositionDirection::Short => Self::Sell,
            PositionDirection::Long => Self::Buy,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Client order id.
///
/// Every order carries a fresh UUID v4 so that concurrently in-flight
/// orders can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable order request, converted to chain format by
/// [`DerivativeOrder::from_order_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeOrderData {
    pub market_id: String,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub price: Price,
    pub leverage: Decimal,
    pub fee_recipient: String,
    pub cid: ClientOrderId,
    pub is_reduce_only: bool,
}

/// Order fields common to every exchange order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub subaccount_id: SubaccountId,
    pub fee_recipient: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub cid: ClientOrderId,
}

/// Chain-format derivative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeOrder {
    pub market_id: String,
    pub order_info: OrderInfo,
    pub order_type: OrderType,
    pub margin: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<Decimal>,
}

impl DerivativeOrder {
    /// Convert an order request into chain format for `market`.
    ///
    /// Reduce-only orders carry no margin. Fails when a chain-format value
    /// does not fit in a decimal.
    pub fn from_order_data(
        subaccount_id: &SubaccountId,
        data: &DerivativeOrderData,
        market: &MarketMetadata,
    ) -> Result<Self> {
        let margin = if data.is_reduce_only {
            Decimal::ZERO
        } else {
            market.calculate_margin_in_chain_format(data.quantity, data.price, data.leverage)?
        };

        Ok(Self {
            market_id: data.market_id.clone(),
            order_info: OrderInfo {
                subaccount_id: subaccount_id.clone(),
                fee_recipient: data.fee_recipient.clone(),
                price: market.price_to_chain_format(data.price)?.inner(),
                quantity: market.quantity_to_chain_format(data.quantity)?.inner(),
                cid: data.cid.clone(),
            },
            order_type: data.order_type,
            margin,
            trigger_price: None,
        })
    }
}
