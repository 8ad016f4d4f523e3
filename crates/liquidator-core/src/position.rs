//! Liquidable position snapshots as reported by the exchange.

use crate::decimal::{parse_decimal, Price, Quantity};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position direction.
///
/// The exchange reports `"long"` or `"short"`; any other value is treated as
/// long, which keeps the order-type mapping identical to the exchange's own
/// tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PositionDirection {
    Long,
    Short,
}

impl From<String> for PositionDirection {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&str> for PositionDirection {
    fn from(s: &str) -> Self {
        if s == "short" {
            Self::Short
        } else {
            Self::Long
        }
    }
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// One liquidable position. Quantity and mark price stay as the exchange's
/// decimal strings until sizing, so a malformed value only affects the
/// position that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    #[serde(alias = "marketId")]
    pub market_id: String,
    #[serde(alias = "subaccountId")]
    pub subaccount_id: String,
    pub direction: PositionDirection,
    pub quantity: String,
    #[serde(alias = "markPrice")]
    pub mark_price: String,

    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, alias = "entryPrice")]
    pub entry_price: Option<String>,
    #[serde(default, alias = "liquidationPrice")]
    pub liquidation_price: Option<String>,
    #[serde(default)]
    pub margin: Option<String>,
}

impl PositionSnapshot {
    pub fn parsed_quantity(&self) -> Result<Quantity> {
        parse_decimal(&self.quantity).map(Quantity::new)
    }

    pub fn parsed_mark_price(&self) -> Result<Price> {
        parse_decimal(&self.mark_price).map(Price::new)
    }
}

impl fmt::Display for PositionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} qty={} mark={} subaccount={}",
            self.market_id, self.direction, self.quantity, self.mark_price, self.subaccount_id
        )
    }
}
