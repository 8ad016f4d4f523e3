//! Core domain types for the derivative liquidation bot.
//!
//! This crate provides the types shared by every other crate:
//! - `Price`, `Quantity`: precision-safe numeric types with tick quantization
//! - `MarketMetadata`: human <-> chain fixed-point conversions and margin math
//! - `PositionSnapshot`: a liquidable position as reported by the exchange
//! - `DerivativeOrder`, `OrderType`, `ClientOrderId`: order construction
//! - `AccountAddress`, `SubaccountId`: bech32 accounts and derived subaccounts
//! - `OutboundMessage`: direct or authz-wrapped liquidation messages

pub mod address;
pub mod decimal;
pub mod error;
pub mod market;
pub mod message;
pub mod order;
pub mod position;

pub use address::{AccountAddress, SubaccountId};
pub use decimal::{Price, Quantity};
pub use error::{CoreError, Result};
pub use market::MarketMetadata;
pub use message::{
    Any, MsgExec, MsgLiquidatePosition, OutboundMessage, TypedMessage, MSG_EXEC_TYPE_URL,
    MSG_LIQUIDATE_POSITION_TYPE_URL,
};
pub use order::{ClientOrderId, DerivativeOrder, DerivativeOrderData, OrderInfo, OrderType};
pub use position::{PositionDirection, PositionSnapshot};
