//! Executor error types.

use liquidator_core::CoreError;
use liquidator_exchange::ExchangeError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why no order quantity could be computed for a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    #[error("Invalid {field} '{value}'")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("Mark price must be positive, got {0}")]
    NonPositiveMarkPrice(Decimal),

    #[error("Position quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("{field} must be positive, got {value}")]
    NonPositiveLimit { field: &'static str, value: Decimal },

    #[error("Order quantity {computed} cannot be expressed on tick {tick}")]
    Overflow { computed: Decimal, tick: Decimal },

    #[error("Order quantity {computed} is below the quantity tick {tick}")]
    BelowMinQuantity { computed: Decimal, tick: Decimal },
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Sizing failed: {0}")]
    Sizing(#[from] SizingError),

    #[error("Message construction failed: {0}")]
    Message(#[from] CoreError),

    #[error("Exchange query failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Chain client signs as {chain} but delegation expects {configured}")]
    SignerMismatch { chain: String, configured: String },

    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),

    #[error("Broadcast rejected (code {code}): {raw_log}")]
    BroadcastRejected { code: u32, raw_log: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Terminal loop failure.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("Liquidation loop faulted: {0}")]
    Fault(String),
}
