//! Error types for liquidator-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid decimal {value:?}: {source}")]
    InvalidDecimal {
        value: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Arithmetic overflow in {0}")]
    Overflow(String),

    #[error("Invalid market metadata: {0}")]
    InvalidMarket(String),

    #[error("Message encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Unexpected message type: expected {expected}, got {actual}")]
    UnexpectedTypeUrl { expected: String, actual: String },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
