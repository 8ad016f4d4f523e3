//! Exchange error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("Invalid market: {0}")]
    InvalidMarket(#[from] liquidator_core::CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
