//! Application error types.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network name {0} is not valid")]
    InvalidNetwork(String),

    #[error("Invalid account: {0}")]
    Account(#[from] liquidator_core::CoreError),

    #[error("Invalid sizing limit: {0}")]
    Sizing(#[from] liquidator_executor::SizingError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] liquidator_exchange::ExchangeError),

    #[error("Executor error: {0}")]
    Executor(#[from] liquidator_executor::ExecutorError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] liquidator_telemetry::TelemetryError),

    #[error("Service wait timed out after {timeout:?}: {service} is not ready")]
    ServiceWaitTimeout {
        service: &'static str,
        timeout: Duration,
    },

    #[error(transparent)]
    Loop(#[from] liquidator_executor::LoopError),
}

pub type AppResult<T> = Result<T, AppError>;
