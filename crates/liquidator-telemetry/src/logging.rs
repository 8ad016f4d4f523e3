//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use std::backtrace::Backtrace;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging.
///
/// `RUST_LOG` wins over `default_filter` when set. Output is JSON when
/// `RUST_ENV=production` and pretty otherwise.
pub fn init_logging(default_filter: &str) -> TelemetryResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: default_filter.to_string(),
            reason: e.to_string(),
        })?,
    };

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Route panics through tracing with a captured backtrace.
///
/// The liquidation loop turns a panic into a terminal error; this hook is
/// where the stack trace of that panic gets recorded.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        error!(panic = %info, backtrace = %backtrace, "Panic occurred");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_default_filter_rejected() {
        // Only meaningful when RUST_LOG does not override the default.
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let err = init_logging("liquidator=notalevel").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }
}
