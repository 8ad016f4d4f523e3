//! Prometheus metrics and structured logging for the liquidation bot.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - A panic hook that routes panics and their backtraces through tracing
//! - Per-operation call, error and timing metrics plus liquidation outcomes
//! - A `/metrics` HTTP endpoint for Prometheus scraping

pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, install_panic_hook};
pub use metrics::{FuncTimer, Metrics};
pub use server::{metrics_router, MetricsServer};
