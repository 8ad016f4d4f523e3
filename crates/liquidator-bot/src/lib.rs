//! Automated liquidation bot for one derivative market.
//!
//! Orchestrates:
//! - Configuration loading and validation
//! - Network profile resolution
//! - Startup service checks and market lookup
//! - The liquidation loop, with ctrl-c shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod network;

pub use app::{wait_for_service, Application};
pub use config::{AppConfig, LiquidatorSettings, OperatingMode};
pub use error::{AppError, AppResult};
pub use network::{NetworkConfig, NetworkProfile};
