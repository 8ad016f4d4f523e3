//! Integration tests for liquidator-bot.
//!
//! These tests run the application against scripted exchange and chain
//! clients:
//! - Startup sequence and market resolution
//! - Direct and delegated liquidation end to end
//! - Failure tolerance and shutdown

pub mod common;
