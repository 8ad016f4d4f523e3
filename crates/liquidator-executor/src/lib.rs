//! Liquidation pipeline for one derivative market.
//!
//! # Key Components
//!
//! - [`PositionScanner`]: fetches liquidable positions from the exchange
//! - [`OrderSizingPolicy`] / [`size_order`]: capped, tick-aligned order quantity
//! - [`MessageBuilder`]: direct or authz-wrapped liquidation messages
//! - [`Broadcaster`]: per-message broadcast through a [`ChainClient`]
//! - [`LiquidationLoop`]: the cancellable polling loop tying them together
//!
//! # Per-position flow (in `LiquidationLoop::run_cycle`)
//!
//! 1. Sizing error -> skipped (warn)
//! 2. Build error -> failed (error)
//! 3. Broadcast error or non-zero code -> failed (error)
//! 4. Otherwise -> submitted

pub mod broadcaster;
pub mod builder;
pub mod chain;
pub mod error;
pub mod liquidation_loop;
pub mod scanner;
pub mod sizer;

#[cfg(test)]
mod test_support;

pub use broadcaster::Broadcaster;
pub use builder::{build_liquidation_message, AccountContext, DelegationContext, MessageBuilder};
pub use chain::{
    BroadcastAck, ChainClient, DryRunChainClient, DynChainClient, GatewayChainClient,
    MockChainClient,
};
pub use error::{ExecutorError, ExecutorResult, LoopError, SizingError};
pub use liquidation_loop::{CycleReport, LiquidationLoop, LoopState, DEFAULT_POLL_INTERVAL};
pub use scanner::PositionScanner;
pub use sizer::{compute_order_quantity, size_order, OrderSizingPolicy};
