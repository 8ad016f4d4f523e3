//! Exchange indexer access for the liquidation bot.
//!
//! - [`ExchangeClient`]: the narrow query capability the bot depends on
//! - [`HttpExchangeClient`]: JSON-over-HTTP implementation against the indexer
//! - [`MockExchangeClient`]: scripted stand-in for tests
//! - [`MarketsAssistant`]: market id -> [`MarketMetadata`] lookup, loaded once
//!
//! [`MarketMetadata`]: liquidator_core::MarketMetadata

pub mod client;
pub mod error;
pub mod markets;

pub use client::{
    BoxFuture, DynExchangeClient, ExchangeClient, HttpExchangeClient, MockExchangeClient,
    VersionInfo,
};
pub use error::{ExchangeError, ExchangeResult};
pub use markets::{MarketsAssistant, RawDerivativeMarket, RawTokenMeta};
