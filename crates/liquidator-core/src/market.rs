//! Derivative market metadata and chain-format conversions.
//!
//! The exchange stores prices and margins as fixed-point values scaled by
//! the quote token's decimals and quantized to the market's tick sizes.
//! Derivative quantities are not scaled, only quantized. Tick sizes are
//! kept in chain format exactly as the exchange reports them.

use crate::decimal::{checked_div, checked_mul, floor_to_tick, pow10, quantize, Price, Quantity};
use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest quote decimals a market may declare.
pub const MAX_QUOTE_DECIMALS: u32 = 18;

/// Immutable description of one derivative market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetadata {
    /// Market id (0x-prefixed hash).
    pub id: String,

    /// Human-readable ticker, e.g. "BTC/USDT PERP".
    pub ticker: String,

    /// Decimals of the quote token.
    pub quote_decimals: u32,

    /// Minimum price increment, chain format.
    pub min_price_tick_size: Decimal,

    /// Minimum quantity increment, chain format.
    pub min_quantity_tick_size: Decimal,

    pub initial_margin_ratio: Decimal,
    pub maintenance_margin_ratio: Decimal,
    pub maker_fee_rate: Decimal,
    pub taker_fee_rate: Decimal,
}

impl MarketMetadata {
    /// Validate the parameters that the conversions depend on.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CoreError::InvalidMarket("empty market id".to_string()));
        }
        if self.quote_decimals > MAX_QUOTE_DECIMALS {
            return Err(CoreError::InvalidMarket(format!(
                "{}: quote decimals {} exceed {}",
                self.id, self.quote_decimals, MAX_QUOTE_DECIMALS
            )));
        }
        if self.min_price_tick_size <= Decimal::ZERO || self.min_quantity_tick_size <= Decimal::ZERO
        {
            return Err(CoreError::InvalidMarket(format!(
                "{}: tick sizes must be positive (price {}, quantity {})",
                self.id, self.min_price_tick_size, self.min_quantity_tick_size
            )));
        }
        Ok(())
    }

    pub fn quantity_to_chain_format(&self, quantity: Quantity) -> Result<Quantity> {
        quantize(quantity.inner(), self.min_quantity_tick_size).map(Quantity::new)
    }

    pub fn quantity_from_chain_format(&self, quantity: Quantity) -> Quantity {
        quantity
    }

    pub fn price_to_chain_format(&self, price: Price) -> Result<Price> {
        let scaled = checked_mul(price.inner(), pow10(self.quote_decimals)?, "price scaling")?;
        quantize(scaled, self.min_price_tick_size).map(Price::new)
    }

    pub fn price_from_chain_format(&self, price: Price) -> Result<Price> {
        checked_div(price.inner(), pow10(self.quote_decimals)?, "price scaling").map(Price::new)
    }

    /// Margin for an order of `quantity` at `price` and `leverage`, chain format.
    ///
    /// The chain validates margin against the quantity tick, not the price
    /// tick, so that is the tick used for quantization here.
    pub fn calculate_margin_in_chain_format(
        &self,
        quantity: Quantity,
        price: Price,
        leverage: Decimal,
    ) -> Result<Decimal> {
        let margin = checked_div(quantity.notional(price)?, leverage, "margin")?;
        let scaled = checked_mul(margin, pow10(self.quote_decimals)?, "margin scaling")?;
        quantize(scaled, self.min_quantity_tick_size)
    }

    /// Clamp a chain-format quantity down to the quantity tick.
    pub fn clamp_quantity(&self, quantity: Decimal) -> Result<Decimal> {
        floor_to_tick(quantity, self.min_quantity_tick_size)
    }
}

impl fmt::Display for MarketMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ticker, self.id)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::btc_usdt_perp;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_round_trip_through_chain_format() {
        let market = btc_usdt_perp();
        let chain = Price::new(dec!(3400000000));

        let human = market.price_from_chain_format(chain).unwrap();
        assert_eq!(human.inner(), dec!(3400));
        assert_eq!(market.price_to_chain_format(human).unwrap(), chain);
    }

    #[test]
    fn test_price_to_chain_format_quantizes_to_tick() {
        let market = btc_usdt_perp();
        // 3400.7 * 10^6 = 3_400_700_000 -> nearest 1_000_000 tick
        let chain = market
            .price_to_chain_format(Price::new(dec!(3400.7)))
            .unwrap();
        assert_eq!(chain.inner(), dec!(3401000000));
    }

    #[test]
    fn test_quantity_conversion_is_unscaled() {
        let market = btc_usdt_perp();
        let q = Quantity::new(dec!(1.23456));
        assert_eq!(market.quantity_from_chain_format(q), q);
        assert_eq!(market.quantity_to_chain_format(q).unwrap().inner(), dec!(1.2346));
    }

    #[test]
    fn test_margin_at_unit_leverage() {
        let market = btc_usdt_perp();
        let margin = market.calculate_margin_in_chain_format(
            Quantity::new(dec!(1)),
            Price::new(dec!(3400)),
            Decimal::ONE,
        )
        .unwrap();
        assert_eq!(margin, dec!(3400000000));
    }

    #[test]
    fn test_margin_scales_with_leverage() {
        let market = btc_usdt_perp();
        let margin = market.calculate_margin_in_chain_format(
            Quantity::new(dec!(2)),
            Price::new(dec!(3400)),
            dec!(4),
        )
        .unwrap();
        assert_eq!(margin, dec!(1700000000));
    }

    #[test]
    fn test_margin_overflow_is_an_error() {
        let market = btc_usdt_perp();
        // 1e16 * 3400 * 10^6 / 0.0001 is beyond the decimal range.
        let result = market.calculate_margin_in_chain_format(
            Quantity::new(dec!(10000000000000000)),
            Price::new(dec!(3400)),
            Decimal::ONE,
        );
        assert!(matches!(result, Err(CoreError::Overflow(_))));
    }

    #[test]
    fn test_unvalidated_quote_decimals_do_not_panic() {
        let mut market = btc_usdt_perp();
        market.quote_decimals = 40;
        let price = Price::new(dec!(3400000000));
        assert!(matches!(
            market.price_from_chain_format(price),
            Err(CoreError::Overflow(_))
        ));
        assert!(market.price_to_chain_format(price).is_err());
    }

    #[test]
    fn test_clamp_quantity_floors() {
        let market = btc_usdt_perp();
        assert_eq!(market.clamp_quantity(dec!(0.00019)).unwrap(), dec!(0.0001));
        assert_eq!(market.clamp_quantity(dec!(0.00009)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_validate_rejects_bad_metadata() {
        let mut market = btc_usdt_perp();
        assert!(market.validate().is_ok());

        market.quote_decimals = 19;
        assert!(market.validate().is_err());

        let mut market = btc_usdt_perp();
        market.min_quantity_tick_size = Decimal::ZERO;
        assert!(market.validate().is_err());
    }
}
