//! Liquidation order sizing.
//!
//! The order quantity is the smallest of the position quantity, the
//! configured notional cap divided by the mark price, and the configured
//! amount cap. The notional cap is expressed in the same units as the
//! exchange-reported mark price.

use crate::error::SizingError;
use liquidator_core::decimal::parse_decimal;
use liquidator_core::{MarketMetadata, PositionSnapshot, Quantity};
use rust_decimal::Decimal;

/// Caps applied to every liquidation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSizingPolicy {
    max_order_amount: Decimal,
    max_order_notional: Decimal,
}

impl OrderSizingPolicy {
    /// Sentinel for a cap that never binds.
    pub const UNBOUNDED: Decimal = Decimal::MAX;

    pub fn new(max_order_amount: Decimal, max_order_notional: Decimal) -> Self {
        Self {
            max_order_amount,
            max_order_notional,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(Self::UNBOUNDED, Self::UNBOUNDED)
    }

    /// Build from config strings. An empty string leaves that cap unbounded.
    pub fn from_config(max_order_amount: &str, max_order_notional: &str) -> Result<Self, SizingError> {
        Ok(Self::new(
            parse_limit("max_order_amount", max_order_amount)?,
            parse_limit("max_order_notional", max_order_notional)?,
        ))
    }

    pub fn max_order_amount(&self) -> Decimal {
        self.max_order_amount
    }

    pub fn max_order_notional(&self) -> Decimal {
        self.max_order_notional
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_order_amount == Self::UNBOUNDED && self.max_order_notional == Self::UNBOUNDED
    }
}

impl Default for OrderSizingPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

fn parse_limit(field: &'static str, raw: &str) -> Result<Decimal, SizingError> {
    if raw.trim().is_empty() {
        return Ok(OrderSizingPolicy::UNBOUNDED);
    }
    let value = parse_decimal(raw).map_err(|_| SizingError::InvalidDecimal {
        field,
        value: raw.to_string(),
    })?;
    if value <= Decimal::ZERO {
        return Err(SizingError::NonPositiveLimit { field, value });
    }
    Ok(value)
}

/// Capped order quantity for `position`, before tick clamping.
pub fn compute_order_quantity(
    position: &PositionSnapshot,
    policy: &OrderSizingPolicy,
) -> Result<Decimal, SizingError> {
    let mark_price = position
        .parsed_mark_price()
        .map_err(|_| SizingError::InvalidDecimal {
            field: "mark_price",
            value: position.mark_price.clone(),
        })?
        .inner();
    let quantity = position
        .parsed_quantity()
        .map_err(|_| SizingError::InvalidDecimal {
            field: "quantity",
            value: position.quantity.clone(),
        })?
        .inner();

    if mark_price <= Decimal::ZERO {
        return Err(SizingError::NonPositiveMarkPrice(mark_price));
    }
    if quantity <= Decimal::ZERO {
        return Err(SizingError::NonPositiveQuantity(quantity));
    }

    // Overflow only happens for a huge cap over a tiny price, where the
    // notional cap could never bind anyway.
    let mut amount = quantity.min(policy.max_order_amount);
    if let Some(from_notional) = policy.max_order_notional.checked_div(mark_price) {
        amount = amount.min(from_notional);
    }
    Ok(amount)
}

/// Capped order quantity floored to `market`'s quantity tick.
pub fn size_order(
    position: &PositionSnapshot,
    policy: &OrderSizingPolicy,
    market: &MarketMetadata,
) -> Result<Quantity, SizingError> {
    let computed = compute_order_quantity(position, policy)?;
    let tick = market.min_quantity_tick_size;
    let clamped = market
        .clamp_quantity(computed)
        .map_err(|_| SizingError::Overflow { computed, tick })?;
    if clamped <= Decimal::ZERO {
        return Err(SizingError::BelowMinQuantity { computed, tick });
    }
    Ok(Quantity::new(clamped))
}
