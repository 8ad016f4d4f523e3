//! Precision-safe decimal types for order construction.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Chain amounts are
//! fixed-point values, so float rounding would produce orders the chain
//! rejects for not sitting on a tick.

use crate::error::{CoreError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a decimal string as reported by the exchange or the config file.
pub fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|source| CoreError::InvalidDecimal {
        value: value.to_string(),
        source,
    })
}

/// `10^exp` as a decimal.
pub fn pow10(exp: u32) -> Result<Decimal> {
    10i128
        .checked_pow(exp)
        .and_then(|v| Decimal::try_from_i128_with_scale(v, 0).ok())
        .ok_or_else(|| CoreError::Overflow(format!("10^{exp}")))
}

/// `a * b`, or an overflow error naming `what`.
#[inline]
pub fn checked_mul(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| CoreError::Overflow(format!("{what}: {a} * {b}")))
}

/// `a / b`, or an overflow error naming `what`. Division by zero is an error too.
#[inline]
pub fn checked_div(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| CoreError::Overflow(format!("{what}: {a} / {b}")))
}

/// Round `value` to the nearest multiple of `tick`, midpoints away from zero.
pub fn quantize(value: Decimal, tick: Decimal) -> Result<Decimal> {
    if tick.is_zero() {
        return Ok(value);
    }
    let steps = checked_div(value, tick, "quantize")?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    checked_mul(steps, tick, "quantize")
}

/// Round `value` down to a multiple of `tick`.
pub fn floor_to_tick(value: Decimal, tick: Decimal) -> Result<Decimal> {
    if tick.is_zero() {
        return Ok(value);
    }
    let steps = checked_div(value, tick, "floor to tick")?.floor();
    checked_mul(steps, tick, "floor to tick")
}

/// Price with exact decimal precision.
///
/// Whether a `Price` is human-readable or chain-formatted is decided by the
/// `MarketMetadata` method that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        parse_decimal(s).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Order or position quantity with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(pub Decimal);

impl Quantity {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round down to the quantity tick.
    pub fn floor_to_tick(&self, tick: Decimal) -> Result<Self> {
        floor_to_tick(self.0, tick).map(Self)
    }

    /// Notional value: quantity * price.
    pub fn notional(&self, price: Price) -> Result<Decimal> {
        checked_mul(self.0, price.0, "notional")
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        parse_decimal(s).map(Self)
    }
}

impl From<Decimal> for Quantity {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}
