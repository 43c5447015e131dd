//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are decimal amounts in the store currency. The local store persists
//! them as integer cents, so the conversions here are the single place where
//! the storage representation is decided.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a [`Price`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from integer cents (the storage representation).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Convert to integer cents for storage, rounding to the nearest cent.
    #[must_use]
    pub fn as_cents(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Parse a price from a decimal string such as `"2.50"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the input is not a decimal number and
    /// `PriceError::Negative` if it parses below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn line_total(&self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_roundtrip() {
        let price = Price::from_cents(250);
        assert_eq!(price.to_string(), "2.50");
        assert_eq!(price.as_cents(), 250);
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("2.50").unwrap(), Price::from_cents(250));
        assert_eq!(Price::parse(" 8 ").unwrap(), Price::from_cents(800));
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse(""), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-1.00"), Err(PriceError::Negative));
    }

    #[test]
    fn test_line_total_and_sum() {
        let a = Price::from_cents(250).line_total(2);
        let b = Price::from_cents(300).line_total(1);
        let total: Price = [a, b].into_iter().sum();
        assert_eq!(total, Price::from_cents(800));
        assert_eq!(total.to_string(), "8.00");
    }

    #[test]
    fn test_serde_as_decimal_string() {
        let price = Price::parse("4.20").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"4.20\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }
}
