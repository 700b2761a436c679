//! Money type for representing currency amounts
//!
//! Amounts are stored as signed minor units (kuruş, cents) in an i64. Rates
//! and percentages are applied through `rust_decimal` so no floating point
//! ever touches an amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use super::currency::Currency;

/// A monetary amount in minor units (hundredths of the currency unit)
///
/// The currency itself lives on the owning record; `Money` is only the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount a record may carry: one trillion units
    ///
    /// Sums and tax breakdowns of amounts within this limit stay far inside
    /// the i64 range.
    pub const MAX: Money = Money(100_000_000_000_000);

    /// Create a Money amount from minor units
    ///
    /// # Examples
    /// ```
    /// use defter::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units and minor units
    pub const fn from_units(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Amount in minor units
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Minor-unit part (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Magnitude is above `Money::MAX`
    pub const fn exceeds_limit(&self) -> bool {
        self.0.unsigned_abs() > Self::MAX.0 as u64
    }

    /// Smaller of two amounts
    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// The amount as a decimal number of whole units (10.50)
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Build an amount from a decimal number of whole units
    ///
    /// Rounds half away from zero to two places. Values beyond the i64
    /// range saturate.
    pub fn from_decimal(value: Decimal) -> Self {
        let scaled = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero));
        Self::saturating(value, scaled)
    }

    /// Build an amount from a decimal, truncating extra digits toward zero
    pub fn from_decimal_truncated(value: Decimal) -> Self {
        let scaled = value.checked_mul(Decimal::ONE_HUNDRED).map(|v| v.trunc());
        Self::saturating(value, scaled)
    }

    fn saturating(value: Decimal, scaled: Option<Decimal>) -> Self {
        match scaled.and_then(|s| s.to_i64()) {
            Some(cents) => Self(cents),
            None if value.is_sign_negative() => Self(i64::MIN),
            None => Self(i64::MAX),
        }
    }

    /// Multiply by a decimal factor, rounding to minor units
    ///
    /// Saturates instead of overflowing.
    pub fn mul_decimal(&self, factor: Decimal) -> Self {
        match self.to_decimal().checked_mul(factor) {
            Some(product) => Self::from_decimal(product),
            None if self.is_negative() != factor.is_sign_negative() => Self(i64::MIN),
            None => Self(i64::MAX),
        }
    }

    /// Parse an amount from user input
    ///
    /// Accepts "10.50", "10,50", "-10.50", "₺10.50" and "10". A comma is
    /// treated as the decimal separator when no dot is present. Amounts above
    /// `Money::MAX` are rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };
        let rest = rest.trim_start_matches(['₺', '$', '€', '£']).trim();

        let normalized = if rest.contains('.') {
            rest.replace(',', "")
        } else {
            rest.replace(',', ".")
        };

        if normalized.is_empty() || normalized.starts_with('-') {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let value = Decimal::from_str(&normalized)
            .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;
        if value.scale() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        if value > Self::MAX.to_decimal() {
            return Err(MoneyParseError::TooLarge(s.to_string()));
        }

        let money = Self::from_decimal(value);
        Ok(if negative { -money } else { money })
    }

    /// Format with the currency code, e.g. "1250.00 TRY"
    pub fn format_with_currency(&self, currency: Currency) -> String {
        format!("{} {}", self, currency.code())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.is_negative() {
            format!("-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            format!("{}.{:02}", self.units(), self.cents_part())
        };
        f.pad(&text)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooPrecise(String),
    TooLarge(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Geçersiz tutar biçimi: {}", s),
            Self::TooPrecise(s) => write!(f, "Tutar en fazla iki ondalık basamak içerebilir: {}", s),
            Self::TooLarge(s) => write!(f, "Tutar en fazla {} olabilir: {}", Money::MAX, s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(format!("{:>8}", Money::from_cents(5)), "    0.05");
    }

    #[test]
    fn test_parse_accepts_dot_and_comma() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10,50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("1,250.75").unwrap().cents(), 125075);
        assert_eq!(Money::parse("₺10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-3").unwrap().cents(), -300);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("--5").is_err());
        assert!(matches!(
            Money::parse("1.234"),
            Err(MoneyParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_parse_rejects_amounts_above_limit() {
        assert!(matches!(
            Money::parse("79228162514264337593543950335"),
            Err(MoneyParseError::TooLarge(_))
        ));
        assert!(matches!(
            Money::parse("-90000000000000000"),
            Err(MoneyParseError::TooLarge(_))
        ));
        assert_eq!(Money::parse("1000000000000").unwrap(), Money::MAX);
        assert!(Money::parse("1000000000000.01").is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(i64::MAX);
        assert_eq!((huge + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((-huge - Money::from_cents(10)).cents(), i64::MIN);
        assert_eq!(huge.mul_decimal(dec!(1000000)).cents(), i64::MAX);
        assert_eq!(Money::from_decimal(Decimal::MAX).cents(), i64::MAX);
        assert!(huge.exceeds_limit());
        assert!(!Money::MAX.exceeds_limit());
    }

    #[test]
    fn test_decimal_conversion_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(0.005)).cents(), 1);
        assert_eq!(Money::from_decimal(dec!(-0.005)).cents(), -1);
        assert_eq!(Money::from_decimal(dec!(33.334)).cents(), 3333);
        assert_eq!(Money::from_cents(12345).to_decimal(), dec!(123.45));
    }

    #[test]
    fn test_truncated_conversion() {
        assert_eq!(Money::from_decimal_truncated(dec!(33.3399)).cents(), 3333);
    }

    #[test]
    fn test_mul_decimal() {
        // 100.00 USD at 32.5432 = 3254.32 TRY
        assert_eq!(Money::from_cents(10000).mul_decimal(dec!(32.5432)).cents(), 325432);
    }

    #[test]
    fn test_sum_and_min() {
        let amounts = [Money::from_cents(100), Money::from_cents(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 350);
        assert_eq!(amounts[0].min(amounts[1]).cents(), 100);
    }

    #[test]
    fn test_format_with_currency() {
        assert_eq!(
            Money::from_cents(125000).format_with_currency(Currency::Try),
            "1250.00 TRY"
        );
    }
}
