//! Percentage type for VAT, withholding and grant ratios

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// A percentage in the closed range 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub fn new(value: Decimal) -> Result<Self, PercentError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(PercentError::OutOfRange(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Build from a whole number of percent; values above 100 are clamped
    pub fn whole(value: u8) -> Self {
        Self(Decimal::from(value.min(100)))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The ratio this percentage represents (20% -> 0.2)
    pub fn ratio(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// This percentage of an amount, rounded to minor units
    pub fn of(&self, amount: Money) -> Money {
        amount.mul_decimal(self.ratio())
    }

    /// Parse user input such as "20", "%20", "20%" or "0,5"
    pub fn parse(s: &str) -> Result<Self, PercentError> {
        let cleaned = s.trim().trim_start_matches('%').trim_end_matches('%').trim();
        let value = Decimal::from_str(&cleaned.replace(',', "."))
            .map_err(|_| PercentError::InvalidFormat(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = PercentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("%{}", self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PercentError {
    InvalidFormat(String),
    OutOfRange(Decimal),
}

impl fmt::Display for PercentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Geçersiz oran: {}", s),
            Self::OutOfRange(v) => write!(f, "Oran 0 ile 100 arasında olmalıdır: {}", v),
        }
    }
}

impl std::error::Error for PercentError {}
