//! Exchange rate model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::ExchangeRateId;

/// Where a rate was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    #[default]
    Manual,
    /// Central bank bulletin
    Tcmb,
    /// Gold market price
    Gold,
}

impl RateSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" | "elle" => Some(Self::Manual),
            "tcmb" => Some(Self::Tcmb),
            "gold" | "altin" | "altın" => Some(Self::Gold),
            _ => None,
        }
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Manual => "Elle",
            Self::Tcmb => "TCMB",
            Self::Gold => "Altın",
        })
    }
}

/// Units of base currency per one unit of `currency` on `date`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: ExchangeRateId,

    pub currency: Currency,

    pub date: NaiveDate,

    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,

    #[serde(default)]
    pub source: RateSource,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(currency: Currency, date: NaiveDate, rate: Decimal, source: RateSource) -> Self {
        let now = Utc::now();
        Self {
            id: ExchangeRateId::new(),
            currency,
            date,
            rate,
            source,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_serializes_as_string() {
        let rate = ExchangeRate::new(
            Currency::Usd,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            dec!(35.1234),
            RateSource::Tcmb,
        );
        let json = serde_json::to_value(&rate).unwrap();
        assert_eq!(json["rate"], "35.1234");
        assert_eq!(json["source"], "tcmb");
    }
}
