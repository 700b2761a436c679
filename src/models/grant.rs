//! Grant model
//!
//! Grant funding is a percentage of a project's contract amount. The amount
//! is recomputed whenever the percentage or the contract changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{GrantId, ProjectId};
use super::money::Money;
use super::percent::Percent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantProvider {
    Tubitak,
    Kosgeb,
    Other(String),
}

impl GrantProvider {
    /// Parse a provider; unknown names become `Other`
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "tubitak" | "tübitak" => Self::Tubitak,
            "kosgeb" => Self::Kosgeb,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for GrantProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tubitak => f.pad("TÜBİTAK"),
            Self::Kosgeb => f.pad("KOSGEB"),
            Self::Other(name) => f.pad(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    #[default]
    Pending,
    Partial,
    Received,
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pending => "Bekliyor",
            Self::Partial => "Kısmi",
            Self::Received => "Alındı",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,

    pub project_id: ProjectId,

    pub provider: GrantProvider,

    #[serde(default)]
    pub program: String,

    pub percentage: Percent,

    /// contract amount × percentage, in the project currency
    pub amount: Money,

    pub currency: Currency,

    #[serde(default)]
    pub received_amount: Money,

    #[serde(default)]
    pub status: GrantStatus,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Grant {
    pub fn new(
        project_id: ProjectId,
        provider: GrantProvider,
        percentage: Percent,
        amount: Money,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GrantId::new(),
            project_id,
            provider,
            program: String::new(),
            percentage,
            amount,
            currency,
            received_amount: Money::zero(),
            status: GrantStatus::Pending,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining(&self) -> Money {
        self.amount - self.received_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(GrantProvider::parse("TÜBİTAK"), GrantProvider::Tubitak);
        assert_eq!(GrantProvider::parse("kosgeb"), GrantProvider::Kosgeb);
        assert_eq!(
            GrantProvider::parse(" Kalkınma Ajansı "),
            GrantProvider::Other("Kalkınma Ajansı".into())
        );
    }

    #[test]
    fn test_provider_serialization() {
        let json = serde_json::to_string(&GrantProvider::Tubitak).unwrap();
        assert_eq!(json, "\"tubitak\"");
        let other: GrantProvider = serde_json::from_str(r#"{"other":"AB"}"#).unwrap();
        assert_eq!(other, GrantProvider::Other("AB".into()));
    }
}
