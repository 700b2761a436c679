//! Supported currencies
//!
//! Gold (`XAU`) is tracked in grams, the way Turkish businesses hold it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Turkish lira
    #[default]
    Try,
    Usd,
    Eur,
    Gbp,
    /// Gold, in grams
    Xau,
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[Self::Try, Self::Usd, Self::Eur, Self::Gbp, Self::Xau]
    }

    /// ISO-style three letter code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Try => "TRY",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Xau => "XAU",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Try => "₺",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Xau => "gr",
        }
    }

    /// Parse a currency code; common local aliases are accepted
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRY" | "TL" | "₺" => Some(Self::Try),
            "USD" | "$" => Some(Self::Usd),
            "EUR" | "€" => Some(Self::Eur),
            "GBP" | "£" => Some(Self::Gbp),
            "XAU" | "GOLD" | "ALTIN" | "GA" => Some(Self::Xau),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}
