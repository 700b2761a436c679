//! Party model
//!
//! A party (cari hesap) is a customer or supplier that transactions, debts
//! and projects refer to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PartyId;
use crate::error::ValidationErrors;

/// Role of a party towards the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    #[default]
    Customer,
    Supplier,
    /// Both sells to and buys from us
    Both,
}

impl PartyKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "musteri" | "müşteri" => Some(Self::Customer),
            "supplier" | "tedarikci" | "tedarikçi" => Some(Self::Supplier),
            "both" | "ikisi" => Some(Self::Both),
            _ => None,
        }
    }
}

impl fmt::Display for PartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Customer => "Müşteri",
            Self::Supplier => "Tedarikçi",
            Self::Both => "Müşteri/Tedarikçi",
        };
        f.pad(label)
    }
}

/// A customer or supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,

    pub name: String,

    pub kind: PartyKind,

    /// VKN (10 digits) or TCKN (11 digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_office: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub archived: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Party {
    pub fn new(name: impl Into<String>, kind: PartyKind) -> Self {
        let now = Utc::now();
        Self {
            id: PartyId::new(),
            name: name.into(),
            kind,
            tax_number: None,
            tax_office: None,
            phone: None,
            email: None,
            address: None,
            notes: String::new(),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Cari adı boş olamaz");
        } else if name.chars().count() > 150 {
            errors.add("name", "Cari adı en fazla 150 karakter olabilir");
        }

        if let Some(tax_number) = &self.tax_number {
            let digits_only = tax_number.chars().all(|c| c.is_ascii_digit());
            if !digits_only || !(tax_number.len() == 10 || tax_number.len() == 11) {
                errors.add(
                    "tax_number",
                    "Vergi numarası 10 (VKN) veya 11 (TCKN) haneli olmalıdır",
                );
            }
        }

        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                errors.add("email", "Geçersiz e-posta adresi");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_party_is_valid() {
        let party = Party::new("Acme Ltd", PartyKind::Customer);
        assert!(party.validate().is_ok());
        assert!(!party.archived);
    }

    #[test]
    fn test_validation_collects_field_errors() {
        let mut party = Party::new("  ", PartyKind::Supplier);
        party.tax_number = Some("12345".into());
        party.email = Some("not-an-email".into());

        let errors = party.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.get("name").is_some());
        assert!(errors.get("tax_number").is_some());
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn test_tax_number_lengths() {
        let mut party = Party::new("Vergi", PartyKind::Both);
        party.tax_number = Some("1234567890".into());
        assert!(party.validate().is_ok());
        party.tax_number = Some("12345678901".into());
        assert!(party.validate().is_ok());
        party.tax_number = Some("12345678A0".into());
        assert!(party.validate().is_err());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(PartyKind::parse("Müşteri"), Some(PartyKind::Customer));
        assert_eq!(PartyKind::parse("supplier"), Some(PartyKind::Supplier));
        assert_eq!(PartyKind::parse("x"), None);
    }
}
