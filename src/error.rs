//! Error types for Defter
//!
//! User-facing messages are Turkish. Validation failures carry a field-level
//! map so callers can point at the offending input.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::models::{Currency, Money};

/// Field-level validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Create an empty error map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error map with a single field message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message for a field; the first message per field wins
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Message recorded for a field, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Iterate over (field, message) pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Turn the collected messages into a result
    pub fn into_result(self) -> DefterResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DefterError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// The main error type for Defter operations
#[derive(Error, Debug)]
pub enum DefterError {
    #[error("Yapılandırma hatası: {0}")]
    Config(String),

    #[error("G/Ç hatası: {0}")]
    Io(String),

    #[error("JSON hatası: {0}")]
    Json(String),

    /// One or more input fields are invalid
    #[error("Doğrulama hatası: {0}")]
    Validation(ValidationErrors),

    #[error("{entity_type} bulunamadı: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("{entity_type} zaten mevcut: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The operation is not allowed in the record's current state
    #[error("İşlem yapılamaz: {0}")]
    Conflict(String),

    /// A payment would exceed the outstanding amount of its target
    #[error("Ödeme tutarı kalan tutarı aşıyor: kalan {remaining}, ödenmek istenen {attempted}")]
    Overpayment { remaining: Money, attempted: Money },

    #[error("Para birimi uyuşmuyor: beklenen {expected}, gelen {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    #[error("Depolama hatası: {0}")]
    Storage(String),

    #[error("Yedekleme hatası: {0}")]
    Backup(String),
}

impl DefterError {
    /// Shorthand for a single-field validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub fn party_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Cari",
            identifier: identifier.into(),
        }
    }

    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Kategori",
            identifier: identifier.into(),
        }
    }

    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "İşlem",
            identifier: identifier.into(),
        }
    }

    pub fn debt_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Borç",
            identifier: identifier.into(),
        }
    }

    pub fn installment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Taksit",
            identifier: identifier.into(),
        }
    }

    pub fn payment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Ödeme",
            identifier: identifier.into(),
        }
    }

    pub fn project_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Proje",
            identifier: identifier.into(),
        }
    }

    pub fn milestone_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Kilometre taşı",
            identifier: identifier.into(),
        }
    }

    pub fn grant_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Hibe",
            identifier: identifier.into(),
        }
    }

    pub fn rate_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Kur",
            identifier: identifier.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Field-level messages when this is a validation error
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for DefterError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<std::io::Error> for DefterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DefterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Defter operations
pub type DefterResult<T> = Result<T, DefterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DefterError::debt_not_found("dbt-1234abcd");
        assert_eq!(err.to_string(), "Borç bulunamadı: dbt-1234abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_map_keeps_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("amount", "Tutar sıfırdan büyük olmalıdır");
        errors.add("amount", "ikinci mesaj");
        errors.add("date", "Geçersiz tarih");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("amount"), Some("Tutar sıfırdan büyük olmalıdır"));

        let err: DefterError = errors.into();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Doğrulama hatası: amount: Tutar sıfırdan büyük olmalıdır; date: Geçersiz tarih"
        );
    }

    #[test]
    fn test_empty_validation_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_overpayment_message() {
        let err = DefterError::Overpayment {
            remaining: Money::from_cents(5000),
            attempted: Money::from_cents(7500),
        };
        assert_eq!(
            err.to_string(),
            "Ödeme tutarı kalan tutarı aşıyor: kalan 50.00, ödenmek istenen 75.00"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DefterError = io_err.into();
        assert!(matches!(err, DefterError::Io(_)));
    }
}
