//! Category model
//!
//! Categories classify transactions as a kind of income or expense.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::transaction::TransactionKind;
use crate::error::ValidationErrors;

/// Default categories created on first run
pub const DEFAULT_INCOME_CATEGORIES: &[&str] =
    &["Satış", "Hizmet Geliri", "Faiz Geliri", "Hibe Geliri", "Diğer Gelir"];

pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Kira",
    "Maaş",
    "Vergi ve SGK",
    "Faturalar",
    "Malzeme",
    "Ulaşım",
    "Danışmanlık",
    "Diğer Gider",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    /// Income categories only apply to income transactions and vice versa
    pub kind: TransactionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub archived: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            color: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// All default categories, income first
    pub fn defaults() -> Vec<Category> {
        DEFAULT_INCOME_CATEGORIES
            .iter()
            .map(|name| Category::new(*name, TransactionKind::Income))
            .chain(
                DEFAULT_EXPENSE_CATEGORIES
                    .iter()
                    .map(|name| Category::new(*name, TransactionKind::Expense)),
            )
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Kategori adı boş olamaz");
        } else if self.name.chars().count() > 50 {
            errors.add("name", "Kategori adı en fazla 50 karakter olabilir");
        }

        if let Some(color) = &self.color {
            let hex = color.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                errors.add("color", "Renk #RRGGBB biçiminde olmalıdır");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
