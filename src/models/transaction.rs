//! Transaction model
//!
//! An income or expense entry. The entered amount is kept as typed; the VAT
//! and withholding breakdown and the base-currency value are computed by the
//! transaction service when the record is saved.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{CategoryId, PartyId, PaymentId, ProjectId, TransactionId};
use super::money::Money;
use super::percent::Percent;
use crate::error::ValidationErrors;

/// Direction of a transaction (and the kind of a category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "gelir" => Some(Self::Income),
            "expense" | "gider" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Income => "Gelir",
            Self::Expense => "Gider",
        })
    }
}

/// How money moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    BankTransfer,
    CreditCard,
    Check,
    Other,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "nakit" => Some(Self::Cash),
            "bank" | "bank_transfer" | "havale" | "eft" => Some(Self::BankTransfer),
            "card" | "credit_card" | "kart" => Some(Self::CreditCard),
            "check" | "cek" | "çek" => Some(Self::Check),
            "other" | "diger" | "diğer" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Cash => "Nakit",
            Self::BankTransfer => "Havale/EFT",
            Self::CreditCard => "Kredi Kartı",
            Self::Check => "Çek",
            Self::Other => "Diğer",
        })
    }
}

/// VAT and withholding split of an amount, all in the transaction currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxBreakdown {
    /// Amount before VAT
    pub base: Money,
    pub vat: Money,
    pub withholding: Money,
    /// base + vat - withholding
    pub net: Money,
}

impl TaxBreakdown {
    /// Breakdown of an amount that carries no tax
    pub fn untaxed(amount: Money) -> Self {
        Self {
            base: amount,
            vat: Money::zero(),
            withholding: Money::zero(),
            net: amount,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.base + self.vat - self.withholding == self.net
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub kind: TransactionKind,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<PartyId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    /// Amount as entered (always positive; `kind` carries the direction)
    pub amount: Money,

    pub currency: Currency,

    #[serde(default)]
    pub vat_rate: Percent,

    #[serde(default)]
    pub withholding_rate: Percent,

    /// Whether `amount` already includes VAT
    #[serde(default)]
    pub vat_included: bool,

    pub tax: TaxBreakdown,

    /// Units of base currency per unit of `currency` on `date`
    pub exchange_rate: Decimal,

    pub base_currency: Currency,

    /// `tax.net` converted to the base currency
    pub base_net: Money,

    #[serde(default)]
    pub method: PaymentMethod,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_no: Option<String>,

    /// Set when the transaction was generated by recording a payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create an untaxed transaction valued in its own currency
    pub fn new(kind: TransactionKind, date: NaiveDate, amount: Money, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            kind,
            date,
            party_id: None,
            category_id: None,
            project_id: None,
            amount,
            currency,
            vat_rate: Percent::zero(),
            withholding_rate: Percent::zero(),
            vat_included: false,
            tax: TaxBreakdown::untaxed(amount),
            exchange_rate: Decimal::ONE,
            base_currency: currency,
            base_net: amount,
            method: PaymentMethod::default(),
            description: String::new(),
            document_no: None,
            payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Generated by a payment; edited only through the payment
    pub fn is_generated(&self) -> bool {
        self.payment_id.is_some()
    }

    /// Base-currency net, positive for income and negative for expense
    pub fn signed_base_net(&self) -> Money {
        match self.kind {
            TransactionKind::Income => self.base_net,
            TransactionKind::Expense => -self.base_net,
        }
    }

    /// Convert an amount in this transaction's currency with its stored rate
    pub fn to_base(&self, amount: Money) -> Money {
        amount.mul_decimal(self.exchange_rate)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.amount.is_positive() {
            errors.add("amount", "Tutar sıfırdan büyük olmalıdır");
        } else if self.amount.exceeds_limit() {
            errors.add("amount", format!("Tutar en fazla {} olabilir", Money::MAX));
        } else if self.base_net.exceeds_limit() {
            errors.add("base_net", format!("Ana para birimindeki tutar en fazla {} olabilir", Money::MAX));
        }

        if self.exchange_rate <= Decimal::ZERO {
            errors.add("exchange_rate", "Kur sıfırdan büyük olmalıdır");
        }

        if !self.tax.is_consistent() {
            errors.add("tax", "Vergi dökümü tutarla uyuşmuyor");
        }

        if self.description.chars().count() > 500 {
            errors.add("description", "Açıklama en fazla 500 karakter olabilir");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.tax.net,
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_new_transaction_is_untaxed() {
        let txn = Transaction::new(TransactionKind::Income, date(), Money::from_cents(10000), Currency::Try);
        assert_eq!(txn.tax.net.cents(), 10000);
        assert_eq!(txn.base_net.cents(), 10000);
        assert!(txn.validate().is_ok());
        assert!(!txn.is_generated());
    }

    #[test]
    fn test_signed_base_net() {
        let income = Transaction::new(TransactionKind::Income, date(), Money::from_cents(500), Currency::Try);
        let expense = Transaction::new(TransactionKind::Expense, date(), Money::from_cents(500), Currency::Try);
        assert_eq!(income.signed_base_net().cents(), 500);
        assert_eq!(expense.signed_base_net().cents(), -500);
    }

    #[test]
    fn test_validation_rejects_non_positive_amount() {
        let txn = Transaction::new(TransactionKind::Expense, date(), Money::zero(), Currency::Try);
        let errors = txn.validate().unwrap_err();
        assert!(errors.get("amount").is_some());
    }

    #[test]
    fn test_inconsistent_breakdown_rejected() {
        let mut txn = Transaction::new(TransactionKind::Expense, date(), Money::from_cents(1000), Currency::Try);
        txn.tax.vat = Money::from_cents(200);
        assert!(txn.validate().unwrap_err().get("tax").is_some());
    }

    #[test]
    fn test_to_base_uses_stored_rate() {
        let mut txn = Transaction::new(TransactionKind::Income, date(), Money::from_cents(10000), Currency::Usd);
        txn.exchange_rate = dec!(35.25);
        assert_eq!(txn.to_base(Money::from_cents(10000)).cents(), 352500);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PaymentMethod::parse("nakit"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("EFT"), Some(PaymentMethod::BankTransfer));
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
    }
}
