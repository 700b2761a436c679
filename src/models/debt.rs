//! Debt model
//!
//! A debt is money we owe (payable) or money owed to us (receivable). It may
//! be split into installments; `paid_amount` and `status` are caches that the
//! payment service recomputes from the recorded payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{DebtId, PartyId};
use super::money::Money;
use super::percent::Percent;
use crate::error::ValidationErrors;
use crate::finance::status;

/// Which way the money flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtDirection {
    /// We owe the party
    Payable,
    /// The party owes us
    Receivable,
}

impl DebtDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "payable" | "borc" | "borç" => Some(Self::Payable),
            "receivable" | "alacak" => Some(Self::Receivable),
            _ => None,
        }
    }
}

impl fmt::Display for DebtDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Payable => "Borç",
            Self::Receivable => "Alacak",
        })
    }
}

/// Settlement state of a debt or installment
///
/// `Overdue` is never stored; it is derived on read from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "bekliyor" => Some(Self::Pending),
            "partial" | "kismi" | "kısmi" => Some(Self::Partial),
            "paid" | "odendi" | "ödendi" => Some(Self::Paid),
            "overdue" | "gecikmis" | "gecikmiş" => Some(Self::Overdue),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pending => "Bekliyor",
            Self::Partial => "Kısmi",
            Self::Paid => "Ödendi",
            Self::Overdue => "Gecikmiş",
        })
    }
}

/// How a debt's principal is split into installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub count: u32,
    pub first_due_date: NaiveDate,
    #[serde(default = "default_interval")]
    pub interval_months: u32,
}

fn default_interval() -> u32 {
    1
}

impl InstallmentPlan {
    pub fn monthly(count: u32, first_due_date: NaiveDate) -> Self {
        Self {
            count,
            first_due_date,
            interval_months: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,

    pub direction: DebtDirection,

    pub party_id: PartyId,

    pub description: String,

    pub principal: Money,

    pub currency: Currency,

    pub issue_date: NaiveDate,

    /// Final due date; installments carry their own
    pub due_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Percent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withholding_rate: Option<Percent>,

    #[serde(default)]
    pub notes: String,

    /// Schedule the installments were generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_plan: Option<InstallmentPlan>,

    #[serde(default)]
    pub paid_amount: Money,

    #[serde(default)]
    pub status: PaymentStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub fn new(
        direction: DebtDirection,
        party_id: PartyId,
        description: impl Into<String>,
        principal: Money,
        currency: Currency,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DebtId::new(),
            direction,
            party_id,
            description: description.into(),
            principal,
            currency,
            issue_date,
            due_date,
            vat_rate: None,
            withholding_rate: None,
            notes: String::new(),
            installment_plan: None,
            paid_amount: Money::zero(),
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining(&self) -> Money {
        self.principal - self.paid_amount
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Stored status with `Overdue` applied for `today`
    pub fn effective_status(&self, today: NaiveDate) -> PaymentStatus {
        status::effective(self.status, self.due_date, today)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.description.trim().is_empty() {
            errors.add("description", "Açıklama boş olamaz");
        }

        if !self.principal.is_positive() {
            errors.add("principal", "Anapara sıfırdan büyük olmalıdır");
        } else if self.principal.exceeds_limit() {
            errors.add("principal", format!("Anapara en fazla {} olabilir", Money::MAX));
        }

        if self.due_date < self.issue_date {
            errors.add("due_date", "Vade tarihi düzenleme tarihinden önce olamaz");
        }

        if self.paid_amount.is_negative() || self.paid_amount > self.principal {
            errors.add("paid_amount", "Ödenen tutar anaparayı aşamaz");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Debt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.direction,
            self.principal.format_with_currency(self.currency),
            self.description
        )
    }
}
