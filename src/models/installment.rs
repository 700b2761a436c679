//! Installment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::debt::PaymentStatus;
use super::ids::{DebtId, InstallmentId};
use super::money::Money;
use crate::finance::status;

/// One scheduled share of a debt's principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,

    pub debt_id: DebtId,

    /// 1-based position in the schedule
    pub sequence: u32,

    pub due_date: NaiveDate,

    pub amount: Money,

    #[serde(default)]
    pub paid_amount: Money,

    #[serde(default)]
    pub status: PaymentStatus,

    /// Date of the payment that settled it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Installment {
    pub fn new(debt_id: DebtId, sequence: u32, due_date: NaiveDate, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: InstallmentId::new(),
            debt_id,
            sequence,
            due_date,
            amount,
            paid_amount: Money::zero(),
            status: PaymentStatus::Pending,
            paid_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining(&self) -> Money {
        self.amount - self.paid_amount
    }

    pub fn is_open(&self) -> bool {
        self.remaining().is_positive()
    }

    pub fn effective_status(&self, today: NaiveDate) -> PaymentStatus {
        status::effective(self.status, self.due_date, today)
    }
}
