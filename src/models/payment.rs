//! Payment model
//!
//! A payment settles part or all of a debt, a single installment, or a
//! grant. Debt-level payments record how they were spread over the
//! installments in `allocations`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{DebtId, GrantId, InstallmentId, PaymentId, TransactionId};
use super::money::Money;
use super::transaction::PaymentMethod;

/// What a payment settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentTarget {
    Debt {
        debt_id: DebtId,
    },
    Installment {
        debt_id: DebtId,
        installment_id: InstallmentId,
    },
    Grant {
        grant_id: GrantId,
    },
}

impl PaymentTarget {
    /// The debt this payment counts towards, if any
    pub fn debt_id(&self) -> Option<DebtId> {
        match self {
            Self::Debt { debt_id } | Self::Installment { debt_id, .. } => Some(*debt_id),
            Self::Grant { .. } => None,
        }
    }

    pub fn grant_id(&self) -> Option<GrantId> {
        match self {
            Self::Grant { grant_id } => Some(*grant_id),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debt { debt_id } => write!(f, "{}", debt_id),
            Self::Installment { installment_id, .. } => write!(f, "{}", installment_id),
            Self::Grant { grant_id } => write!(f, "{}", grant_id),
        }
    }
}

/// Portion of a payment applied to one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub installment_id: InstallmentId,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    pub date: NaiveDate,

    pub amount: Money,

    pub currency: Currency,

    #[serde(default)]
    pub method: PaymentMethod,

    #[serde(default)]
    pub notes: String,

    pub target: PaymentTarget,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allocations: Vec<PaymentAllocation>,

    /// Ledger entry generated for this payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(target: PaymentTarget, date: NaiveDate, amount: Money, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            date,
            amount,
            currency,
            method: PaymentMethod::default(),
            notes: String::new(),
            target,
            allocations: Vec::new(),
            transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount this payment applies to the given installment
    pub fn allocated_to(&self, installment_id: InstallmentId) -> Money {
        self.allocations
            .iter()
            .filter(|a| a.installment_id == installment_id)
            .map(|a| a.amount)
            .sum()
    }
}
