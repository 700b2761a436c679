//! Core data models for Defter
//!
//! Plain serde records for the bookkeeping domain: parties, categories,
//! transactions, debts and their installments, payments, projects,
//! milestones, grants and exchange rates.

pub mod category;
pub mod currency;
pub mod debt;
pub mod exchange_rate;
pub mod grant;
pub mod ids;
pub mod installment;
pub mod money;
pub mod party;
pub mod payment;
pub mod percent;
pub mod project;
pub mod transaction;

pub use category::Category;
pub use currency::Currency;
pub use debt::{Debt, DebtDirection, InstallmentPlan, PaymentStatus};
pub use exchange_rate::{ExchangeRate, RateSource};
pub use grant::{Grant, GrantProvider, GrantStatus};
pub use ids::{
    CategoryId, DebtId, ExchangeRateId, GrantId, InstallmentId, MilestoneId, PartyId, PaymentId,
    ProjectId, TransactionId,
};
pub use installment::Installment;
pub use money::Money;
pub use party::{Party, PartyKind};
pub use payment::{Payment, PaymentAllocation, PaymentTarget};
pub use percent::Percent;
pub use project::{Milestone, MilestoneStatus, Project, ProjectStatus};
pub use transaction::{PaymentMethod, TaxBreakdown, Transaction, TransactionKind};
