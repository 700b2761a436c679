//! Service layer for Defter
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, computed fields, and cross-entity reconciliation.

pub mod category;
pub mod debt;
pub mod exchange_rate;
pub mod grant;
pub mod party;
pub mod payment;
pub mod project;
pub mod transaction;

pub use category::CategoryService;
pub use debt::{CreateDebtInput, DebtFilter, DebtService, DebtSummary, UpdateDebtInput};
pub use exchange_rate::ExchangeRateService;
pub use grant::{CreateGrantInput, GrantService, UpdateGrantInput};
pub use party::{CreatePartyInput, PartyBalance, PartyService, UpdatePartyInput};
pub use payment::{PaymentFilter, PaymentService, RecordPaymentInput};
pub use project::{
    CreateProjectInput, ProjectService, ProjectSummary, UpdateMilestoneInput, UpdateProjectInput,
};
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, UpdateTransactionInput,
};
