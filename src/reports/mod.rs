//! Reports module for Defter
//!
//! Income and expense summaries, the debt position, party statements
//! and project financials.

pub mod debts;
pub mod party_statement;
pub mod project;
pub mod summary;

pub use debts::{DebtReport, DueItem, Outstanding};
pub use party_statement::{CurrencyStatement, PartyStatement, StatementEntryKind, StatementLine};
pub use project::ProjectReport;
pub use summary::{CategoryTotal, MonthTotal, SummaryReport};
