//! Financial calculation engine
//!
//! Pure functions with no storage access: VAT and withholding math,
//! installment schedules, status derivation, currency conversion and
//! payment allocation. Services call into these and persist the results.

pub mod allocation;
pub mod conversion;
pub mod installments;
pub mod status;
pub mod tax;

pub use allocation::{allocate_oldest_first, Allocation};
pub use conversion::{convert, cross_rate};
pub use installments::{schedule, split_equal, PlannedInstallment, MAX_INSTALLMENTS};
pub use tax::{calculate as calculate_tax, TaxInput};
