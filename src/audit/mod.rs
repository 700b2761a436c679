//! Audit trail for Defter
//!
//! Every create, update and delete made through the service layer appends
//! one JSON line to `audit.log` with the record before and after the change
//! and a short field diff. The log is never rewritten.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::{AuditFilter, AuditLogger};
