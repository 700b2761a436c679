//! Configuration module for Defter
//!
//! This module provides configuration management including:
//! - platform path resolution with an environment override
//! - persisted company settings (base currency, VAT default, retention)

pub mod paths;
pub mod settings;

pub use paths::DefterPaths;
pub use settings::{BackupRetention, Settings};
