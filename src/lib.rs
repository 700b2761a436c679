//! Defter - command-line bookkeeping for small businesses
//!
//! Tracks income and expense transactions with VAT and withholding, debts
//! and receivables split into installments, payments that settle them,
//! projects with milestones and grant funding, and amounts in several
//! currencies converted through stored exchange rates.
//!
//! # Architecture
//!
//! - `config`: data paths and user settings
//! - `error`: the crate error type
//! - `models`: domain types (parties, transactions, debts, projects, ...)
//! - `finance`: pure money math (tax, installments, allocation, conversion)
//! - `storage`: JSON file repositories
//! - `services`: business rules over storage
//! - `audit`: append-only change log
//! - `backup`: archive and restore of all data files
//! - `reports`: summary, debt, statement and project reports
//! - `display`: terminal tables
//! - `cli`: clap commands
//!
//! # Example
//!
//! ```rust,ignore
//! use defter::config::{DefterPaths, Settings};
//! use defter::storage::Storage;
//!
//! let paths = DefterPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod finance;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{DefterError, DefterResult};
