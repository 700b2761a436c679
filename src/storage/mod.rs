//! Storage layer for Defter
//!
//! One JSON file per aggregate under `<root>/data/`, each loaded into an
//! `RwLock`-guarded map and written back atomically. `Storage` also owns the
//! audit logger so every service write is recorded next to the data.

pub mod categories;
pub mod debts;
pub mod exchange_rates;
pub mod file_io;
pub mod grants;
pub mod init;
pub mod parties;
pub mod payments;
pub mod projects;
pub mod transactions;

pub use categories::CategoryRepository;
pub use debts::DebtRepository;
pub use exchange_rates::ExchangeRateRepository;
pub use file_io::{read_json, write_json_atomic};
pub use grants::GrantRepository;
pub use init::initialize_storage;
pub use parties::PartyRepository;
pub use payments::PaymentRepository;
pub use projects::ProjectRepository;
pub use transactions::TransactionRepository;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::DefterPaths;
use crate::error::{DefterError, DefterResult};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: DefterPaths,
    audit: AuditLogger,
    pub parties: PartyRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub debts: DebtRepository,
    pub payments: PaymentRepository,
    pub projects: ProjectRepository,
    pub grants: GrantRepository,
    pub exchange_rates: ExchangeRateRepository,
}

impl Storage {
    pub fn new(paths: DefterPaths) -> DefterResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            parties: PartyRepository::new(paths.parties_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            debts: DebtRepository::new(paths.debts_file()),
            payments: PaymentRepository::new(paths.payments_file()),
            projects: ProjectRepository::new(paths.projects_file()),
            grants: GrantRepository::new(paths.grants_file()),
            exchange_rates: ExchangeRateRepository::new(paths.exchange_rates_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &DefterPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn load_all(&self) -> DefterResult<()> {
        self.parties.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.debts.load()?;
        self.payments.load()?;
        self.projects.load()?;
        self.grants.load()?;
        self.exchange_rates.load()?;
        tracing::debug!(root = %self.paths.base_dir().display(), "storage loaded");
        Ok(())
    }

    pub fn save_all(&self) -> DefterResult<()> {
        self.parties.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.debts.save()?;
        self.payments.save()?;
        self.projects.save()?;
        self.grants.save()?;
        self.exchange_rates.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> DefterResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update; the field diff is computed from the two states
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> DefterResult<()> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(before), Ok(after)) => generate_diff(&before, &after),
            _ => None,
        };
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> DefterResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

/// The single record matching user input
///
/// More than one match is an error so a short ID never silently picks the
/// wrong record.
pub(crate) fn unique_match<'a, T, I>(mut matches: I, input: &str) -> DefterResult<Option<T>>
where
    T: Clone + 'a,
    I: Iterator<Item = &'a T>,
{
    let first = matches.next().cloned();
    if first.is_some() && matches.next().is_some() {
        return Err(DefterError::Conflict(format!(
            "'{}' birden fazla kayıtla eşleşiyor, daha uzun bir kimlik girin",
            input.trim()
        )));
    }
    Ok(first)
}
