//! Party service
//!
//! Customer and supplier accounts: unique names, archiving, guarded deletes
//! and the open balance across debts.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::models::{Currency, DebtDirection, Money, Party, PartyId, PartyKind};
use crate::storage::Storage;

/// Service for party management
pub struct PartyService<'a> {
    storage: &'a Storage,
}

/// Input for creating a party
#[derive(Debug, Clone, Default)]
pub struct CreatePartyInput {
    pub name: String,
    pub kind: PartyKind,
    pub tax_number: Option<String>,
    pub tax_office: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Fields to change on a party; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct UpdatePartyInput {
    pub name: Option<String>,
    pub kind: Option<PartyKind>,
    pub tax_number: Option<String>,
    pub tax_office: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Open debts of a party in one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartyBalance {
    /// Still owed to us
    pub receivable: Money,
    /// Still owed by us
    pub payable: Money,
}

impl PartyBalance {
    /// Positive when the party owes us on balance
    pub fn net(&self) -> Money {
        self.receivable - self.payable
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<'a> PartyService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreatePartyInput) -> DefterResult<Party> {
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, None)?;

        let mut party = Party::new(name, input.kind);
        party.tax_number = non_empty(input.tax_number);
        party.tax_office = non_empty(input.tax_office);
        party.phone = non_empty(input.phone);
        party.email = non_empty(input.email);
        party.address = non_empty(input.address);
        party.notes = input.notes.unwrap_or_default();

        party.validate()?;

        self.storage.parties.upsert(party.clone())?;
        self.storage.parties.save()?;

        self.storage.log_create(
            EntityType::Party,
            party.id.to_string(),
            Some(party.name.clone()),
            &party,
        )?;

        Ok(party)
    }

    pub fn get(&self, id: PartyId) -> DefterResult<Option<Party>> {
        self.storage.parties.get(id)
    }

    /// Find a party by name or short ID
    pub fn find(&self, identifier: &str) -> DefterResult<Option<Party>> {
        self.storage.parties.find(identifier)
    }

    /// Like `find`, but a missing party is an error
    pub fn resolve(&self, identifier: &str) -> DefterResult<Party> {
        self.find(identifier)?
            .ok_or_else(|| DefterError::party_not_found(identifier))
    }

    pub fn list(&self, include_archived: bool) -> DefterResult<Vec<Party>> {
        let parties = self.storage.parties.get_all()?;
        Ok(parties
            .into_iter()
            .filter(|p| include_archived || !p.archived)
            .collect())
    }

    pub fn update(&self, id: PartyId, input: UpdatePartyInput) -> DefterResult<Party> {
        let mut party = self
            .storage
            .parties
            .get(id)?
            .ok_or_else(|| DefterError::party_not_found(id.to_string()))?;
        let before = party.clone();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            self.ensure_name_free(&name, Some(id))?;
            party.name = name;
        }
        if let Some(kind) = input.kind {
            party.kind = kind;
        }
        if input.tax_number.is_some() {
            party.tax_number = non_empty(input.tax_number);
        }
        if input.tax_office.is_some() {
            party.tax_office = non_empty(input.tax_office);
        }
        if input.phone.is_some() {
            party.phone = non_empty(input.phone);
        }
        if input.email.is_some() {
            party.email = non_empty(input.email);
        }
        if input.address.is_some() {
            party.address = non_empty(input.address);
        }
        if let Some(notes) = input.notes {
            party.notes = notes;
        }
        party.updated_at = Utc::now();

        party.validate()?;

        self.storage.parties.upsert(party.clone())?;
        self.storage.parties.save()?;

        self.storage.log_update(
            EntityType::Party,
            party.id.to_string(),
            Some(party.name.clone()),
            &before,
            &party,
        )?;

        Ok(party)
    }

    pub fn archive(&self, id: PartyId) -> DefterResult<Party> {
        self.set_archived(id, true)
    }

    pub fn unarchive(&self, id: PartyId) -> DefterResult<Party> {
        self.set_archived(id, false)
    }

    fn set_archived(&self, id: PartyId, archived: bool) -> DefterResult<Party> {
        let mut party = self
            .storage
            .parties
            .get(id)?
            .ok_or_else(|| DefterError::party_not_found(id.to_string()))?;

        if party.archived == archived {
            return Ok(party);
        }

        let before = party.clone();
        if archived {
            party.archive();
        } else {
            party.unarchive();
        }

        self.storage.parties.upsert(party.clone())?;
        self.storage.parties.save()?;

        self.storage.log_update(
            EntityType::Party,
            party.id.to_string(),
            Some(party.name.clone()),
            &before,
            &party,
        )?;

        Ok(party)
    }

    /// Delete a party that nothing refers to
    pub fn delete(&self, id: PartyId) -> DefterResult<Party> {
        let party = self
            .storage
            .parties
            .get(id)?
            .ok_or_else(|| DefterError::party_not_found(id.to_string()))?;

        let transactions = self.storage.transactions.get_by_party(id)?.len();
        let debts = self.storage.debts.get_by_party(id)?.len();
        let projects = self.storage.projects.get_by_party(id)?.len();
        if transactions + debts + projects > 0 {
            return Err(DefterError::Conflict(format!(
                "'{}' carisine bağlı {} işlem, {} borç/alacak ve {} proje var; silmek yerine arşivleyin",
                party.name, transactions, debts, projects
            )));
        }

        self.storage.parties.delete(id)?;
        self.storage.parties.save()?;

        self.storage.log_delete(
            EntityType::Party,
            party.id.to_string(),
            Some(party.name.clone()),
            &party,
        )?;

        Ok(party)
    }

    /// Receivables minus payables still open, per currency
    pub fn balance(&self, id: PartyId) -> DefterResult<BTreeMap<Currency, PartyBalance>> {
        if self.storage.parties.get(id)?.is_none() {
            return Err(DefterError::party_not_found(id.to_string()));
        }

        let mut balances: BTreeMap<Currency, PartyBalance> = BTreeMap::new();
        for debt in self.storage.debts.get_by_party(id)? {
            let entry = balances.entry(debt.currency).or_default();
            match debt.direction {
                DebtDirection::Receivable => entry.receivable += debt.remaining(),
                DebtDirection::Payable => entry.payable += debt.remaining(),
            }
        }
        Ok(balances)
    }

    fn ensure_name_free(&self, name: &str, except: Option<PartyId>) -> DefterResult<()> {
        if let Some(existing) = self.storage.parties.get_by_name(name)? {
            if Some(existing.id) != except {
                return Err(DefterError::Duplicate {
                    entity_type: "Cari",
                    identifier: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
