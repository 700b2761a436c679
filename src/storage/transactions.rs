//! Transaction repository
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::DefterResult;
use crate::models::{CategoryId, PartyId, PaymentId, ProjectId, Transaction, TransactionId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Newest first, ties broken by creation time
fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: party_id -> transaction_ids
    by_party: RwLock<HashMap<PartyId, Vec<TransactionId>>>,
    /// Index: category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_party: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_party = write_lock(&self.by_party)?;
        let mut by_category = write_lock(&self.by_category)?;
        data.clear();
        by_party.clear();
        by_category.clear();

        for txn in file_data.transactions {
            if let Some(party_id) = txn.party_id {
                by_party.entry(party_id).or_default().push(txn.id);
            }
            if let Some(category_id) = txn.category_id {
                by_category.entry(category_id).or_default().push(txn.id);
            }
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> DefterResult<Option<Transaction>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    pub fn find(&self, input: &str) -> DefterResult<Option<Transaction>> {
        let data = read_lock(&self.data)?;
        unique_match(data.values().filter(|t| t.id.matches(input)), input)
    }

    pub fn get_all(&self) -> DefterResult<Vec<Transaction>> {
        let data = read_lock(&self.data)?;
        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    fn collect(&self, ids: Option<&Vec<TransactionId>>) -> DefterResult<Vec<Transaction>> {
        let data = read_lock(&self.data)?;
        let mut transactions: Vec<_> = ids
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| data.get(id).cloned())
            .collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    pub fn get_by_party(&self, party_id: PartyId) -> DefterResult<Vec<Transaction>> {
        let ids = read_lock(&self.by_party)?.get(&party_id).cloned();
        self.collect(ids.as_ref())
    }

    pub fn get_by_category(&self, category_id: CategoryId) -> DefterResult<Vec<Transaction>> {
        let ids = read_lock(&self.by_category)?.get(&category_id).cloned();
        self.collect(ids.as_ref())
    }

    pub fn get_by_project(&self, project_id: ProjectId) -> DefterResult<Vec<Transaction>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.project_id == Some(project_id))
            .collect())
    }

    /// The ledger entry generated by a payment, if any
    pub fn get_by_payment(&self, payment_id: PaymentId) -> DefterResult<Option<Transaction>> {
        let data = read_lock(&self.data)?;
        Ok(data.values().find(|t| t.payment_id == Some(payment_id)).cloned())
    }

    /// Transactions dated within `start..=end`
    pub fn get_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> DefterResult<Vec<Transaction>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect())
    }

    pub fn upsert(&self, txn: Transaction) -> DefterResult<()> {
        let mut data = write_lock(&self.data)?;
        let mut by_party = write_lock(&self.by_party)?;
        let mut by_category = write_lock(&self.by_category)?;

        if let Some(old) = data.get(&txn.id) {
            if let Some(ids) = old.party_id.and_then(|p| by_party.get_mut(&p)) {
                ids.retain(|&id| id != txn.id);
            }
            if let Some(ids) = old.category_id.and_then(|c| by_category.get_mut(&c)) {
                ids.retain(|&id| id != txn.id);
            }
        }

        if let Some(party_id) = txn.party_id {
            by_party.entry(party_id).or_default().push(txn.id);
        }
        if let Some(category_id) = txn.category_id {
            by_category.entry(category_id).or_default().push(txn.id);
        }
        data.insert(txn.id, txn);
        Ok(())
    }

    pub fn delete(&self, id: TransactionId) -> DefterResult<bool> {
        let mut data = write_lock(&self.data)?;
        let mut by_party = write_lock(&self.by_party)?;
        let mut by_category = write_lock(&self.by_category)?;

        let Some(txn) = data.remove(&id) else {
            return Ok(false);
        };
        if let Some(ids) = txn.party_id.and_then(|p| by_party.get_mut(&p)) {
            ids.retain(|&other| other != id);
        }
        if let Some(ids) = txn.category_id.and_then(|c| by_category.get_mut(&c)) {
            ids.retain(|&other| other != id);
        }
        Ok(true)
    }

    pub fn count(&self) -> DefterResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}
