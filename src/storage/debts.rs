//! Debt repository
//!
//! Debts and their installments share debts.json so a schedule is always
//! written together with the debt it belongs to.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DefterResult;
use crate::models::{Debt, DebtId, Installment, InstallmentId, PartyId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct DebtData {
    debts: Vec<Debt>,
    #[serde(default)]
    installments: Vec<Installment>,
}

pub struct DebtRepository {
    path: PathBuf,
    debts: RwLock<HashMap<DebtId, Debt>>,
    installments: RwLock<HashMap<InstallmentId, Installment>>,
}

impl DebtRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            debts: RwLock::new(HashMap::new()),
            installments: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: DebtData = read_json(&self.path)?;

        let mut debts = write_lock(&self.debts)?;
        let mut installments = write_lock(&self.installments)?;
        debts.clear();
        installments.clear();
        debts.extend(file_data.debts.into_iter().map(|d| (d.id, d)));
        installments.extend(file_data.installments.into_iter().map(|i| (i.id, i)));

        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let debts = self.get_all()?;
        let mut installments = self.all_installments()?;
        installments.sort_by_key(|i| (i.debt_id, i.sequence));
        write_json_atomic(&self.path, &DebtData { debts, installments })
    }

    pub fn get(&self, id: DebtId) -> DefterResult<Option<Debt>> {
        Ok(read_lock(&self.debts)?.get(&id).cloned())
    }

    pub fn find(&self, input: &str) -> DefterResult<Option<Debt>> {
        let debts = read_lock(&self.debts)?;
        unique_match(debts.values().filter(|d| d.id.matches(input)), input)
    }

    /// All debts, earliest due first
    pub fn get_all(&self) -> DefterResult<Vec<Debt>> {
        let debts = read_lock(&self.debts)?;
        let mut all: Vec<_> = debts.values().cloned().collect();
        all.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.created_at.cmp(&b.created_at)));
        Ok(all)
    }

    pub fn get_by_party(&self, party_id: PartyId) -> DefterResult<Vec<Debt>> {
        Ok(self.get_all()?.into_iter().filter(|d| d.party_id == party_id).collect())
    }

    pub fn upsert(&self, debt: Debt) -> DefterResult<()> {
        write_lock(&self.debts)?.insert(debt.id, debt);
        Ok(())
    }

    /// Remove a debt together with its installments
    pub fn delete(&self, id: DebtId) -> DefterResult<bool> {
        let removed = write_lock(&self.debts)?.remove(&id).is_some();
        write_lock(&self.installments)?.retain(|_, i| i.debt_id != id);
        Ok(removed)
    }

    pub fn get_installment(&self, id: InstallmentId) -> DefterResult<Option<Installment>> {
        Ok(read_lock(&self.installments)?.get(&id).cloned())
    }

    pub fn find_installment(&self, input: &str) -> DefterResult<Option<Installment>> {
        let installments = read_lock(&self.installments)?;
        unique_match(installments.values().filter(|i| i.id.matches(input)), input)
    }

    /// A debt's schedule in sequence order
    pub fn installments_for(&self, debt_id: DebtId) -> DefterResult<Vec<Installment>> {
        let installments = read_lock(&self.installments)?;
        let mut schedule: Vec<_> = installments
            .values()
            .filter(|i| i.debt_id == debt_id)
            .cloned()
            .collect();
        schedule.sort_by_key(|i| i.sequence);
        Ok(schedule)
    }

    pub fn all_installments(&self) -> DefterResult<Vec<Installment>> {
        let installments = read_lock(&self.installments)?;
        let mut all: Vec<_> = installments.values().cloned().collect();
        all.sort_by_key(|i| (i.due_date, i.sequence));
        Ok(all)
    }

    pub fn upsert_installment(&self, installment: Installment) -> DefterResult<()> {
        write_lock(&self.installments)?.insert(installment.id, installment);
        Ok(())
    }

    /// Swap a debt's whole schedule for a new one
    pub fn replace_installments(&self, debt_id: DebtId, schedule: Vec<Installment>) -> DefterResult<()> {
        let mut installments = write_lock(&self.installments)?;
        installments.retain(|_, i| i.debt_id != debt_id);
        installments.extend(schedule.into_iter().map(|i| (i.id, i)));
        Ok(())
    }

    pub fn count(&self) -> DefterResult<usize> {
        Ok(read_lock(&self.debts)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, DebtDirection, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, DebtRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = DebtRepository::new(temp_dir.path().join("debts.json"));
        (temp_dir, repo)
    }

    fn date(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, 1).unwrap()
    }

    fn debt() -> Debt {
        Debt::new(
            DebtDirection::Receivable,
            PartyId::new(),
            "Yazılım bedeli",
            Money::from_cents(30_000),
            Currency::Try,
            date(1),
            date(4),
        )
    }

    fn schedule(debt: &Debt) -> Vec<Installment> {
        (1..=3)
            .map(|n| Installment::new(debt.id, n, date(n + 1), Money::from_cents(10_000)))
            .collect()
    }

    #[test]
    fn test_installments_stay_with_debt() {
        let (temp, repo) = create_test_repo();
        let debt = debt();
        repo.upsert(debt.clone()).unwrap();
        repo.replace_installments(debt.id, schedule(&debt)).unwrap();
        repo.save().unwrap();

        let reloaded = DebtRepository::new(temp.path().join("debts.json"));
        reloaded.load().unwrap();
        let loaded = reloaded.installments_for(debt.id).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.iter().map(|i| i.sequence).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_replace_discards_old_schedule() {
        let (_temp, repo) = create_test_repo();
        let debt = debt();
        repo.upsert(debt.clone()).unwrap();
        repo.replace_installments(debt.id, schedule(&debt)).unwrap();

        let single = vec![Installment::new(debt.id, 1, date(2), Money::from_cents(30_000))];
        repo.replace_installments(debt.id, single).unwrap();
        assert_eq!(repo.installments_for(debt.id).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_removes_installments() {
        let (_temp, repo) = create_test_repo();
        let debt = debt();
        let other = self::debt();
        repo.upsert(debt.clone()).unwrap();
        repo.upsert(other.clone()).unwrap();
        repo.replace_installments(debt.id, schedule(&debt)).unwrap();
        repo.replace_installments(other.id, schedule(&other)).unwrap();

        assert!(repo.delete(debt.id).unwrap());
        assert!(repo.installments_for(debt.id).unwrap().is_empty());
        assert_eq!(repo.all_installments().unwrap().len(), 3);
    }
}
