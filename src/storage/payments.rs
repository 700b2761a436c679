//! Payment repository

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DefterResult;
use crate::models::{DebtId, GrantId, Payment, PaymentId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PaymentData {
    payments: Vec<Payment>,
}

pub struct PaymentRepository {
    path: PathBuf,
    data: RwLock<HashMap<PaymentId, Payment>>,
}

impl PaymentRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: PaymentData = read_json(&self.path)?;
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(file_data.payments.into_iter().map(|p| (p.id, p)));
        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let payments = self.get_all()?;
        write_json_atomic(&self.path, &PaymentData { payments })
    }

    pub fn get(&self, id: PaymentId) -> DefterResult<Option<Payment>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    pub fn find(&self, input: &str) -> DefterResult<Option<Payment>> {
        let data = read_lock(&self.data)?;
        unique_match(data.values().filter(|p| p.id.matches(input)), input)
    }

    /// Oldest first, so replaying them reproduces the settlement order
    pub fn get_all(&self) -> DefterResult<Vec<Payment>> {
        let data = read_lock(&self.data)?;
        let mut payments: Vec<_> = data.values().cloned().collect();
        payments.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(payments)
    }

    /// Payments against a debt or any of its installments
    pub fn get_by_debt(&self, debt_id: DebtId) -> DefterResult<Vec<Payment>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.target.debt_id() == Some(debt_id))
            .collect())
    }

    pub fn get_by_grant(&self, grant_id: GrantId) -> DefterResult<Vec<Payment>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.target.grant_id() == Some(grant_id))
            .collect())
    }

    pub fn upsert(&self, payment: Payment) -> DefterResult<()> {
        write_lock(&self.data)?.insert(payment.id, payment);
        Ok(())
    }

    pub fn delete(&self, id: PaymentId) -> DefterResult<bool> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }

    pub fn count(&self) -> DefterResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}
