//! Exchange rate repository
//!
//! At most one rate is kept per currency and day.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::DefterResult;
use crate::finance::conversion::latest_on_or_before;
use crate::models::{Currency, ExchangeRate, ExchangeRateId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExchangeRateData {
    rates: Vec<ExchangeRate>,
}

pub struct ExchangeRateRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExchangeRateId, ExchangeRate>>,
}

impl ExchangeRateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: ExchangeRateData = read_json(&self.path)?;
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(file_data.rates.into_iter().map(|r| (r.id, r)));
        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let rates = self.get_all()?;
        write_json_atomic(&self.path, &ExchangeRateData { rates })
    }

    pub fn get(&self, id: ExchangeRateId) -> DefterResult<Option<ExchangeRate>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    pub fn find(&self, input: &str) -> DefterResult<Option<ExchangeRate>> {
        let data = read_lock(&self.data)?;
        unique_match(data.values().filter(|r| r.id.matches(input)), input)
    }

    /// By currency, newest date first
    pub fn get_all(&self) -> DefterResult<Vec<ExchangeRate>> {
        let data = read_lock(&self.data)?;
        let mut rates: Vec<_> = data.values().cloned().collect();
        rates.sort_by(|a, b| a.currency.cmp(&b.currency).then(b.date.cmp(&a.date)));
        Ok(rates)
    }

    pub fn get_for(&self, currency: Currency, date: NaiveDate) -> DefterResult<Option<ExchangeRate>> {
        let data = read_lock(&self.data)?;
        Ok(data
            .values()
            .find(|r| r.currency == currency && r.date == date)
            .cloned())
    }

    pub fn latest(&self, currency: Currency, on_or_before: NaiveDate) -> DefterResult<Option<ExchangeRate>> {
        let data = read_lock(&self.data)?;
        Ok(latest_on_or_before(data.values(), currency, on_or_before).cloned())
    }

    pub fn upsert(&self, rate: ExchangeRate) -> DefterResult<()> {
        let mut data = write_lock(&self.data)?;
        data.retain(|id, r| *id == rate.id || r.currency != rate.currency || r.date != rate.date);
        data.insert(rate.id, rate);
        Ok(())
    }

    pub fn delete(&self, id: ExchangeRateId) -> DefterResult<bool> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }
}
