//! Transaction service
//!
//! Provides business logic for income and expense entries: reference
//! checks, the VAT/withholding breakdown, and the base-currency value at the
//! exchange rate of the transaction date.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::finance::{calculate_tax, convert, TaxInput};
use crate::models::{
    CategoryId, Currency, Money, PartyId, PaymentMethod, Percent, ProjectId, Transaction,
    TransactionId, TransactionKind,
};
use crate::services::ExchangeRateService;
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    base: Currency,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub party_id: Option<PartyId>,
    pub category_id: Option<CategoryId>,
    pub project_id: Option<ProjectId>,
    /// Inclusive date range start
    pub start_date: Option<NaiveDate>,
    /// Inclusive date range end
    pub end_date: Option<NaiveDate>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn party(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        self.kind.map_or(true, |k| txn.kind == k)
            && self.party_id.map_or(true, |id| txn.party_id == Some(id))
            && self.category_id.map_or(true, |id| txn.category_id == Some(id))
            && self.project_id.map_or(true, |id| txn.project_id == Some(id))
            && self.start_date.map_or(true, |d| txn.date >= d)
            && self.end_date.map_or(true, |d| txn.date <= d)
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub amount: Money,
    pub currency: Currency,
    pub party_id: Option<PartyId>,
    pub category_id: Option<CategoryId>,
    pub project_id: Option<ProjectId>,
    pub vat_rate: Percent,
    pub withholding_rate: Percent,
    pub vat_included: bool,
    pub method: PaymentMethod,
    pub description: Option<String>,
    pub document_no: Option<String>,
}

impl CreateTransactionInput {
    /// An untaxed entry with no references
    pub fn new(kind: TransactionKind, date: NaiveDate, amount: Money, currency: Currency) -> Self {
        Self {
            kind,
            date,
            amount,
            currency,
            party_id: None,
            category_id: None,
            project_id: None,
            vat_rate: Percent::zero(),
            withholding_rate: Percent::zero(),
            vat_included: false,
            method: PaymentMethod::default(),
            description: None,
            document_no: None,
        }
    }
}

/// Fields to change on a transaction
///
/// The nested options on references distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    pub party_id: Option<Option<PartyId>>,
    pub category_id: Option<Option<CategoryId>>,
    pub project_id: Option<Option<ProjectId>>,
    pub vat_rate: Option<Percent>,
    pub withholding_rate: Option<Percent>,
    pub vat_included: Option<bool>,
    pub method: Option<PaymentMethod>,
    pub description: Option<String>,
    pub document_no: Option<Option<String>>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, base: Currency) -> Self {
        Self { storage, base }
    }

    pub fn create(&self, input: CreateTransactionInput) -> DefterResult<Transaction> {
        let mut txn = Transaction::new(input.kind, input.date, input.amount, input.currency);
        txn.party_id = input.party_id;
        txn.category_id = input.category_id;
        txn.project_id = input.project_id;
        txn.vat_rate = input.vat_rate;
        txn.withholding_rate = input.withholding_rate;
        txn.vat_included = input.vat_included;
        txn.method = input.method;
        txn.description = input.description.unwrap_or_default().trim().to_string();
        txn.document_no = input
            .document_no
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        self.check_references(&txn, None)?;
        self.insert(txn)
    }

    pub fn get(&self, id: TransactionId) -> DefterResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    pub fn find(&self, identifier: &str) -> DefterResult<Option<Transaction>> {
        self.storage.transactions.find(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> DefterResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| DefterError::transaction_not_found(identifier))
    }

    /// Transactions matching the filter, newest first
    pub fn list(&self, filter: TransactionFilter) -> DefterResult<Vec<Transaction>> {
        let mut transactions = match filter.party_id {
            Some(party_id) => self.storage.transactions.get_by_party(party_id)?,
            None => self.storage.transactions.get_all()?,
        };
        transactions.retain(|t| filter.matches(t));
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    pub fn update(&self, id: TransactionId, input: UpdateTransactionInput) -> DefterResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| DefterError::transaction_not_found(id.to_string()))?;
        if txn.is_generated() {
            return Err(DefterError::Conflict(
                "Ödemeden oluşan işlem doğrudan değiştirilemez; ödemeyi düzenleyin".into(),
            ));
        }
        let before = txn.clone();

        if let Some(date) = input.date {
            txn.date = date;
        }
        if let Some(amount) = input.amount {
            txn.amount = amount;
        }
        if let Some(currency) = input.currency {
            txn.currency = currency;
        }
        if let Some(party_id) = input.party_id {
            txn.party_id = party_id;
        }
        if let Some(category_id) = input.category_id {
            txn.category_id = category_id;
        }
        if let Some(project_id) = input.project_id {
            txn.project_id = project_id;
        }
        if let Some(rate) = input.vat_rate {
            txn.vat_rate = rate;
        }
        if let Some(rate) = input.withholding_rate {
            txn.withholding_rate = rate;
        }
        if let Some(included) = input.vat_included {
            txn.vat_included = included;
        }
        if let Some(method) = input.method {
            txn.method = method;
        }
        if let Some(description) = input.description {
            txn.description = description.trim().to_string();
        }
        if let Some(document_no) = input.document_no {
            txn.document_no = document_no;
        }

        self.check_references(&txn, Some(&before))?;
        self.price(&mut txn)?;
        txn.updated_at = Utc::now();
        txn.validate()?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.description.clone()),
            &before,
            &txn,
        )?;

        Ok(txn)
    }

    pub fn delete(&self, id: TransactionId) -> DefterResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| DefterError::transaction_not_found(id.to_string()))?;
        if txn.is_generated() {
            return Err(DefterError::Conflict(
                "Ödemeden oluşan işlem doğrudan silinemez; ödemeyi silin".into(),
            ));
        }
        self.remove(txn)
    }

    /// Store a transaction produced by a payment
    pub(crate) fn insert_generated(&self, txn: Transaction) -> DefterResult<Transaction> {
        self.insert(txn)
    }

    /// Drop the transaction a payment produced, if it still exists
    pub(crate) fn remove_generated(&self, id: TransactionId) -> DefterResult<()> {
        if let Some(txn) = self.storage.transactions.get(id)? {
            self.remove(txn)?;
        }
        Ok(())
    }

    fn insert(&self, mut txn: Transaction) -> DefterResult<Transaction> {
        self.price(&mut txn)?;
        txn.validate()?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.description.clone()),
            &txn,
        )?;

        Ok(txn)
    }

    fn remove(&self, txn: Transaction) -> DefterResult<Transaction> {
        self.storage.transactions.delete(txn.id)?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.description.clone()),
            &txn,
        )?;

        Ok(txn)
    }

    /// Fill in the tax breakdown and the base-currency value
    fn price(&self, txn: &mut Transaction) -> DefterResult<()> {
        txn.tax = calculate_tax(TaxInput {
            amount: txn.amount,
            vat_rate: txn.vat_rate,
            withholding_rate: txn.withholding_rate,
            vat_included: txn.vat_included,
        });

        let rate = ExchangeRateService::new(self.storage, self.base).rate_to_base(txn.currency, txn.date)?;
        txn.exchange_rate = rate;
        txn.base_currency = self.base;
        txn.base_net = convert(txn.tax.net, rate);
        Ok(())
    }

    /// Referenced records must exist; newly attached ones must be active
    fn check_references(&self, txn: &Transaction, before: Option<&Transaction>) -> DefterResult<()> {
        let changed = |current: bool| before.is_none() || current;

        if let Some(party_id) = txn.party_id {
            let party = self
                .storage
                .parties
                .get(party_id)?
                .ok_or_else(|| DefterError::party_not_found(party_id.to_string()))?;
            if party.archived && changed(before.map(|b| b.party_id) != Some(txn.party_id)) {
                return Err(DefterError::invalid(
                    "party",
                    format!("'{}' carisi arşivlenmiş", party.name),
                ));
            }
        }

        if let Some(category_id) = txn.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .ok_or_else(|| DefterError::category_not_found(category_id.to_string()))?;
            if category.kind != txn.kind {
                return Err(DefterError::invalid(
                    "category",
                    format!("'{}' bir {} kategorisi, işlem türü {}", category.name, category.kind, txn.kind),
                ));
            }
            if category.archived && changed(before.map(|b| b.category_id) != Some(txn.category_id)) {
                return Err(DefterError::invalid(
                    "category",
                    format!("'{}' kategorisi arşivlenmiş", category.name),
                ));
            }
        }

        if let Some(project_id) = txn.project_id {
            self.storage
                .projects
                .get(project_id)?
                .ok_or_else(|| DefterError::project_not_found(project_id.to_string()))?;
        }

        Ok(())
    }
}
