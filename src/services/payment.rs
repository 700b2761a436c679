//! Payment service
//!
//! Records payments against debts, installments and grants, and keeps the
//! cached paid amounts and statuses of those targets in line with the full
//! payment history.
//!
//! Cached values are never adjusted incrementally: after every write the
//! target is reconciled from all of its payments, so deleting a payment
//! restores exactly the state before it was recorded.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::finance::{allocate_oldest_first, status};
use crate::models::{
    CategoryId, Currency, Debt, DebtDirection, DebtId, Grant, GrantId, Money, Payment,
    PaymentAllocation, PaymentId, PaymentMethod, PaymentTarget, Transaction, TransactionKind,
};
use crate::services::TransactionService;
use crate::storage::Storage;

/// Service for recording and reconciling payments
pub struct PaymentService<'a> {
    storage: &'a Storage,
    base: Currency,
}

/// Input for recording a payment
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    pub target: PaymentTarget,
    pub date: NaiveDate,
    pub amount: Money,
    /// Defaults to the target's currency
    pub currency: Option<Currency>,
    pub method: PaymentMethod,
    pub notes: Option<String>,
    /// Also write a ledger transaction for the payment
    pub create_transaction: bool,
    /// Category of the generated transaction
    pub category_id: Option<CategoryId>,
}

impl RecordPaymentInput {
    pub fn new(target: PaymentTarget, date: NaiveDate, amount: Money) -> Self {
        Self {
            target,
            date,
            amount,
            currency: None,
            method: PaymentMethod::default(),
            notes: None,
            create_transaction: false,
            category_id: None,
        }
    }
}

/// Options for filtering payments
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub debt_id: Option<DebtId>,
    pub grant_id: Option<GrantId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl PaymentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debt(mut self, debt_id: DebtId) -> Self {
        self.debt_id = Some(debt_id);
        self
    }

    pub fn grant(mut self, grant_id: GrantId) -> Self {
        self.grant_id = Some(grant_id);
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
}

/// What a payment settles, resolved from storage
enum ResolvedTarget {
    Debt(Debt),
    Grant(Grant),
}

impl ResolvedTarget {
    fn currency(&self) -> Currency {
        match self {
            Self::Debt(debt) => debt.currency,
            Self::Grant(grant) => grant.currency,
        }
    }
}

fn overpayment(remaining: Money, attempted: Money) -> DefterError {
    DefterError::Overpayment {
        remaining,
        attempted,
    }
}

impl<'a> PaymentService<'a> {
    pub fn new(storage: &'a Storage, base: Currency) -> Self {
        Self { storage, base }
    }

    pub fn record(&self, input: RecordPaymentInput) -> DefterResult<Payment> {
        if !input.amount.is_positive() {
            return Err(DefterError::invalid("amount", "Ödeme tutarı sıfırdan büyük olmalıdır"));
        }

        let target = self.resolve_target(input.target)?;
        let currency = input.currency.unwrap_or_else(|| target.currency());
        if currency != target.currency() {
            return Err(DefterError::CurrencyMismatch {
                expected: target.currency(),
                actual: currency,
            });
        }

        let allocations = self.allocate(&input.target, &target, input.amount)?;

        let mut payment = Payment::new(input.target, input.date, input.amount, currency);
        payment.method = input.method;
        payment.notes = input.notes.unwrap_or_default();
        payment.allocations = allocations;

        let transactions = TransactionService::new(self.storage, self.base);
        if input.create_transaction {
            let txn = self.ledger_entry(&payment, &target, input.category_id)?;
            let txn = transactions.insert_generated(txn)?;
            payment.transaction_id = Some(txn.id);
        }

        self.storage.payments.upsert(payment.clone())?;
        if let Err(e) = self.storage.payments.save() {
            // Roll back so no generated entry is left without its payment
            self.storage.payments.delete(payment.id)?;
            if let Some(txn_id) = payment.transaction_id {
                transactions.remove_generated(txn_id)?;
            }
            return Err(e);
        }

        self.storage.log_create(
            EntityType::Payment,
            payment.id.to_string(),
            Some(payment.target.to_string()),
            &payment,
        )?;

        self.reconcile_target(&payment.target)?;

        tracing::debug!(
            payment = %payment.id,
            target = %payment.target,
            allocations = payment.allocations.len(),
            "payment recorded"
        );
        Ok(payment)
    }

    pub fn get(&self, id: PaymentId) -> DefterResult<Option<Payment>> {
        self.storage.payments.get(id)
    }

    pub fn find(&self, identifier: &str) -> DefterResult<Option<Payment>> {
        self.storage.payments.find(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> DefterResult<Payment> {
        self.find(identifier)?
            .ok_or_else(|| DefterError::payment_not_found(identifier))
    }

    /// Payments matching the filter, oldest first
    pub fn list(&self, filter: PaymentFilter) -> DefterResult<Vec<Payment>> {
        let mut payments = match (filter.debt_id, filter.grant_id) {
            (Some(debt_id), _) => self.storage.payments.get_by_debt(debt_id)?,
            (None, Some(grant_id)) => self.storage.payments.get_by_grant(grant_id)?,
            (None, None) => self.storage.payments.get_all()?,
        };
        payments.retain(|p| {
            filter.grant_id.map_or(true, |id| p.target.grant_id() == Some(id))
                && filter.start_date.map_or(true, |d| p.date >= d)
                && filter.end_date.map_or(true, |d| p.date <= d)
        });
        payments.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        if let Some(limit) = filter.limit {
            payments.truncate(limit);
        }
        Ok(payments)
    }

    /// Remove a payment and its ledger entry, then reconcile the target
    pub fn delete(&self, id: PaymentId) -> DefterResult<Payment> {
        let payment = self
            .storage
            .payments
            .get(id)?
            .ok_or_else(|| DefterError::payment_not_found(id.to_string()))?;

        self.storage.payments.delete(id)?;
        self.storage.payments.save()?;

        if let Some(txn_id) = payment.transaction_id {
            TransactionService::new(self.storage, self.base).remove_generated(txn_id)?;
        }

        self.storage.log_delete(
            EntityType::Payment,
            payment.id.to_string(),
            Some(payment.target.to_string()),
            &payment,
        )?;

        self.reconcile_target(&payment.target)?;
        Ok(payment)
    }

    /// Recompute paid amounts, statuses and paid dates of a debt and its
    /// installments from every payment recorded against them
    pub fn reconcile_debt(&self, debt_id: DebtId) -> DefterResult<Debt> {
        let mut debt = self
            .storage
            .debts
            .get(debt_id)?
            .ok_or_else(|| DefterError::debt_not_found(debt_id.to_string()))?;
        let mut payments = self.storage.payments.get_by_debt(debt_id)?;
        payments.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        for mut installment in self.storage.debts.installments_for(debt_id)? {
            let before = installment.clone();

            let mut paid = Money::zero();
            let mut settled_on = None;
            for payment in &payments {
                let applied = payment.allocated_to(installment.id);
                if applied.is_positive() {
                    paid += applied;
                    if settled_on.is_none() && paid >= installment.amount {
                        settled_on = Some(payment.date);
                    }
                }
            }

            installment.paid_amount = paid;
            installment.status = status::derive(installment.amount, paid);
            installment.paid_date = settled_on;

            if installment.paid_amount != before.paid_amount
                || installment.status != before.status
                || installment.paid_date != before.paid_date
            {
                installment.updated_at = Utc::now();
                self.storage.debts.upsert_installment(installment.clone())?;
                self.storage.log_update(
                    EntityType::Installment,
                    installment.id.to_string(),
                    Some(format!("{} #{}", debt.description, installment.sequence)),
                    &before,
                    &installment,
                )?;
            }
        }

        let before = debt.clone();
        debt.paid_amount = payments.iter().map(|p| p.amount).sum();
        debt.status = status::derive(debt.principal, debt.paid_amount);
        if debt.paid_amount != before.paid_amount || debt.status != before.status {
            debt.updated_at = Utc::now();
            self.storage.debts.upsert(debt.clone())?;
            self.storage.log_update(
                EntityType::Debt,
                debt.id.to_string(),
                Some(debt.description.clone()),
                &before,
                &debt,
            )?;
        }

        self.storage.debts.save()?;
        Ok(debt)
    }

    /// Recompute the received amount and status of a grant
    pub fn reconcile_grant(&self, grant_id: GrantId) -> DefterResult<Grant> {
        let mut grant = self
            .storage
            .grants
            .get(grant_id)?
            .ok_or_else(|| DefterError::grant_not_found(grant_id.to_string()))?;
        let before = grant.clone();

        grant.received_amount = self
            .storage
            .payments
            .get_by_grant(grant_id)?
            .iter()
            .map(|p| p.amount)
            .sum();
        grant.status = status::grant(grant.amount, grant.received_amount);

        if grant.received_amount != before.received_amount || grant.status != before.status {
            grant.updated_at = Utc::now();
            self.storage.grants.upsert(grant.clone())?;
            self.storage.grants.save()?;
            self.storage.log_update(
                EntityType::Grant,
                grant.id.to_string(),
                Some(grant.provider.to_string()),
                &before,
                &grant,
            )?;
        }

        Ok(grant)
    }

    fn reconcile_target(&self, target: &PaymentTarget) -> DefterResult<()> {
        match target {
            PaymentTarget::Debt { debt_id } | PaymentTarget::Installment { debt_id, .. } => {
                self.reconcile_debt(*debt_id)?;
            }
            PaymentTarget::Grant { grant_id } => {
                self.reconcile_grant(*grant_id)?;
            }
        }
        Ok(())
    }

    fn resolve_target(&self, target: PaymentTarget) -> DefterResult<ResolvedTarget> {
        match target {
            PaymentTarget::Debt { debt_id } | PaymentTarget::Installment { debt_id, .. } => {
                let debt = self
                    .storage
                    .debts
                    .get(debt_id)?
                    .ok_or_else(|| DefterError::debt_not_found(debt_id.to_string()))?;
                Ok(ResolvedTarget::Debt(debt))
            }
            PaymentTarget::Grant { grant_id } => {
                let grant = self
                    .storage
                    .grants
                    .get(grant_id)?
                    .ok_or_else(|| DefterError::grant_not_found(grant_id.to_string()))?;
                Ok(ResolvedTarget::Grant(grant))
            }
        }
    }

    /// Check the amount against what is still due and split it over
    /// installments
    fn allocate(
        &self,
        target: &PaymentTarget,
        resolved: &ResolvedTarget,
        amount: Money,
    ) -> DefterResult<Vec<PaymentAllocation>> {
        match (target, resolved) {
            (PaymentTarget::Installment { installment_id, .. }, ResolvedTarget::Debt(debt)) => {
                let installment = self
                    .storage
                    .debts
                    .get_installment(*installment_id)?
                    .filter(|i| i.debt_id == debt.id)
                    .ok_or_else(|| DefterError::installment_not_found(installment_id.to_string()))?;
                if amount > installment.remaining() {
                    return Err(overpayment(installment.remaining(), amount));
                }
                Ok(vec![PaymentAllocation {
                    installment_id: installment.id,
                    amount,
                }])
            }
            (PaymentTarget::Debt { .. }, ResolvedTarget::Debt(debt)) => {
                if amount > debt.remaining() {
                    return Err(overpayment(debt.remaining(), amount));
                }
                let installments = self.storage.debts.installments_for(debt.id)?;
                if installments.is_empty() {
                    return Ok(Vec::new());
                }
                let allocation = allocate_oldest_first(&installments, amount);
                if allocation.unallocated.is_positive() {
                    return Err(overpayment(amount - allocation.unallocated, amount));
                }
                Ok(allocation.allocations)
            }
            (_, ResolvedTarget::Grant(grant)) => {
                if amount > grant.remaining() {
                    return Err(overpayment(grant.remaining(), amount));
                }
                Ok(Vec::new())
            }
            (PaymentTarget::Grant { .. }, ResolvedTarget::Debt(_)) => Err(DefterError::Conflict(
                "Ödeme hedefi çözümlenemedi".into(),
            )),
        }
    }

    /// Ledger transaction mirroring a payment
    fn ledger_entry(
        &self,
        payment: &Payment,
        target: &ResolvedTarget,
        category_id: Option<CategoryId>,
    ) -> DefterResult<Transaction> {
        let (kind, description) = match target {
            ResolvedTarget::Debt(debt) => {
                let kind = match debt.direction {
                    DebtDirection::Payable => TransactionKind::Expense,
                    DebtDirection::Receivable => TransactionKind::Income,
                };
                (kind, format!("{} ödemesi: {}", debt.direction, debt.description))
            }
            ResolvedTarget::Grant(grant) => (
                TransactionKind::Income,
                format!("{} hibe tahsilatı", grant.provider),
            ),
        };

        if let Some(category_id) = category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .ok_or_else(|| DefterError::category_not_found(category_id.to_string()))?;
            if category.kind != kind {
                return Err(DefterError::invalid(
                    "category",
                    format!("'{}' bir {} kategorisi, işlem türü {}", category.name, category.kind, kind),
                ));
            }
        }

        let mut txn = Transaction::new(kind, payment.date, payment.amount, payment.currency);
        txn.method = payment.method;
        txn.description = description;
        txn.category_id = category_id;
        txn.payment_id = Some(payment.id);
        match target {
            ResolvedTarget::Debt(debt) => txn.party_id = Some(debt.party_id),
            ResolvedTarget::Grant(grant) => txn.project_id = Some(grant.project_id),
        }
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Currency, InstallmentPlan, Party, PartyKind, PaymentStatus, Percent, Project,
        GrantProvider, GrantStatus,
    };
    use crate::services::debt::{CreateDebtInput, DebtService};
    use crate::services::testing::{create_test_storage, date};

    fn setup_debt(storage: &Storage, principal: i64, plan: Option<InstallmentPlan>) -> Debt {
        let party = Party::new("Alıcı Ltd", PartyKind::Customer);
        storage.parties.upsert(party.clone()).unwrap();

        let mut input = CreateDebtInput::new(
            DebtDirection::Receivable,
            party.id,
            "Yazılım lisansı",
            Money::from_cents(principal),
            Currency::Try,
            date(2025, 1, 1),
        );
        input.due_date = Some(date(2025, 6, 30));
        input.plan = plan;
        DebtService::new(storage).create(input).unwrap()
    }

    fn setup_grant(storage: &Storage, amount: i64) -> Grant {
        let project = Project::new("Ar-Ge", Money::from_cents(amount * 2), Currency::Try, date(2025, 1, 1));
        storage.projects.upsert(project.clone()).unwrap();
        let grant = Grant::new(
            project.id,
            GrantProvider::Tubitak,
            Percent::whole(50),
            Money::from_cents(amount),
            Currency::Try,
        );
        storage.grants.upsert(grant.clone()).unwrap();
        grant
    }

    fn pay(target: PaymentTarget, day: u32, amount: i64) -> RecordPaymentInput {
        RecordPaymentInput::new(target, date(2025, 2, day), Money::from_cents(amount))
    }

    #[test]
    fn test_installment_partial_then_paid() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, Some(InstallmentPlan::monthly(3, date(2025, 2, 1))));
        let first = storage.debts.installments_for(debt.id).unwrap()[0].clone();
        let service = PaymentService::new(&storage, Currency::Try);
        let target = PaymentTarget::Installment {
            debt_id: debt.id,
            installment_id: first.id,
        };

        service.record(pay(target, 3, 4_000)).unwrap();
        let installment = storage.debts.get_installment(first.id).unwrap().unwrap();
        assert_eq!(installment.status, PaymentStatus::Partial);
        assert!(installment.paid_date.is_none());

        service.record(pay(target, 9, 6_000)).unwrap();
        let installment = storage.debts.get_installment(first.id).unwrap().unwrap();
        assert_eq!(installment.status, PaymentStatus::Paid);
        assert_eq!(installment.paid_date, Some(date(2025, 2, 9)));

        let debt = storage.debts.get(debt.id).unwrap().unwrap();
        assert_eq!(debt.paid_amount.cents(), 10_000);
        assert_eq!(debt.status, PaymentStatus::Partial);
    }

    #[test]
    fn test_debt_payment_fills_oldest_installments() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, Some(InstallmentPlan::monthly(3, date(2025, 2, 1))));
        let service = PaymentService::new(&storage, Currency::Try);

        let payment = service
            .record(pay(PaymentTarget::Debt { debt_id: debt.id }, 10, 15_000))
            .unwrap();
        assert_eq!(payment.allocations.len(), 2);

        let installments = storage.debts.installments_for(debt.id).unwrap();
        assert_eq!(installments[0].status, PaymentStatus::Paid);
        assert_eq!(installments[1].status, PaymentStatus::Partial);
        assert_eq!(installments[1].paid_amount.cents(), 5_000);
        assert_eq!(installments[2].status, PaymentStatus::Pending);

        service
            .record(pay(PaymentTarget::Debt { debt_id: debt.id }, 20, 15_000))
            .unwrap();
        let debt = storage.debts.get(debt.id).unwrap().unwrap();
        assert_eq!(debt.status, PaymentStatus::Paid);
        assert!(storage
            .debts
            .installments_for(debt.id)
            .unwrap()
            .iter()
            .all(|i| i.status == PaymentStatus::Paid));
    }

    #[test]
    fn test_overpayment_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, Some(InstallmentPlan::monthly(3, date(2025, 2, 1))));
        let first = storage.debts.installments_for(debt.id).unwrap()[0].clone();
        let service = PaymentService::new(&storage, Currency::Try);

        let err = service
            .record(pay(
                PaymentTarget::Installment {
                    debt_id: debt.id,
                    installment_id: first.id,
                },
                1,
                10_001,
            ))
            .unwrap_err();
        assert!(matches!(err, DefterError::Overpayment { .. }));

        let err = service
            .record(pay(PaymentTarget::Debt { debt_id: debt.id }, 1, 30_001))
            .unwrap_err();
        match err {
            DefterError::Overpayment { remaining, attempted } => {
                assert_eq!(remaining.cents(), 30_000);
                assert_eq!(attempted.cents(), 30_001);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(storage.payments.count().unwrap(), 0);
    }

    #[test]
    fn test_currency_must_match_target() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, None);
        let service = PaymentService::new(&storage, Currency::Try);

        let mut input = pay(PaymentTarget::Debt { debt_id: debt.id }, 1, 1_000);
        input.currency = Some(Currency::Usd);
        assert!(matches!(
            service.record(input).unwrap_err(),
            DefterError::CurrencyMismatch { .. }
        ));
    }

    #[test]
    fn test_delete_restores_previous_state() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, Some(InstallmentPlan::monthly(3, date(2025, 2, 1))));
        let service = PaymentService::new(&storage, Currency::Try);

        let first = service
            .record(pay(PaymentTarget::Debt { debt_id: debt.id }, 5, 10_000))
            .unwrap();
        let second = service
            .record(pay(PaymentTarget::Debt { debt_id: debt.id }, 6, 5_000))
            .unwrap();

        service.delete(second.id).unwrap();
        let installments = storage.debts.installments_for(debt.id).unwrap();
        assert_eq!(installments[0].status, PaymentStatus::Paid);
        assert_eq!(installments[1].status, PaymentStatus::Pending);
        assert_eq!(installments[1].paid_amount.cents(), 0);

        service.delete(first.id).unwrap();
        let debt = storage.debts.get(debt.id).unwrap().unwrap();
        assert_eq!(debt.status, PaymentStatus::Pending);
        assert!(debt.paid_amount.is_zero());
        assert!(storage
            .debts
            .installments_for(debt.id)
            .unwrap()
            .iter()
            .all(|i| i.paid_date.is_none()));
    }

    #[test]
    fn test_linked_transaction_follows_payment() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, None);
        let service = PaymentService::new(&storage, Currency::Try);

        let mut input = pay(PaymentTarget::Debt { debt_id: debt.id }, 5, 12_000);
        input.create_transaction = true;
        let payment = service.record(input).unwrap();

        let txn_id = payment.transaction_id.unwrap();
        let txn = storage.transactions.get(txn_id).unwrap().unwrap();
        assert!(txn.is_income());
        assert_eq!(txn.party_id, Some(debt.party_id));
        assert_eq!(txn.payment_id, Some(payment.id));
        assert_eq!(txn.tax.net.cents(), 12_000);

        service.delete(payment.id).unwrap();
        assert!(storage.transactions.get(txn_id).unwrap().is_none());
    }

    #[test]
    fn test_failed_save_leaves_no_linked_transaction() {
        let (_temp_dir, storage) = create_test_storage();
        let debt = setup_debt(&storage, 30_000, None);
        let service = PaymentService::new(&storage, Currency::Try);

        // A directory in place of the data file makes the rename fail
        let blocked = storage.paths().payments_file();
        std::fs::create_dir_all(blocked.join("blocked")).unwrap();

        let mut input = pay(PaymentTarget::Debt { debt_id: debt.id }, 5, 12_000);
        input.create_transaction = true;
        assert!(service.record(input).is_err());

        assert_eq!(storage.payments.count().unwrap(), 0);
        assert_eq!(storage.transactions.count().unwrap(), 0);
        let debt = storage.debts.get(debt.id).unwrap().unwrap();
        assert!(debt.paid_amount.is_zero());
    }

    #[test]
    fn test_grant_payments_update_received() {
        let (_temp_dir, storage) = create_test_storage();
        let grant = setup_grant(&storage, 50_000);
        let service = PaymentService::new(&storage, Currency::Try);
        let target = PaymentTarget::Grant { grant_id: grant.id };

        service.record(pay(target, 1, 20_000)).unwrap();
        let partial = storage.grants.get(grant.id).unwrap().unwrap();
        assert_eq!(partial.status, GrantStatus::Partial);
        assert_eq!(partial.received_amount.cents(), 20_000);

        assert!(matches!(
            service.record(pay(target, 2, 30_001)).unwrap_err(),
            DefterError::Overpayment { .. }
        ));

        let mut last = pay(target, 3, 30_000);
        last.create_transaction = true;
        service.record(last).unwrap();
        let received = storage.grants.get(grant.id).unwrap().unwrap();
        assert_eq!(received.status, GrantStatus::Received);

        let txn = service.list(PaymentFilter::new().grant(grant.id)).unwrap()[1]
            .transaction_id
            .and_then(|id| storage.transactions.get(id).unwrap())
            .unwrap();
        assert_eq!(txn.project_id, Some(grant.project_id));
    }

    #[test]
    fn test_installment_of_other_debt_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let first = setup_debt(&storage, 30_000, Some(InstallmentPlan::monthly(3, date(2025, 2, 1))));
        let other_party = Party::new("Başka", PartyKind::Customer);
        storage.parties.upsert(other_party.clone()).unwrap();
        let mut input = CreateDebtInput::new(
            DebtDirection::Receivable,
            other_party.id,
            "Başka borç",
            Money::from_cents(5_000),
            Currency::Try,
            date(2025, 1, 1),
        );
        input.due_date = Some(date(2025, 3, 1));
        let second = DebtService::new(&storage).create(input).unwrap();
        let installment = storage.debts.installments_for(first.id).unwrap()[0].clone();

        let err = PaymentService::new(&storage, Currency::Try)
            .record(pay(
                PaymentTarget::Installment {
                    debt_id: second.id,
                    installment_id: installment.id,
                },
                1,
                100,
            ))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
