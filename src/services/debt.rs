//! Debt service
//!
//! Payables and receivables with optional installment schedules. The
//! schedule always sums to the principal; once a payment is recorded the
//! principal and schedule are frozen.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::finance::schedule;
use crate::models::{
    Currency, Debt, DebtDirection, DebtId, Installment, InstallmentPlan, Money, PartyId,
    PaymentStatus, Percent,
};
use crate::storage::Storage;

/// Service for debt and receivable management
pub struct DebtService<'a> {
    storage: &'a Storage,
}

/// Input for creating a debt or receivable
#[derive(Debug, Clone)]
pub struct CreateDebtInput {
    pub direction: DebtDirection,
    pub party_id: PartyId,
    pub description: String,
    pub principal: Money,
    pub currency: Currency,
    pub issue_date: NaiveDate,
    /// Defaults to the last installment's due date when a plan is given
    pub due_date: Option<NaiveDate>,
    pub vat_rate: Option<Percent>,
    pub withholding_rate: Option<Percent>,
    pub notes: Option<String>,
    pub plan: Option<InstallmentPlan>,
}

impl CreateDebtInput {
    pub fn new(
        direction: DebtDirection,
        party_id: PartyId,
        description: impl Into<String>,
        principal: Money,
        currency: Currency,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            direction,
            party_id,
            description: description.into(),
            principal,
            currency,
            issue_date,
            due_date: None,
            vat_rate: None,
            withholding_rate: None,
            notes: None,
            plan: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDebtInput {
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Only accepted while the debt has no payments
    pub principal: Option<Money>,
    pub vat_rate: Option<Option<Percent>>,
    pub withholding_rate: Option<Option<Percent>>,
}

/// Options for filtering debts
#[derive(Debug, Clone, Default)]
pub struct DebtFilter {
    pub direction: Option<DebtDirection>,
    pub party_id: Option<PartyId>,
    /// Matched against the effective status on `as_of`
    pub status: Option<PaymentStatus>,
    pub overdue_only: bool,
    pub include_paid: bool,
    pub as_of: Option<NaiveDate>,
}

impl DebtFilter {
    pub fn new() -> Self {
        Self {
            include_paid: true,
            ..Default::default()
        }
    }

    pub fn direction(mut self, direction: DebtDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn party(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn overdue_only(mut self) -> Self {
        self.overdue_only = true;
        self
    }

    pub fn open_only(mut self) -> Self {
        self.include_paid = false;
        self
    }

    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }
}

/// A debt with its schedule as seen on a given day
#[derive(Debug, Clone)]
pub struct DebtSummary {
    pub debt: Debt,
    pub installments: Vec<Installment>,
    pub principal: Money,
    pub paid: Money,
    pub remaining: Money,
    pub status: PaymentStatus,
    /// First open installment that is not yet overdue
    pub next_due: Option<Installment>,
    pub overdue: Vec<Installment>,
}

impl DebtSummary {
    pub fn overdue_amount(&self) -> Money {
        self.overdue.iter().map(|i| i.remaining()).sum()
    }
}

fn build_installments(debt: &Debt, plan: &InstallmentPlan) -> DefterResult<Vec<Installment>> {
    let planned = schedule(
        debt.principal,
        plan.count,
        plan.first_due_date,
        plan.interval_months,
    )?;
    Ok(planned
        .into_iter()
        .map(|p| Installment::new(debt.id, p.sequence, p.due_date, p.amount))
        .collect())
}

impl<'a> DebtService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateDebtInput) -> DefterResult<Debt> {
        let party = self
            .storage
            .parties
            .get(input.party_id)?
            .ok_or_else(|| DefterError::party_not_found(input.party_id.to_string()))?;
        if party.archived {
            return Err(DefterError::invalid(
                "party",
                format!("'{}' carisi arşivlenmiş", party.name),
            ));
        }

        let mut debt = Debt::new(
            input.direction,
            input.party_id,
            input.description.trim(),
            input.principal,
            input.currency,
            input.issue_date,
            input.due_date.unwrap_or(input.issue_date),
        );
        debt.vat_rate = input.vat_rate;
        debt.withholding_rate = input.withholding_rate;
        debt.notes = input.notes.unwrap_or_default();
        debt.installment_plan = input.plan;

        let installments = match &input.plan {
            Some(plan) => {
                debt.validate()?;
                let installments = build_installments(&debt, plan)?;
                if input.due_date.is_none() {
                    if let Some(last) = installments.last() {
                        debt.due_date = last.due_date;
                    }
                }
                installments
            }
            None if input.due_date.is_none() => {
                return Err(DefterError::invalid(
                    "due_date",
                    "Taksit planı yoksa vade tarihi girilmelidir",
                ));
            }
            None => Vec::new(),
        };

        debt.validate()?;

        self.storage.debts.upsert(debt.clone())?;
        self.storage.debts.replace_installments(debt.id, installments.clone())?;
        self.storage.debts.save()?;

        self.storage.log_create(
            EntityType::Debt,
            debt.id.to_string(),
            Some(debt.description.clone()),
            &debt,
        )?;
        for installment in &installments {
            self.storage.log_create(
                EntityType::Installment,
                installment.id.to_string(),
                Some(format!("{} #{}", debt.description, installment.sequence)),
                installment,
            )?;
        }

        tracing::debug!(debt = %debt.id, installments = installments.len(), "debt created");
        Ok(debt)
    }

    pub fn get(&self, id: DebtId) -> DefterResult<Option<Debt>> {
        self.storage.debts.get(id)
    }

    pub fn find(&self, identifier: &str) -> DefterResult<Option<Debt>> {
        self.storage.debts.find(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> DefterResult<Debt> {
        self.find(identifier)?
            .ok_or_else(|| DefterError::debt_not_found(identifier))
    }

    pub fn installments(&self, id: DebtId) -> DefterResult<Vec<Installment>> {
        self.storage.debts.installments_for(id)
    }

    /// Debts matching the filter, earliest due first
    pub fn list(&self, filter: DebtFilter) -> DefterResult<Vec<Debt>> {
        let today = filter.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let debts = match filter.party_id {
            Some(party_id) => self.storage.debts.get_by_party(party_id)?,
            None => self.storage.debts.get_all()?,
        };

        let mut debts: Vec<Debt> = debts
            .into_iter()
            .filter(|d| filter.direction.map_or(true, |dir| d.direction == dir))
            .filter(|d| filter.include_paid || !d.is_paid())
            .filter(|d| {
                let status = d.effective_status(today);
                filter.status.map_or(true, |s| status == s)
                    && (!filter.overdue_only || status == PaymentStatus::Overdue)
            })
            .collect();
        debts.sort_by_key(|d| (d.due_date, d.issue_date));
        Ok(debts)
    }

    pub fn update(&self, id: DebtId, input: UpdateDebtInput) -> DefterResult<Debt> {
        let mut debt = self
            .storage
            .debts
            .get(id)?
            .ok_or_else(|| DefterError::debt_not_found(id.to_string()))?;
        let before = debt.clone();

        if let Some(description) = input.description {
            debt.description = description.trim().to_string();
        }
        if let Some(due_date) = input.due_date {
            debt.due_date = due_date;
        }
        if let Some(notes) = input.notes {
            debt.notes = notes;
        }
        if let Some(rate) = input.vat_rate {
            debt.vat_rate = rate;
        }
        if let Some(rate) = input.withholding_rate {
            debt.withholding_rate = rate;
        }

        let mut regenerated = None;
        if let Some(principal) = input.principal.filter(|p| *p != debt.principal) {
            self.ensure_no_payments(&debt, "Ödemesi olan kaydın anaparası değiştirilemez")?;
            debt.principal = principal;
            if let Some(plan) = &debt.installment_plan {
                debt.validate()?;
                regenerated = Some(build_installments(&debt, plan)?);
            }
        }

        debt.updated_at = Utc::now();
        debt.validate()?;

        self.storage.debts.upsert(debt.clone())?;
        if let Some(installments) = regenerated {
            self.storage.debts.replace_installments(debt.id, installments)?;
        }
        self.storage.debts.save()?;

        self.storage.log_update(
            EntityType::Debt,
            debt.id.to_string(),
            Some(debt.description.clone()),
            &before,
            &debt,
        )?;

        Ok(debt)
    }

    /// Replace the installment schedule, or drop it with `None`
    pub fn reschedule(&self, id: DebtId, plan: Option<InstallmentPlan>) -> DefterResult<Debt> {
        let mut debt = self
            .storage
            .debts
            .get(id)?
            .ok_or_else(|| DefterError::debt_not_found(id.to_string()))?;
        self.ensure_no_payments(&debt, "Ödemesi olan kaydın taksitleri yeniden planlanamaz")?;
        let before = debt.clone();

        let installments = match &plan {
            Some(plan) => build_installments(&debt, plan)?,
            None => Vec::new(),
        };
        if let Some(last) = installments.last() {
            debt.due_date = last.due_date;
        }
        debt.installment_plan = plan;
        debt.updated_at = Utc::now();
        debt.validate()?;

        self.storage.debts.upsert(debt.clone())?;
        self.storage.debts.replace_installments(debt.id, installments)?;
        self.storage.debts.save()?;

        self.storage.log_update(
            EntityType::Debt,
            debt.id.to_string(),
            Some(debt.description.clone()),
            &before,
            &debt,
        )?;

        Ok(debt)
    }

    /// Delete a debt without payments, together with its installments
    pub fn delete(&self, id: DebtId) -> DefterResult<Debt> {
        let debt = self
            .storage
            .debts
            .get(id)?
            .ok_or_else(|| DefterError::debt_not_found(id.to_string()))?;
        self.ensure_no_payments(&debt, "Ödemesi olan kayıt silinemez; önce ödemeleri silin")?;

        self.storage.debts.delete(id)?;
        self.storage.debts.save()?;

        self.storage.log_delete(
            EntityType::Debt,
            debt.id.to_string(),
            Some(debt.description.clone()),
            &debt,
        )?;

        Ok(debt)
    }

    pub fn summary(&self, id: DebtId, today: NaiveDate) -> DefterResult<DebtSummary> {
        let debt = self
            .storage
            .debts
            .get(id)?
            .ok_or_else(|| DefterError::debt_not_found(id.to_string()))?;
        let installments = self.storage.debts.installments_for(id)?;

        let overdue: Vec<Installment> = installments
            .iter()
            .filter(|i| i.effective_status(today) == PaymentStatus::Overdue)
            .cloned()
            .collect();
        let next_due = installments
            .iter()
            .filter(|i| i.is_open() && i.due_date >= today)
            .min_by_key(|i| (i.due_date, i.sequence))
            .cloned();

        Ok(DebtSummary {
            principal: debt.principal,
            paid: debt.paid_amount,
            remaining: debt.remaining(),
            status: debt.effective_status(today),
            next_due,
            overdue,
            installments,
            debt,
        })
    }

    fn ensure_no_payments(&self, debt: &Debt, message: &str) -> DefterResult<()> {
        let payments = self.storage.payments.get_by_debt(debt.id)?.len();
        if payments > 0 {
            return Err(DefterError::Conflict(format!(
                "{} ({} ödeme kayıtlı)",
                message, payments
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Party, PartyKind, Payment, PaymentTarget};
    use crate::services::testing::{create_test_storage, date};

    fn setup_party(storage: &Storage) -> PartyId {
        let party = Party::new("Tedarikçi A.Ş.", PartyKind::Supplier);
        storage.parties.upsert(party.clone()).unwrap();
        party.id
    }

    fn payable(party_id: PartyId, principal: i64) -> CreateDebtInput {
        CreateDebtInput::new(
            DebtDirection::Payable,
            party_id,
            "Makine alımı",
            Money::from_cents(principal),
            Currency::Try,
            date(2025, 1, 1),
        )
    }

    #[test]
    fn test_create_with_plan_sums_to_principal() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let mut input = payable(party_id, 10_000);
        input.plan = Some(InstallmentPlan::monthly(3, date(2025, 1, 31)));
        let debt = service.create(input).unwrap();

        let installments = service.installments(debt.id).unwrap();
        let amounts: Vec<i64> = installments.iter().map(|i| i.amount.cents()).collect();
        assert_eq!(amounts, vec![3_333, 3_333, 3_334]);
        assert_eq!(installments[1].due_date, date(2025, 2, 28));
        assert_eq!(debt.due_date, date(2025, 3, 31));
    }

    #[test]
    fn test_create_without_plan_needs_due_date() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let err = service.create(payable(party_id, 10_000)).unwrap_err();
        assert!(err.validation_errors().unwrap().get("due_date").is_some());

        let mut input = payable(party_id, 10_000);
        input.due_date = Some(date(2025, 2, 1));
        let debt = service.create(input).unwrap();
        assert!(service.installments(debt.id).unwrap().is_empty());
    }

    #[test]
    fn test_plan_with_empty_installments_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let mut input = payable(party_id, 5);
        input.plan = Some(InstallmentPlan::monthly(10, date(2025, 1, 31)));
        let err = service.create(input).unwrap_err();
        assert!(err.validation_errors().unwrap().get("count").is_some());
        assert_eq!(storage.debts.count().unwrap(), 0);
    }

    #[test]
    fn test_unknown_party_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = DebtService::new(&storage);
        let mut input = payable(PartyId::new(), 10_000);
        input.due_date = Some(date(2025, 2, 1));
        assert!(service.create(input).unwrap_err().is_not_found());
    }

    #[test]
    fn test_principal_change_regenerates_schedule() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let mut input = payable(party_id, 30_000);
        input.plan = Some(InstallmentPlan::monthly(3, date(2025, 2, 1)));
        let debt = service.create(input).unwrap();

        service
            .update(
                debt.id,
                UpdateDebtInput {
                    principal: Some(Money::from_cents(60_000)),
                    ..Default::default()
                },
            )
            .unwrap();

        let installments = service.installments(debt.id).unwrap();
        assert_eq!(installments.len(), 3);
        assert!(installments.iter().all(|i| i.amount.cents() == 20_000));
    }

    #[test]
    fn test_payments_freeze_principal_and_block_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let mut input = payable(party_id, 30_000);
        input.due_date = Some(date(2025, 3, 1));
        let debt = service.create(input).unwrap();

        let payment = Payment::new(
            PaymentTarget::Debt { debt_id: debt.id },
            date(2025, 1, 15),
            Money::from_cents(1_000),
            Currency::Try,
        );
        storage.payments.upsert(payment).unwrap();

        let err = service
            .update(
                debt.id,
                UpdateDebtInput {
                    principal: Some(Money::from_cents(40_000)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DefterError::Conflict(_)));
        assert!(matches!(service.delete(debt.id), Err(DefterError::Conflict(_))));
        assert!(matches!(
            service.reschedule(debt.id, Some(InstallmentPlan::monthly(2, date(2025, 2, 1)))),
            Err(DefterError::Conflict(_))
        ));

        // Descriptive fields stay editable
        let updated = service
            .update(
                debt.id,
                UpdateDebtInput {
                    notes: Some("vade uzatıldı".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.notes, "vade uzatıldı");
    }

    #[test]
    fn test_reschedule_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let mut input = payable(party_id, 12_000);
        input.due_date = Some(date(2025, 6, 1));
        let debt = service.create(input).unwrap();

        let plan = InstallmentPlan {
            count: 4,
            first_due_date: date(2025, 2, 1),
            interval_months: 3,
        };
        let rescheduled = service.reschedule(debt.id, Some(plan)).unwrap();
        assert_eq!(rescheduled.due_date, date(2025, 11, 1));
        assert_eq!(service.installments(debt.id).unwrap().len(), 4);

        service.delete(debt.id).unwrap();
        assert!(service.get(debt.id).unwrap().is_none());
        assert!(storage.debts.all_installments().unwrap().is_empty());
    }

    #[test]
    fn test_summary_and_overdue_filter() {
        let (_temp_dir, storage) = create_test_storage();
        let party_id = setup_party(&storage);
        let service = DebtService::new(&storage);

        let mut input = payable(party_id, 30_000);
        input.plan = Some(InstallmentPlan::monthly(3, date(2025, 2, 1)));
        let debt = service.create(input).unwrap();

        let today = date(2025, 3, 15);
        let summary = service.summary(debt.id, today).unwrap();
        assert_eq!(summary.overdue.len(), 2);
        assert_eq!(summary.overdue_amount().cents(), 20_000);
        assert_eq!(summary.next_due.unwrap().sequence, 3);
        assert_eq!(summary.remaining.cents(), 30_000);
        assert_eq!(summary.status, PaymentStatus::Pending);

        let overdue = service
            .list(DebtFilter::new().overdue_only().as_of(date(2025, 4, 2)))
            .unwrap();
        assert_eq!(overdue.len(), 1);
        let none_overdue = service
            .list(DebtFilter::new().overdue_only().as_of(today))
            .unwrap();
        assert!(none_overdue.is_empty());
    }
}
