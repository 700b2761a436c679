//! Project service
//!
//! Projects, their milestones, and the project-level summary that ties in
//! linked transactions and grant funding. Milestone amounts may never add up
//! to more than the contract amount.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::models::{
    Currency, Milestone, MilestoneId, MilestoneStatus, Money, PartyId, Project, ProjectId,
    ProjectStatus,
};
use crate::services::GrantService;
use crate::storage::Storage;

/// Service for projects and milestones
pub struct ProjectService<'a> {
    storage: &'a Storage,
}

#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    pub name: String,
    pub party_id: Option<PartyId>,
    pub description: Option<String>,
    pub contract_amount: Money,
    pub currency: Currency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
}

impl CreateProjectInput {
    pub fn new(
        name: impl Into<String>,
        contract_amount: Money,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            party_id: None,
            description: None,
            contract_amount,
            currency,
            start_date,
            end_date: None,
            status: ProjectStatus::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub party_id: Option<Option<PartyId>>,
    pub description: Option<String>,
    pub contract_amount: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMilestoneInput {
    pub title: Option<String>,
    pub amount: Option<Money>,
    pub due_date: Option<NaiveDate>,
}

/// Financial position of one project
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub project: Project,
    pub milestone_count: usize,
    pub milestones_done: usize,
    /// Sum of all milestone amounts
    pub planned: Money,
    /// Sum of completed or invoiced milestone amounts
    pub completed: Money,
    /// Completed share of the contract, 0..=100
    pub completion_percent: Decimal,
    /// Base-currency totals of linked transactions
    pub income: Money,
    pub expense: Money,
    pub transaction_count: usize,
    pub grant_amount: Money,
    pub grant_received: Money,
}

impl ProjectSummary {
    pub fn profit(&self) -> Money {
        self.income - self.expense
    }

    pub fn grant_remaining(&self) -> Money {
        self.grant_amount - self.grant_received
    }

    /// Contract amount not yet assigned to a milestone
    pub fn unplanned(&self) -> Money {
        self.project.contract_amount - self.planned
    }
}

impl<'a> ProjectService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateProjectInput) -> DefterResult<Project> {
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, None)?;
        if let Some(party_id) = input.party_id {
            self.storage
                .parties
                .get(party_id)?
                .ok_or_else(|| DefterError::party_not_found(party_id.to_string()))?;
        }

        let mut project = Project::new(name, input.contract_amount, input.currency, input.start_date);
        project.party_id = input.party_id;
        project.description = input.description.unwrap_or_default();
        project.end_date = input.end_date;
        project.status = input.status;

        project.validate()?;

        self.storage.projects.upsert(project.clone())?;
        self.storage.projects.save()?;

        self.storage.log_create(
            EntityType::Project,
            project.id.to_string(),
            Some(project.name.clone()),
            &project,
        )?;

        Ok(project)
    }

    pub fn get(&self, id: ProjectId) -> DefterResult<Option<Project>> {
        self.storage.projects.get(id)
    }

    pub fn find(&self, identifier: &str) -> DefterResult<Option<Project>> {
        self.storage.projects.find(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> DefterResult<Project> {
        self.find(identifier)?
            .ok_or_else(|| DefterError::project_not_found(identifier))
    }

    pub fn list(&self, status: Option<ProjectStatus>) -> DefterResult<Vec<Project>> {
        let projects = self.storage.projects.get_all()?;
        Ok(projects
            .into_iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .collect())
    }

    pub fn update(&self, id: ProjectId, input: UpdateProjectInput) -> DefterResult<Project> {
        let mut project = self
            .storage
            .projects
            .get(id)?
            .ok_or_else(|| DefterError::project_not_found(id.to_string()))?;
        let before = project.clone();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            self.ensure_name_free(&name, Some(id))?;
            project.name = name;
        }
        if let Some(party_id) = input.party_id {
            if let Some(party_id) = party_id {
                self.storage
                    .parties
                    .get(party_id)?
                    .ok_or_else(|| DefterError::party_not_found(party_id.to_string()))?;
            }
            project.party_id = party_id;
        }
        if let Some(description) = input.description {
            project.description = description;
        }
        if let Some(start_date) = input.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            project.end_date = end_date;
        }
        if let Some(status) = input.status {
            project.status = status;
        }

        let grants = GrantService::new(self.storage);
        let contract_changed = match input.contract_amount {
            Some(amount) if amount != project.contract_amount => {
                let planned = self.planned_total(id, None)?;
                if planned > amount {
                    return Err(DefterError::Conflict(format!(
                        "Kilometre taşları toplamı {} sözleşme tutarını aşıyor",
                        planned.format_with_currency(project.currency)
                    )));
                }
                grants.check_contract_change(id, amount)?;
                project.contract_amount = amount;
                true
            }
            _ => false,
        };

        project.updated_at = Utc::now();
        project.validate()?;

        self.storage.projects.upsert(project.clone())?;
        self.storage.projects.save()?;

        self.storage.log_update(
            EntityType::Project,
            project.id.to_string(),
            Some(project.name.clone()),
            &before,
            &project,
        )?;

        if contract_changed {
            grants.recalculate_for_project(&project)?;
        }

        Ok(project)
    }

    /// Delete a project without transactions or grants; milestones go
    /// with it
    pub fn delete(&self, id: ProjectId) -> DefterResult<Project> {
        let project = self
            .storage
            .projects
            .get(id)?
            .ok_or_else(|| DefterError::project_not_found(id.to_string()))?;

        let transactions = self.storage.transactions.get_by_project(id)?.len();
        let grants = self.storage.grants.get_by_project(id)?.len();
        if transactions + grants > 0 {
            return Err(DefterError::Conflict(format!(
                "'{}' projesine bağlı {} işlem ve {} hibe var",
                project.name, transactions, grants
            )));
        }

        self.storage.projects.delete(id)?;
        self.storage.projects.save()?;

        self.storage.log_delete(
            EntityType::Project,
            project.id.to_string(),
            Some(project.name.clone()),
            &project,
        )?;

        Ok(project)
    }

    // === Milestones ===

    pub fn milestones(&self, project_id: ProjectId) -> DefterResult<Vec<Milestone>> {
        self.storage.projects.milestones_for(project_id)
    }

    pub fn find_milestone(&self, identifier: &str) -> DefterResult<Milestone> {
        self.storage
            .projects
            .find_milestone(identifier)?
            .ok_or_else(|| DefterError::milestone_not_found(identifier))
    }

    pub fn add_milestone(
        &self,
        project_id: ProjectId,
        title: &str,
        amount: Money,
        due_date: NaiveDate,
    ) -> DefterResult<Milestone> {
        let project = self
            .storage
            .projects
            .get(project_id)?
            .ok_or_else(|| DefterError::project_not_found(project_id.to_string()))?;

        let milestone = Milestone::new(project_id, title.trim(), amount, due_date);
        milestone.validate()?;
        self.ensure_within_contract(&project, amount, None)?;

        self.storage.projects.upsert_milestone(milestone.clone())?;
        self.storage.projects.save()?;

        self.storage.log_create(
            EntityType::Milestone,
            milestone.id.to_string(),
            Some(milestone.title.clone()),
            &milestone,
        )?;

        Ok(milestone)
    }

    pub fn update_milestone(&self, id: MilestoneId, input: UpdateMilestoneInput) -> DefterResult<Milestone> {
        let mut milestone = self
            .storage
            .projects
            .get_milestone(id)?
            .ok_or_else(|| DefterError::milestone_not_found(id.to_string()))?;
        let before = milestone.clone();

        if let Some(title) = input.title {
            milestone.title = title.trim().to_string();
        }
        if let Some(due_date) = input.due_date {
            milestone.due_date = due_date;
        }
        if let Some(amount) = input.amount {
            let project = self
                .storage
                .projects
                .get(milestone.project_id)?
                .ok_or_else(|| DefterError::project_not_found(milestone.project_id.to_string()))?;
            self.ensure_within_contract(&project, amount, Some(id))?;
            milestone.amount = amount;
        }
        milestone.updated_at = Utc::now();
        milestone.validate()?;

        self.save_milestone(&before, &milestone)?;
        Ok(milestone)
    }

    pub fn complete_milestone(&self, id: MilestoneId, date: NaiveDate) -> DefterResult<Milestone> {
        self.transition_milestone(id, |m| {
            if m.status.is_done() {
                return Err(DefterError::Conflict(format!("'{}' zaten tamamlanmış", m.title)));
            }
            m.complete(date);
            Ok(())
        })
    }

    pub fn invoice_milestone(&self, id: MilestoneId) -> DefterResult<Milestone> {
        self.transition_milestone(id, |m| {
            if m.status != MilestoneStatus::Completed {
                return Err(DefterError::Conflict(format!(
                    "'{}' faturalanmadan önce tamamlanmalıdır",
                    m.title
                )));
            }
            m.status = MilestoneStatus::Invoiced;
            m.updated_at = Utc::now();
            Ok(())
        })
    }

    pub fn reopen_milestone(&self, id: MilestoneId) -> DefterResult<Milestone> {
        self.transition_milestone(id, |m| {
            m.reopen();
            Ok(())
        })
    }

    pub fn delete_milestone(&self, id: MilestoneId) -> DefterResult<Milestone> {
        let milestone = self
            .storage
            .projects
            .get_milestone(id)?
            .ok_or_else(|| DefterError::milestone_not_found(id.to_string()))?;

        self.storage.projects.delete_milestone(id)?;
        self.storage.projects.save()?;

        self.storage.log_delete(
            EntityType::Milestone,
            milestone.id.to_string(),
            Some(milestone.title.clone()),
            &milestone,
        )?;

        Ok(milestone)
    }

    // === Summary ===

    pub fn summary(&self, id: ProjectId) -> DefterResult<ProjectSummary> {
        let project = self
            .storage
            .projects
            .get(id)?
            .ok_or_else(|| DefterError::project_not_found(id.to_string()))?;

        let milestones = self.storage.projects.milestones_for(id)?;
        let planned: Money = milestones.iter().map(|m| m.amount).sum();
        let done: Vec<&Milestone> = milestones.iter().filter(|m| m.status.is_done()).collect();
        let completed: Money = done.iter().map(|m| m.amount).sum();

        let completion_percent = if project.contract_amount.is_positive() {
            (completed.to_decimal() / project.contract_amount.to_decimal() * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        } else if !milestones.is_empty() {
            (Decimal::from(done.len() as u64) / Decimal::from(milestones.len() as u64)
                * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };

        let transactions = self.storage.transactions.get_by_project(id)?;
        let income: Money = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.base_net)
            .sum();
        let expense: Money = transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.base_net)
            .sum();

        let grants = self.storage.grants.get_by_project(id)?;
        let grant_amount: Money = grants.iter().map(|g| g.amount).sum();
        let grant_received: Money = grants.iter().map(|g| g.received_amount).sum();

        Ok(ProjectSummary {
            milestone_count: milestones.len(),
            milestones_done: done.len(),
            planned,
            completed,
            completion_percent,
            income,
            expense,
            transaction_count: transactions.len(),
            grant_amount,
            grant_received,
            project,
        })
    }

    fn transition_milestone<F>(&self, id: MilestoneId, apply: F) -> DefterResult<Milestone>
    where
        F: FnOnce(&mut Milestone) -> DefterResult<()>,
    {
        let mut milestone = self
            .storage
            .projects
            .get_milestone(id)?
            .ok_or_else(|| DefterError::milestone_not_found(id.to_string()))?;
        let before = milestone.clone();
        apply(&mut milestone)?;
        self.save_milestone(&before, &milestone)?;
        Ok(milestone)
    }

    fn save_milestone(&self, before: &Milestone, milestone: &Milestone) -> DefterResult<()> {
        self.storage.projects.upsert_milestone(milestone.clone())?;
        self.storage.projects.save()?;
        self.storage.log_update(
            EntityType::Milestone,
            milestone.id.to_string(),
            Some(milestone.title.clone()),
            before,
            milestone,
        )
    }

    fn planned_total(&self, project_id: ProjectId, except: Option<MilestoneId>) -> DefterResult<Money> {
        Ok(self
            .storage
            .projects
            .milestones_for(project_id)?
            .iter()
            .filter(|m| Some(m.id) != except)
            .map(|m| m.amount)
            .sum())
    }

    fn ensure_within_contract(
        &self,
        project: &Project,
        amount: Money,
        except: Option<MilestoneId>,
    ) -> DefterResult<()> {
        let planned = self.planned_total(project.id, except)?;
        if planned + amount > project.contract_amount {
            return Err(DefterError::invalid(
                "amount",
                format!(
                    "Kilometre taşları toplamı sözleşme tutarını aşamaz (kalan {})",
                    (project.contract_amount - planned).format_with_currency(project.currency)
                ),
            ));
        }
        Ok(())
    }

    fn ensure_name_free(&self, name: &str, except: Option<ProjectId>) -> DefterResult<()> {
        if let Some(existing) = self.storage.projects.get_by_name(name)? {
            if Some(existing.id) != except {
                return Err(DefterError::Duplicate {
                    entity_type: "Proje",
                    identifier: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GrantProvider, Percent, Transaction, TransactionKind};
    use crate::services::grant::CreateGrantInput;
    use crate::services::testing::{create_test_storage, date};
    use rust_decimal_macros::dec;

    fn create_project(service: &ProjectService, contract: i64) -> Project {
        service
            .create(CreateProjectInput::new(
                "Mobil Uygulama",
                Money::from_cents(contract),
                Currency::Try,
                date(2025, 1, 1),
            ))
            .unwrap()
    }

    #[test]
    fn test_unique_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        create_project(&service, 100_000);

        let err = service
            .create(CreateProjectInput::new(
                "mobil uygulama",
                Money::from_cents(1),
                Currency::Try,
                date(2025, 1, 1),
            ))
            .unwrap_err();
        assert!(matches!(err, DefterError::Duplicate { .. }));
    }

    #[test]
    fn test_milestones_limited_by_contract() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = create_project(&service, 100_000);

        let design = service
            .add_milestone(project.id, "Tasarım", Money::from_cents(60_000), date(2025, 2, 1))
            .unwrap();
        assert!(service
            .add_milestone(project.id, "Geliştirme", Money::from_cents(40_001), date(2025, 3, 1))
            .unwrap_err()
            .is_validation());
        service
            .add_milestone(project.id, "Geliştirme", Money::from_cents(40_000), date(2025, 3, 1))
            .unwrap();

        // Resizing a milestone does not count its old amount twice
        assert!(service
            .update_milestone(
                design.id,
                UpdateMilestoneInput {
                    amount: Some(Money::from_cents(50_000)),
                    ..Default::default()
                },
            )
            .is_ok());

        // Contract cannot shrink below planned milestones
        let err = service
            .update(
                project.id,
                UpdateProjectInput {
                    contract_amount: Some(Money::from_cents(80_000)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DefterError::Conflict(_)));
    }

    #[test]
    fn test_milestone_lifecycle() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = create_project(&service, 100_000);
        let milestone = service
            .add_milestone(project.id, "Teslim", Money::from_cents(100_000), date(2025, 6, 1))
            .unwrap();

        assert!(matches!(
            service.invoice_milestone(milestone.id),
            Err(DefterError::Conflict(_))
        ));
        let done = service.complete_milestone(milestone.id, date(2025, 5, 20)).unwrap();
        assert_eq!(done.completed_date, Some(date(2025, 5, 20)));
        assert!(matches!(
            service.complete_milestone(milestone.id, date(2025, 5, 21)),
            Err(DefterError::Conflict(_))
        ));
        let invoiced = service.invoice_milestone(milestone.id).unwrap();
        assert_eq!(invoiced.status, MilestoneStatus::Invoiced);

        let reopened = service.reopen_milestone(milestone.id).unwrap();
        assert_eq!(reopened.status, MilestoneStatus::Pending);

        service.delete_milestone(milestone.id).unwrap();
        assert!(service.milestones(project.id).unwrap().is_empty());
    }

    #[test]
    fn test_contract_change_recalculates_grants() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = create_project(&service, 100_000);
        let grant = GrantService::new(&storage)
            .add(CreateGrantInput {
                project_id: project.id,
                provider: GrantProvider::Kosgeb,
                program: None,
                percentage: Percent::whole(60),
                notes: None,
            })
            .unwrap();
        assert_eq!(grant.amount.cents(), 60_000);

        service
            .update(
                project.id,
                UpdateProjectInput {
                    contract_amount: Some(Money::from_cents(150_000)),
                    ..Default::default()
                },
            )
            .unwrap();

        let grant = storage.grants.get(grant.id).unwrap().unwrap();
        assert_eq!(grant.amount.cents(), 90_000);
    }

    #[test]
    fn test_summary() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = create_project(&service, 200_000);

        let first = service
            .add_milestone(project.id, "Analiz", Money::from_cents(50_000), date(2025, 2, 1))
            .unwrap();
        service
            .add_milestone(project.id, "Kodlama", Money::from_cents(100_000), date(2025, 4, 1))
            .unwrap();
        service.complete_milestone(first.id, date(2025, 2, 3)).unwrap();

        let mut income = Transaction::new(
            TransactionKind::Income,
            date(2025, 2, 5),
            Money::from_cents(50_000),
            Currency::Try,
        );
        income.project_id = Some(project.id);
        let mut expense = Transaction::new(
            TransactionKind::Expense,
            date(2025, 2, 6),
            Money::from_cents(20_000),
            Currency::Try,
        );
        expense.project_id = Some(project.id);
        storage.transactions.upsert(income).unwrap();
        storage.transactions.upsert(expense).unwrap();

        let summary = service.summary(project.id).unwrap();
        assert_eq!(summary.milestone_count, 2);
        assert_eq!(summary.milestones_done, 1);
        assert_eq!(summary.planned.cents(), 150_000);
        assert_eq!(summary.unplanned().cents(), 50_000);
        assert_eq!(summary.completion_percent, dec!(25));
        assert_eq!(summary.profit().cents(), 30_000);
        assert!(summary.grant_remaining().is_zero());
    }

    #[test]
    fn test_completion_percent_rounds_half_away_from_zero() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = create_project(&service, 80_000);

        let milestone = service
            .add_milestone(project.id, "Teslim", Money::from_cents(10_004), date(2025, 3, 1))
            .unwrap();
        service.complete_milestone(milestone.id, date(2025, 3, 1)).unwrap();

        // 10004 / 80000 = 12.505%
        let summary = service.summary(project.id).unwrap();
        assert_eq!(summary.completion_percent, dec!(12.51));
    }

    #[test]
    fn test_delete_guarded() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = create_project(&service, 100_000);
        service
            .add_milestone(project.id, "Tek", Money::from_cents(1_000), date(2025, 2, 1))
            .unwrap();

        let mut txn = Transaction::new(
            TransactionKind::Expense,
            date(2025, 2, 6),
            Money::from_cents(20_000),
            Currency::Try,
        );
        txn.project_id = Some(project.id);
        storage.transactions.upsert(txn.clone()).unwrap();
        assert!(matches!(service.delete(project.id), Err(DefterError::Conflict(_))));

        storage.transactions.delete(txn.id).unwrap();
        service.delete(project.id).unwrap();
        assert!(storage.projects.milestones_for(project.id).unwrap().is_empty());
    }
}
