//! Grant service
//!
//! A grant funds a share of a project. Its amount is always the project
//! contract amount times the grant percentage, so any change to either is
//! followed by a recalculation.

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::finance::status;
use crate::models::{Grant, GrantId, GrantProvider, Money, Percent, Project, ProjectId};
use crate::storage::Storage;

/// Service for project grants
pub struct GrantService<'a> {
    storage: &'a Storage,
}

#[derive(Debug, Clone)]
pub struct CreateGrantInput {
    pub project_id: ProjectId,
    pub provider: GrantProvider,
    pub program: Option<String>,
    pub percentage: Percent,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGrantInput {
    pub provider: Option<GrantProvider>,
    pub program: Option<String>,
    pub percentage: Option<Percent>,
    pub notes: Option<String>,
}

impl<'a> GrantService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn add(&self, input: CreateGrantInput) -> DefterResult<Grant> {
        let project = self
            .storage
            .projects
            .get(input.project_id)?
            .ok_or_else(|| DefterError::project_not_found(input.project_id.to_string()))?;
        self.ensure_share_available(&project, input.percentage, None)?;

        let mut grant = Grant::new(
            project.id,
            input.provider,
            input.percentage,
            input.percentage.of(project.contract_amount),
            project.currency,
        );
        grant.program = input.program.unwrap_or_default().trim().to_string();
        grant.notes = input.notes.unwrap_or_default();

        self.storage.grants.upsert(grant.clone())?;
        self.storage.grants.save()?;

        self.storage.log_create(
            EntityType::Grant,
            grant.id.to_string(),
            Some(grant.provider.to_string()),
            &grant,
        )?;

        Ok(grant)
    }

    pub fn get(&self, id: GrantId) -> DefterResult<Option<Grant>> {
        self.storage.grants.get(id)
    }

    pub fn find(&self, identifier: &str) -> DefterResult<Option<Grant>> {
        self.storage.grants.find(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> DefterResult<Grant> {
        self.find(identifier)?
            .ok_or_else(|| DefterError::grant_not_found(identifier))
    }

    pub fn list(&self, project_id: Option<ProjectId>) -> DefterResult<Vec<Grant>> {
        match project_id {
            Some(project_id) => self.storage.grants.get_by_project(project_id),
            None => self.storage.grants.get_all(),
        }
    }

    pub fn update(&self, id: GrantId, input: UpdateGrantInput) -> DefterResult<Grant> {
        let mut grant = self
            .storage
            .grants
            .get(id)?
            .ok_or_else(|| DefterError::grant_not_found(id.to_string()))?;
        let project = self
            .storage
            .projects
            .get(grant.project_id)?
            .ok_or_else(|| DefterError::project_not_found(grant.project_id.to_string()))?;
        let before = grant.clone();

        if let Some(provider) = input.provider {
            grant.provider = provider;
        }
        if let Some(program) = input.program {
            grant.program = program.trim().to_string();
        }
        if let Some(notes) = input.notes {
            grant.notes = notes;
        }
        if let Some(percentage) = input.percentage {
            self.ensure_share_available(&project, percentage, Some(id))?;
            let amount = percentage.of(project.contract_amount);
            ensure_covers_received(&grant, amount)?;
            grant.percentage = percentage;
            grant.amount = amount;
            grant.status = status::grant(grant.amount, grant.received_amount);
        }
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

        Ok(grant)
    }

    /// Delete a grant nothing has been received for
    pub fn delete(&self, id: GrantId) -> DefterResult<Grant> {
        let grant = self
            .storage
            .grants
            .get(id)?
            .ok_or_else(|| DefterError::grant_not_found(id.to_string()))?;

        let payments = self.storage.payments.get_by_grant(id)?.len();
        if payments > 0 {
            return Err(DefterError::Conflict(format!(
                "Hibeye bağlı {} tahsilat var; önce tahsilatları silin",
                payments
            )));
        }

        self.storage.grants.delete(id)?;
        self.storage.grants.save()?;

        self.storage.log_delete(
            EntityType::Grant,
            grant.id.to_string(),
            Some(grant.provider.to_string()),
            &grant,
        )?;

        Ok(grant)
    }

    /// Fail if a new contract amount would leave a grant below what it has
    /// already received
    pub fn check_contract_change(&self, project_id: ProjectId, contract_amount: Money) -> DefterResult<()> {
        for grant in self.storage.grants.get_by_project(project_id)? {
            ensure_covers_received(&grant, grant.percentage.of(contract_amount))?;
        }
        Ok(())
    }

    /// Bring every grant of a project in line with its contract amount
    pub fn recalculate_for_project(&self, project: &Project) -> DefterResult<Vec<Grant>> {
        let mut grants = self.storage.grants.get_by_project(project.id)?;
        let mut changed = false;

        for grant in &mut grants {
            let amount = grant.percentage.of(project.contract_amount);
            if amount == grant.amount {
                continue;
            }
            ensure_covers_received(grant, amount)?;

            let before = grant.clone();
            grant.amount = amount;
            grant.status = status::grant(grant.amount, grant.received_amount);
            grant.updated_at = Utc::now();
            self.storage.grants.upsert(grant.clone())?;
            self.storage.log_update(
                EntityType::Grant,
                grant.id.to_string(),
                Some(grant.provider.to_string()),
                &before,
                &*grant,
            )?;
            changed = true;
        }

        if changed {
            self.storage.grants.save()?;
            tracing::debug!(project = %project.id, "grant amounts recalculated");
        }
        Ok(grants)
    }

    /// Grants of one project may not fund more than all of it
    fn ensure_share_available(
        &self,
        project: &Project,
        percentage: Percent,
        except: Option<GrantId>,
    ) -> DefterResult<()> {
        let taken: rust_decimal::Decimal = self
            .storage
            .grants
            .get_by_project(project.id)?
            .iter()
            .filter(|g| Some(g.id) != except)
            .map(|g| g.percentage.value())
            .sum();
        if taken + percentage.value() > rust_decimal::Decimal::ONE_HUNDRED {
            return Err(DefterError::invalid(
                "percentage",
                format!(
                    "'{}' projesinin hibe oranları toplamı %100'ü aşamaz (mevcut %{})",
                    project.name, taken
                ),
            ));
        }
        Ok(())
    }
}

fn ensure_covers_received(grant: &Grant, amount: Money) -> DefterResult<()> {
    if amount < grant.received_amount {
        return Err(DefterError::Conflict(format!(
            "{} hibesinden {} tahsil edilmiş; hibe tutarı {} olamaz",
            grant.provider, grant.received_amount, amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Payment, PaymentTarget};
    use crate::services::testing::{create_test_storage, date};

    fn setup_project(storage: &Storage, contract: i64) -> Project {
        let project = Project::new("Ar-Ge Projesi", Money::from_cents(contract), Currency::Try, date(2025, 1, 1));
        storage.projects.upsert(project.clone()).unwrap();
        project
    }

    fn input(project_id: ProjectId, pct: u8) -> CreateGrantInput {
        CreateGrantInput {
            project_id,
            provider: GrantProvider::Tubitak,
            program: Some("1507".into()),
            percentage: Percent::whole(pct),
            notes: None,
        }
    }

    #[test]
    fn test_amount_is_share_of_contract() {
        let (_temp_dir, storage) = create_test_storage();
        let project = setup_project(&storage, 1_000_001);
        let grant = GrantService::new(&storage).add(input(project.id, 75)).unwrap();

        // 10000.01 × 0.75 = 7500.0075, rounds to 7500.01
        assert_eq!(grant.amount.cents(), 750_001);
        assert_eq!(grant.currency, Currency::Try);
        assert_eq!(grant.program, "1507");
    }

    #[test]
    fn test_total_share_capped() {
        let (_temp_dir, storage) = create_test_storage();
        let project = setup_project(&storage, 100_000);
        let service = GrantService::new(&storage);

        let first = service.add(input(project.id, 60)).unwrap();
        assert!(service.add(input(project.id, 50)).unwrap_err().is_validation());

        // Raising the existing grant itself is checked without double counting
        let updated = service
            .update(
                first.id,
                UpdateGrantInput {
                    percentage: Some(Percent::whole(100)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount.cents(), 100_000);
    }

    #[test]
    fn test_recalculate_after_contract_change() {
        let (_temp_dir, storage) = create_test_storage();
        let mut project = setup_project(&storage, 100_000);
        let service = GrantService::new(&storage);
        let grant = service.add(input(project.id, 40)).unwrap();

        project.contract_amount = Money::from_cents(250_000);
        let grants = service.recalculate_for_project(&project).unwrap();
        assert_eq!(grants[0].amount.cents(), 100_000);
        assert_eq!(service.get(grant.id).unwrap().unwrap().amount.cents(), 100_000);
    }

    #[test]
    fn test_contract_cannot_drop_below_received() {
        let (_temp_dir, storage) = create_test_storage();
        let project = setup_project(&storage, 100_000);
        let service = GrantService::new(&storage);
        let mut grant = service.add(input(project.id, 50)).unwrap();
        grant.received_amount = Money::from_cents(40_000);
        storage.grants.upsert(grant).unwrap();

        assert!(service
            .check_contract_change(project.id, Money::from_cents(80_000))
            .is_ok());
        assert!(matches!(
            service.check_contract_change(project.id, Money::from_cents(79_999)),
            Err(DefterError::Conflict(_))
        ));
    }

    #[test]
    fn test_delete_guarded_by_payments() {
        let (_temp_dir, storage) = create_test_storage();
        let project = setup_project(&storage, 100_000);
        let service = GrantService::new(&storage);
        let grant = service.add(input(project.id, 50)).unwrap();

        let payment = Payment::new(
            PaymentTarget::Grant { grant_id: grant.id },
            date(2025, 2, 1),
            Money::from_cents(1_000),
            Currency::Try,
        );
        storage.payments.upsert(payment.clone()).unwrap();
        assert!(matches!(service.delete(grant.id), Err(DefterError::Conflict(_))));

        storage.payments.delete(payment.id).unwrap();
        service.delete(grant.id).unwrap();
        assert!(service.list(Some(project.id)).unwrap().is_empty());
    }
}
