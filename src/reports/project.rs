//! Project Report
//!
//! Financial position of one project or of every project.

use crate::error::DefterResult;
use crate::models::{Currency, ProjectId};
use crate::services::{ProjectService, ProjectSummary};
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct ProjectReport {
    /// Currency of the income and expense totals
    pub base_currency: Currency,
    pub projects: Vec<ProjectSummary>,
}

impl ProjectReport {
    /// Report on one project, or on all of them when `project_id` is `None`
    pub fn generate(
        storage: &Storage,
        project_id: Option<ProjectId>,
        base_currency: Currency,
    ) -> DefterResult<Self> {
        let service = ProjectService::new(storage);
        let ids: Vec<ProjectId> = match project_id {
            Some(id) => vec![id],
            None => service.list(None)?.into_iter().map(|p| p.id).collect(),
        };

        let projects = ids
            .into_iter()
            .map(|id| service.summary(id))
            .collect::<DefterResult<Vec<_>>>()?;

        Ok(Self {
            base_currency,
            projects,
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str("Proje Raporu\n");
        output.push_str(&"=".repeat(72));
        output.push('\n');

        if self.projects.is_empty() {
            output.push_str("Proje yok.\n");
            return output;
        }

        let base = self.base_currency;
        for summary in &self.projects {
            let project = &summary.project;
            let currency = project.currency;
            output.push_str(&format!("\n{} [{}] ({})\n", project.name, project.id, project.status));
            output.push_str(&"-".repeat(72));
            output.push('\n');
            output.push_str(&format!(
                "  {:<30} {:>24}\n",
                "Sözleşme tutarı",
                project.contract_amount.format_with_currency(currency)
            ));
            output.push_str(&format!(
                "  {:<30} {:>24}\n",
                format!("Kilometre taşları ({}/{})", summary.milestones_done, summary.milestone_count),
                format!("{} / {}", summary.completed, summary.planned)
            ));
            output.push_str(&format!("  {:<30} {:>23}%\n", "Tamamlanma", summary.completion_percent));
            output.push_str(&format!("  {:<30} {:>24}\n", "Gelir", summary.income.format_with_currency(base)));
            output.push_str(&format!("  {:<30} {:>24}\n", "Gider", summary.expense.format_with_currency(base)));
            output.push_str(&format!("  {:<30} {:>24}\n", "Kâr", summary.profit().format_with_currency(base)));
            if summary.grant_amount.is_positive() {
                output.push_str(&format!(
                    "  {:<30} {:>24}\n",
                    "Hibe (alınan / toplam)",
                    format!("{} / {}", summary.grant_received, summary.grant_amount)
                ));
                output.push_str(&format!(
                    "  {:<30} {:>24}\n",
                    "Hibe kalan",
                    summary.grant_remaining().format_with_currency(currency)
                ));
            }
        }

        output
    }
}
