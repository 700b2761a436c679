//! Project, milestone and grant display formatting

use tabled::Tabled;

use super::{render_table, truncate, Names};
use crate::models::{Currency, Grant, Milestone, Project};
use crate::services::ProjectSummary;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Ad")]
    name: String,
    #[tabled(rename = "Müşteri")]
    party: String,
    #[tabled(rename = "Sözleşme")]
    contract: String,
    #[tabled(rename = "Başlangıç")]
    start_date: String,
    #[tabled(rename = "Durum")]
    status: String,
}

#[derive(Tabled)]
struct MilestoneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Başlık")]
    title: String,
    #[tabled(rename = "Tutar")]
    amount: String,
    #[tabled(rename = "Vade")]
    due_date: String,
    #[tabled(rename = "Durum")]
    status: String,
}

#[derive(Tabled)]
struct GrantRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kurum")]
    provider: String,
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Oran")]
    percentage: String,
    #[tabled(rename = "Tutar")]
    amount: String,
    #[tabled(rename = "Alınan")]
    received: String,
    #[tabled(rename = "Durum")]
    status: String,
}

pub fn format_project_list(projects: &[Project], names: &Names, date_format: &str) -> String {
    let rows = projects
        .iter()
        .map(|p| ProjectRow {
            id: p.id.to_string(),
            name: truncate(&p.name, 30),
            party: truncate(&names.party(p.party_id), 20),
            contract: p.contract_amount.format_with_currency(p.currency),
            start_date: p.start_date.format(date_format).to_string(),
            status: p.status.to_string(),
        })
        .collect();
    render_table(rows, "Proje bulunamadı.")
}

pub fn format_milestone_list(milestones: &[Milestone], currency: Currency, date_format: &str) -> String {
    let rows = milestones
        .iter()
        .map(|m| MilestoneRow {
            id: m.id.to_string(),
            title: truncate(&m.title, 30),
            amount: m.amount.format_with_currency(currency),
            due_date: m.due_date.format(date_format).to_string(),
            status: match m.completed_date {
                Some(done) => format!("{} ({})", m.status, done.format(date_format)),
                None => m.status.to_string(),
            },
        })
        .collect();
    render_table(rows, "Kilometre taşı yok.")
}

pub fn format_grant_list(grants: &[Grant]) -> String {
    let rows = grants
        .iter()
        .map(|g| GrantRow {
            id: g.id.to_string(),
            provider: g.provider.to_string(),
            program: truncate(&g.program, 24),
            percentage: g.percentage.to_string(),
            amount: g.amount.format_with_currency(g.currency),
            received: g.received_amount.to_string(),
            status: g.status.to_string(),
        })
        .collect();
    render_table(rows, "Hibe yok.")
}

/// Project card with milestones and grants
pub fn format_project_details(
    summary: &ProjectSummary,
    milestones: &[Milestone],
    grants: &[Grant],
    names: &Names,
    date_format: &str,
) -> String {
    let project = &summary.project;
    let currency = project.currency;
    let mut output = String::new();

    output.push_str(&format!("Proje:       {}\n", project.name));
    output.push_str(&format!("ID:          {}\n", project.id));
    output.push_str(&format!("Müşteri:     {}\n", names.party(project.party_id)));
    output.push_str(&format!("Durum:       {}\n", project.status));
    output.push_str(&format!(
        "Tarihler:    {} - {}\n",
        project.start_date.format(date_format),
        project
            .end_date
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_else(|| "...".into())
    ));
    output.push_str(&format!("Sözleşme:    {}\n", project.contract_amount.format_with_currency(currency)));
    output.push_str(&format!("Planlanan:   {}\n", summary.planned.format_with_currency(currency)));
    output.push_str(&format!("Tamamlanan:  {} (%{})\n", summary.completed.format_with_currency(currency), summary.completion_percent));
    if !project.description.is_empty() {
        output.push_str(&format!("Açıklama:    {}\n", project.description));
    }

    output.push_str("\nKilometre taşları\n");
    output.push_str(&format_milestone_list(milestones, currency, date_format));
    output.push_str("\nHibeler\n");
    output.push_str(&format_grant_list(grants));

    output
}
