//! Debt and installment display formatting

use chrono::NaiveDate;
use tabled::Tabled;

use super::{render_table, truncate, Names};
use crate::models::Debt;
use crate::services::DebtSummary;

#[derive(Tabled)]
struct DebtRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Yön")]
    direction: String,
    #[tabled(rename = "Cari")]
    party: String,
    #[tabled(rename = "Açıklama")]
    description: String,
    #[tabled(rename = "Vade")]
    due_date: String,
    #[tabled(rename = "Tutar")]
    principal: String,
    #[tabled(rename = "Kalan")]
    remaining: String,
    #[tabled(rename = "Durum")]
    status: String,
}

#[derive(Tabled)]
struct InstallmentRow {
    #[tabled(rename = "#")]
    sequence: u32,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Vade")]
    due_date: String,
    #[tabled(rename = "Tutar")]
    amount: String,
    #[tabled(rename = "Ödenen")]
    paid: String,
    #[tabled(rename = "Durum")]
    status: String,
    #[tabled(rename = "Ödeme Tarihi")]
    paid_date: String,
}

pub fn format_debt_list(debts: &[Debt], names: &Names, today: NaiveDate, date_format: &str) -> String {
    let rows = debts
        .iter()
        .map(|debt| DebtRow {
            id: debt.id.to_string(),
            direction: debt.direction.to_string(),
            party: truncate(&names.party(Some(debt.party_id)), 20),
            description: truncate(&debt.description, 28),
            due_date: debt.due_date.format(date_format).to_string(),
            principal: debt.principal.format_with_currency(debt.currency),
            remaining: debt.remaining().to_string(),
            status: debt.effective_status(today).to_string(),
        })
        .collect();
    render_table(rows, "Borç veya alacak bulunamadı.")
}

/// Debt header followed by its installment schedule
pub fn format_debt_details(summary: &DebtSummary, names: &Names, today: NaiveDate, date_format: &str) -> String {
    let debt = &summary.debt;
    let currency = debt.currency;
    let mut output = String::new();

    output.push_str(&format!("{}:  {}\n", debt.direction, debt.description));
    output.push_str(&format!("ID:          {}\n", debt.id));
    output.push_str(&format!("Cari:        {}\n", names.party(Some(debt.party_id))));
    output.push_str(&format!("Düzenleme:   {}\n", debt.issue_date.format(date_format)));
    output.push_str(&format!("Vade:        {}\n", debt.due_date.format(date_format)));
    output.push_str(&format!("Tutar:       {}\n", summary.principal.format_with_currency(currency)));
    output.push_str(&format!("Ödenen:      {}\n", summary.paid.format_with_currency(currency)));
    output.push_str(&format!("Kalan:       {}\n", summary.remaining.format_with_currency(currency)));
    output.push_str(&format!("Durum:       {}\n", summary.status));
    if let Some(rate) = debt.vat_rate {
        output.push_str(&format!("KDV:         {}\n", rate));
    }
    if let Some(rate) = debt.withholding_rate {
        output.push_str(&format!("Stopaj:      {}\n", rate));
    }
    if !debt.notes.is_empty() {
        output.push_str(&format!("Not:         {}\n", debt.notes));
    }

    if let Some(next) = &summary.next_due {
        output.push_str(&format!(
            "Sıradaki:    #{} {} ({})\n",
            next.sequence,
            next.due_date.format(date_format),
            next.remaining()
        ));
    }
    if !summary.overdue.is_empty() {
        output.push_str(&format!(
            "Gecikmiş:    {} taksit, {}\n",
            summary.overdue.len(),
            summary.overdue_amount().format_with_currency(currency)
        ));
    }

    if !summary.installments.is_empty() {
        output.push('\n');
        let rows = summary
            .installments
            .iter()
            .map(|i| InstallmentRow {
                sequence: i.sequence,
                id: i.id.to_string(),
                due_date: i.due_date.format(date_format).to_string(),
                amount: i.amount.to_string(),
                paid: i.paid_amount.to_string(),
                status: i.effective_status(today).to_string(),
                paid_date: i
                    .paid_date
                    .map(|d| d.format(date_format).to_string())
                    .unwrap_or_else(|| "-".into()),
            })
            .collect();
        output.push_str(&render_table(rows, ""));
    }

    output
}
