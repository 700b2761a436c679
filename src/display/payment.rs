//! Payment display formatting

use tabled::Tabled;

use super::{render_table, truncate};
use crate::models::{Payment, PaymentTarget};

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tarih")]
    date: String,
    #[tabled(rename = "Hedef")]
    target: String,
    #[tabled(rename = "Tutar")]
    amount: String,
    #[tabled(rename = "Şekil")]
    method: String,
    #[tabled(rename = "Not")]
    notes: String,
}

fn target_label(target: &PaymentTarget) -> String {
    match target {
        PaymentTarget::Debt { debt_id } => format!("borç {}", debt_id),
        PaymentTarget::Installment { installment_id, .. } => format!("taksit {}", installment_id),
        PaymentTarget::Grant { grant_id } => format!("hibe {}", grant_id),
    }
}

pub fn format_payment_list(payments: &[Payment], date_format: &str) -> String {
    let rows = payments
        .iter()
        .map(|p| PaymentRow {
            id: p.id.to_string(),
            date: p.date.format(date_format).to_string(),
            target: target_label(&p.target),
            amount: p.amount.format_with_currency(p.currency),
            method: p.method.to_string(),
            notes: truncate(&p.notes, 24),
        })
        .collect();
    render_table(rows, "Ödeme bulunamadı.")
}

pub fn format_payment_details(payment: &Payment, date_format: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Ödeme:     {}\n", payment.id));
    output.push_str(&format!("Tarih:     {}\n", payment.date.format(date_format)));
    output.push_str(&format!("Hedef:     {}\n", target_label(&payment.target)));
    output.push_str(&format!("Tutar:     {}\n", payment.amount.format_with_currency(payment.currency)));
    output.push_str(&format!("Şekil:     {}\n", payment.method));
    if !payment.notes.is_empty() {
        output.push_str(&format!("Not:       {}\n", payment.notes));
    }
    if let Some(txn_id) = payment.transaction_id {
        output.push_str(&format!("İşlem:     {}\n", txn_id));
    }
    if !payment.allocations.is_empty() {
        output.push_str("Dağılım:\n");
        for allocation in &payment.allocations {
            output.push_str(&format!("  {}  {}\n", allocation.installment_id, allocation.amount));
        }
    }
    output
}
