//! Transaction display formatting

use tabled::Tabled;

use super::{or_dash, render_table, truncate, Names};
use crate::models::Transaction;

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tarih")]
    date: String,
    #[tabled(rename = "Tür")]
    kind: String,
    #[tabled(rename = "Cari")]
    party: String,
    #[tabled(rename = "Kategori")]
    category: String,
    #[tabled(rename = "Açıklama")]
    description: String,
    #[tabled(rename = "Net")]
    net: String,
    #[tabled(rename = "Ana Para")]
    base_net: String,
}

pub fn format_transaction_list(transactions: &[Transaction], names: &Names, date_format: &str) -> String {
    let rows = transactions
        .iter()
        .map(|txn| TransactionRow {
            id: txn.id.to_string(),
            date: txn.date.format(date_format).to_string(),
            kind: txn.kind.to_string(),
            party: truncate(&names.party(txn.party_id), 20),
            category: truncate(&names.category(txn.category_id), 18),
            description: truncate(&txn.description, 28),
            net: txn.tax.net.format_with_currency(txn.currency),
            base_net: txn.base_net.format_with_currency(txn.base_currency),
        })
        .collect();
    render_table(rows, "İşlem bulunamadı.")
}

/// Full breakdown of one transaction
pub fn format_transaction_details(txn: &Transaction, names: &Names, date_format: &str) -> String {
    let currency = txn.currency;
    let mut output = String::new();

    output.push_str(&format!("İşlem:        {}\n", txn.id));
    output.push_str(&format!("Tür:          {}\n", txn.kind));
    output.push_str(&format!("Tarih:        {}\n", txn.date.format(date_format)));
    output.push_str(&format!("Cari:         {}\n", names.party(txn.party_id)));
    output.push_str(&format!("Kategori:     {}\n", names.category(txn.category_id)));
    output.push_str(&format!("Proje:        {}\n", names.project(txn.project_id)));
    output.push_str(&format!("Açıklama:     {}\n", or_dash(Some(&txn.description))));
    output.push_str(&format!("Belge No:     {}\n", or_dash(txn.document_no.as_deref())));
    output.push_str(&format!("Ödeme şekli:  {}\n", txn.method));
    output.push('\n');
    output.push_str(&format!(
        "Tutar:        {}{}\n",
        txn.amount.format_with_currency(currency),
        if txn.vat_included { " (KDV dahil)" } else { "" }
    ));
    output.push_str(&format!("Matrah:       {}\n", txn.tax.base.format_with_currency(currency)));
    output.push_str(&format!(
        "KDV ({}):     {}\n",
        txn.vat_rate,
        txn.tax.vat.format_with_currency(currency)
    ));
    output.push_str(&format!(
        "Stopaj ({}):  {}\n",
        txn.withholding_rate,
        txn.tax.withholding.format_with_currency(currency)
    ));
    output.push_str(&format!("Net:          {}\n", txn.tax.net.format_with_currency(currency)));

    if currency != txn.base_currency {
        output.push_str(&format!(
            "Kur:          1 {} = {} {}\n",
            currency, txn.exchange_rate, txn.base_currency
        ));
        output.push_str(&format!(
            "Net ({}):    {}\n",
            txn.base_currency,
            txn.base_net.format_with_currency(txn.base_currency)
        ));
    }

    if let Some(payment_id) = txn.payment_id {
        output.push_str(&format!("\nÖdemeden oluşturuldu: {}\n", payment_id));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money, Party, PartyKind, TransactionKind};
    use chrono::NaiveDate;

    fn sample() -> (Transaction, Names) {
        let party = Party::new("Acme", PartyKind::Customer);
        let mut txn = Transaction::new(
            TransactionKind::Income,
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            Money::from_cents(150_000),
            Currency::Try,
        );
        txn.party_id = Some(party.id);
        txn.description = "Danışmanlık".into();
        let mut names = Names::default();
        names.parties.insert(party.id, party.name);
        (txn, names)
    }

    #[test]
    fn test_list_resolves_names() {
        let (txn, names) = sample();
        let text = format_transaction_list(&[txn], &names, "%d.%m.%Y");
        assert!(text.contains("Acme"));
        assert!(text.contains("14.03.2025"));
        assert!(text.contains("Danışmanlık"));
    }

    #[test]
    fn test_details_hide_rate_for_base_currency() {
        let (txn, names) = sample();
        let text = format_transaction_details(&txn, &names, "%Y-%m-%d");
        assert!(text.contains("2025-03-14"));
        assert!(text.contains("Kategori:     -"));
        assert!(!text.contains("Kur:"));
    }
}
