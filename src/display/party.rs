//! Party display formatting

use std::collections::BTreeMap;

use tabled::Tabled;

use super::{or_dash, render_table, truncate};
use crate::models::{Currency, Party};
use crate::services::PartyBalance;

#[derive(Tabled)]
struct PartyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Ad")]
    name: String,
    #[tabled(rename = "Tür")]
    kind: String,
    #[tabled(rename = "Vergi No")]
    tax_number: String,
    #[tabled(rename = "Telefon")]
    phone: String,
    #[tabled(rename = "Durum")]
    status: String,
}

pub fn format_party_list(parties: &[Party]) -> String {
    let rows = parties
        .iter()
        .map(|p| PartyRow {
            id: p.id.to_string(),
            name: truncate(&p.name, 32),
            kind: p.kind.to_string(),
            tax_number: or_dash(p.tax_number.as_deref()),
            phone: or_dash(p.phone.as_deref()),
            status: if p.archived { "Arşiv".into() } else { String::new() },
        })
        .collect();
    render_table(rows, "Kayıtlı cari yok.")
}

/// Party card with open balances per currency
pub fn format_party_details(party: &Party, balances: &BTreeMap<Currency, PartyBalance>) -> String {
    let mut output = String::new();
    output.push_str(&format!("Cari:        {}\n", party.name));
    output.push_str(&format!("ID:          {}\n", party.id));
    output.push_str(&format!("Tür:         {}\n", party.kind));
    output.push_str(&format!("Vergi No:    {}\n", or_dash(party.tax_number.as_deref())));
    output.push_str(&format!("Vergi Dair.: {}\n", or_dash(party.tax_office.as_deref())));
    output.push_str(&format!("Telefon:     {}\n", or_dash(party.phone.as_deref())));
    output.push_str(&format!("E-posta:     {}\n", or_dash(party.email.as_deref())));
    output.push_str(&format!("Adres:       {}\n", or_dash(party.address.as_deref())));
    if !party.notes.is_empty() {
        output.push_str(&format!("Not:         {}\n", party.notes));
    }
    if party.archived {
        output.push_str("Durum:       Arşivlenmiş\n");
    }

    if balances.is_empty() {
        output.push_str("\nAçık borç/alacak yok.\n");
    } else {
        output.push_str("\nBakiye:\n");
        for (currency, balance) in balances {
            output.push_str(&format!(
                "  {}  alacak {:>14}  borç {:>14}  net {:>14}\n",
                currency,
                balance.receivable,
                balance.payable,
                balance.net()
            ));
        }
    }

    output
}
