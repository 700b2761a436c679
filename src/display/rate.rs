//! Exchange rate display formatting

use tabled::Tabled;

use super::render_table;
use crate::models::{Currency, ExchangeRate};

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tarih")]
    date: String,
    #[tabled(rename = "Döviz")]
    currency: String,
    #[tabled(rename = "Kur")]
    rate: String,
    #[tabled(rename = "Kaynak")]
    source: String,
}

pub fn format_rate_list(rates: &[ExchangeRate], base: Currency, date_format: &str) -> String {
    let rows = rates
        .iter()
        .map(|r| RateRow {
            id: r.id.to_string(),
            date: r.date.format(date_format).to_string(),
            currency: r.currency.to_string(),
            rate: format!("{} {}", r.rate, base),
            source: r.source.to_string(),
        })
        .collect();
    render_table(rows, "Kayıtlı kur yok.")
}
