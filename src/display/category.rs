//! Category display formatting

use tabled::Tabled;

use super::{or_dash, render_table};
use crate::models::Category;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Ad")]
    name: String,
    #[tabled(rename = "Tür")]
    kind: String,
    #[tabled(rename = "Renk")]
    color: String,
    #[tabled(rename = "Durum")]
    status: String,
}

/// Categories grouped by kind, income first
pub fn format_category_list(categories: &[Category]) -> String {
    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

    let rows = sorted
        .into_iter()
        .map(|c| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            kind: c.kind.to_string(),
            color: or_dash(c.color.as_deref()),
            status: if c.archived { "Arşiv".into() } else { String::new() },
        })
        .collect();
    render_table(rows, "Kategori yok. 'defter init' varsayılanları oluşturur.")
}
