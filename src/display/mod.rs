//! Display formatting for terminal output
//!
//! List views are rendered with `tabled`; detail views are plain
//! `label: value` blocks.

pub mod category;
pub mod debt;
pub mod party;
pub mod payment;
pub mod project;
pub mod rate;
pub mod transaction;

pub use category::format_category_list;
pub use debt::{format_debt_details, format_debt_list};
pub use party::{format_party_details, format_party_list};
pub use payment::{format_payment_details, format_payment_list};
pub use project::{
    format_grant_list, format_milestone_list, format_project_details, format_project_list,
};
pub use rate::format_rate_list;
pub use transaction::{format_transaction_details, format_transaction_list};

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::DefterResult;
use crate::models::{CategoryId, PartyId, ProjectId};
use crate::storage::Storage;

/// Names of referenced records, for rendering IDs readably
#[derive(Debug, Default)]
pub struct Names {
    parties: HashMap<PartyId, String>,
    categories: HashMap<CategoryId, String>,
    projects: HashMap<ProjectId, String>,
}

impl Names {
    pub fn load(storage: &Storage) -> DefterResult<Self> {
        Ok(Self {
            parties: storage.parties.get_all()?.into_iter().map(|p| (p.id, p.name)).collect(),
            categories: storage
                .categories
                .get_all()?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
            projects: storage.projects.get_all()?.into_iter().map(|p| (p.id, p.name)).collect(),
        })
    }

    pub fn party(&self, id: Option<PartyId>) -> String {
        lookup(&self.parties, id)
    }

    pub fn category(&self, id: Option<CategoryId>) -> String {
        lookup(&self.categories, id)
    }

    pub fn project(&self, id: Option<ProjectId>) -> String {
        lookup(&self.projects, id)
    }
}

fn lookup<K: std::hash::Hash + Eq + ToString>(names: &HashMap<K, String>, id: Option<K>) -> String {
    match id {
        Some(id) => names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
        None => "-".to_string(),
    }
}

/// Render rows as a table, or `empty` when there are none
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>, empty: &str) -> String {
    if rows.is_empty() {
        return format!("{}\n", empty);
    }
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Shorten to `max` characters, marking the cut with an ellipsis
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub(crate) fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}
