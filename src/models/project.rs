//! Project and milestone models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use super::ids::{MilestoneId, PartyId, ProjectId};
use super::money::Money;
use crate::error::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "planned" | "planlandi" | "planlandı" => Some(Self::Planned),
            "active" | "aktif" => Some(Self::Active),
            "on_hold" | "on-hold" | "beklemede" => Some(Self::OnHold),
            "completed" | "tamamlandi" | "tamamlandı" => Some(Self::Completed),
            "cancelled" | "canceled" | "iptal" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Planned => "Planlandı",
            Self::Active => "Aktif",
            Self::OnHold => "Beklemede",
            Self::Completed => "Tamamlandı",
            Self::Cancelled => "İptal",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    pub name: String,

    /// Client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<PartyId>,

    #[serde(default)]
    pub description: String,

    pub contract_amount: Money,

    pub currency: Currency,

    pub start_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ProjectStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        contract_amount: Money,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            party_id: None,
            description: String::new(),
            contract_amount,
            currency,
            start_date,
            end_date: None,
            status: ProjectStatus::Planned,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Proje adı boş olamaz");
        } else if self.name.chars().count() > 150 {
            errors.add("name", "Proje adı en fazla 150 karakter olabilir");
        }

        if self.contract_amount.is_negative() {
            errors.add("contract_amount", "Sözleşme tutarı negatif olamaz");
        } else if self.contract_amount.exceeds_limit() {
            errors.add("contract_amount", format!("Sözleşme tutarı en fazla {} olabilir", Money::MAX));
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                errors.add("end_date", "Bitiş tarihi başlangıçtan önce olamaz");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    Completed,
    /// Completed and billed to the client
    Invoiced,
}

impl MilestoneStatus {
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pending => "Bekliyor",
            Self::Completed => "Tamamlandı",
            Self::Invoiced => "Faturalandı",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,

    pub project_id: ProjectId,

    pub title: String,

    pub amount: Money,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: MilestoneStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    pub fn new(project_id: ProjectId, title: impl Into<String>, amount: Money, due_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: MilestoneId::new(),
            project_id,
            title: title.into(),
            amount,
            due_date,
            status: MilestoneStatus::Pending,
            completed_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn complete(&mut self, date: NaiveDate) {
        self.status = MilestoneStatus::Completed;
        self.completed_date = Some(date);
        self.updated_at = Utc::now();
    }

    pub fn reopen(&mut self) {
        self.status = MilestoneStatus::Pending;
        self.completed_date = None;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "Başlık boş olamaz");
        }
        if self.amount.is_negative() {
            errors.add("amount", "Tutar negatif olamaz");
        } else if self.amount.exceeds_limit() {
            errors.add("amount", format!("Tutar en fazla {} olabilir", Money::MAX));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut project = Project::new("Web sitesi", Money::from_cents(5_000_000), Currency::Try, start());
        assert!(project.validate().is_ok());
        project.end_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert!(project.validate().unwrap_err().get("end_date").is_some());
    }

    #[test]
    fn test_milestone_complete_and_reopen() {
        let mut milestone = Milestone::new(ProjectId::new(), "Tasarım", Money::from_cents(100_000), start());
        milestone.complete(start());
        assert!(milestone.status.is_done());
        assert_eq!(milestone.completed_date, Some(start()));

        milestone.reopen();
        assert_eq!(milestone.status, MilestoneStatus::Pending);
        assert!(milestone.completed_date.is_none());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ProjectStatus::parse("on-hold"), Some(ProjectStatus::OnHold));
        assert_eq!(ProjectStatus::parse("aktif"), Some(ProjectStatus::Active));
    }
}
