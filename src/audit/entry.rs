//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        })
    }
}

/// Kinds of records that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Party,
    Category,
    Transaction,
    Debt,
    Installment,
    Payment,
    Project,
    Milestone,
    Grant,
    ExchangeRate,
}

impl EntityType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "party" => Some(Self::Party),
            "category" => Some(Self::Category),
            "transaction" | "txn" => Some(Self::Transaction),
            "debt" => Some(Self::Debt),
            "installment" => Some(Self::Installment),
            "payment" => Some(Self::Payment),
            "project" => Some(Self::Project),
            "milestone" => Some(Self::Milestone),
            "grant" => Some(Self::Grant),
            "exchange_rate" | "rate" => Some(Self::ExchangeRate),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            EntityType::Party => "Party",
            EntityType::Category => "Category",
            EntityType::Transaction => "Transaction",
            EntityType::Debt => "Debt",
            EntityType::Installment => "Installment",
            EntityType::Payment => "Payment",
            EntityType::Project => "Project",
            EntityType::Milestone => "Milestone",
            EntityType::Grant => "Grant",
            EntityType::ExchangeRate => "ExchangeRate",
        })
    }
}

/// A single audit log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Display form of the record ID
    pub entity_id: String,

    /// Human-readable label (party name, debt description)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new(operation: Operation, entity_type: EntityType, entity_id: String, entity_name: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Create, entity_type, entity_id.into(), entity_name);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        let mut entry = Self::new(Operation::Update, entity_type, entity_id.into(), entity_name);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        entry.diff_summary = diff_summary;
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Delete, entity_type, entity_id.into(), entity_name);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// One or two lines for `defter audit`
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Değişiklikler: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_entry() {
        let data = json!({"name": "Acme", "kind": "customer"});
        let entry = AuditEntry::create(EntityType::Party, "pty-12345678", Some("Acme".into()), &data);

        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert_eq!(entry.after, Some(data));
    }

    #[test]
    fn test_update_and_delete_entries() {
        let before = json!({"paid_amount": 0});
        let after = json!({"paid_amount": 5000});
        let update = AuditEntry::update(
            EntityType::Debt,
            "dbt-12345678",
            None,
            &before,
            &after,
            Some("paid_amount: 0 -> 5000".into()),
        );
        assert!(update.before.is_some() && update.after.is_some());

        let delete = AuditEntry::delete(EntityType::Payment, "pmt-12345678", None, &after);
        assert_eq!(delete.operation, Operation::Delete);
        assert!(delete.after.is_none());
    }

    #[test]
    fn test_entity_type_serialization() {
        let json = serde_json::to_string(&EntityType::ExchangeRate).unwrap();
        assert_eq!(json, "\"exchange_rate\"");
        assert_eq!(EntityType::parse("rate"), Some(EntityType::ExchangeRate));
        assert_eq!(EntityType::parse("budget"), None);
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::update(
            EntityType::Grant,
            "grt-12345678",
            Some("TÜBİTAK".into()),
            &json!({}),
            &json!({}),
            Some("amount: 100 -> 200".into()),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("UPDATE Grant grt-12345678 (TÜBİTAK)"));
        assert!(formatted.contains("amount: 100 -> 200"));
    }
}
