//! Audit log CLI commands

use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;

use super::parse_date;
use crate::audit::{AuditFilter, EntityType};
use crate::error::{DefterError, DefterResult};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show recent changes, oldest first
    List {
        /// Entity type, e.g. party, debt, payment
        #[arg(short, long)]
        entity: Option<String>,
        /// Entity ID
        #[arg(long)]
        id: Option<String>,
        /// Only changes on or after this date
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show where the log is and how many entries it holds
    Info,
}

pub fn handle_audit_command(storage: &Storage, cmd: AuditCommands) -> DefterResult<()> {
    let logger = storage.audit();

    match cmd {
        AuditCommands::List {
            entity,
            id,
            since,
            limit,
        } => {
            let mut filter = AuditFilter::new().limit(limit);
            if let Some(entity) = entity {
                let entity_type = EntityType::parse(&entity).ok_or_else(|| {
                    DefterError::invalid("entity", format!("Bilinmeyen kayıt türü: '{}'", entity))
                })?;
                filter = filter.entity_type(entity_type);
            }
            if let Some(id) = id {
                filter = filter.entity_id(id);
            }
            if let Some(since) = since {
                filter = filter.since(since.and_time(NaiveTime::MIN).and_utc());
            }

            let entries = logger.query(&filter)?;
            if entries.is_empty() {
                println!("Kayıt yok.");
                return Ok(());
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }

        AuditCommands::Info => {
            println!("Denetim kaydı: {}", logger.path().display());
            println!("Kayıt sayısı: {}", logger.entry_count()?);
        }
    }

    Ok(())
}
