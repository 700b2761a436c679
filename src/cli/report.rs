//! Report CLI commands

use chrono::{Datelike, NaiveDate};
use clap::Subcommand;

use super::{current_month, parse_date, today};
use crate::config::Settings;
use crate::error::{DefterError, DefterResult};
use crate::reports::{DebtReport, PartyStatement, ProjectReport, SummaryReport};
use crate::services::{PartyService, ProjectService};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Income, expense and VAT totals for a period
    Summary {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Outstanding debts, overdue and upcoming installments
    #[command(alias = "due")]
    Debts {
        /// Look-ahead window in days (defaults to the configured value)
        #[arg(short, long)]
        days: Option<u32>,
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,
    },

    /// Running balance of a party (cari ekstre)
    Statement {
        /// Party name or ID
        party: String,
        /// Defaults to the start of the current year
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Project profitability
    Project {
        /// Project name or ID; all projects when omitted
        project: Option<String>,
    },
}

/// Parse `2025-03` into the first and last day of that month
fn parse_month(s: &str) -> DefterResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| DefterError::invalid("month", format!("Geçersiz ay: '{}' (YYYY-AA)", s)))?;
    Ok(current_month(first))
}

pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> DefterResult<()> {
    let base = settings.base_currency;
    let today = today();

    match cmd {
        ReportCommands::Summary { month, from, to } => {
            let (start, end) = match month {
                Some(month) => parse_month(&month)?,
                None if from.is_some() || to.is_some() => {
                    let (month_start, _) = current_month(today);
                    (from.unwrap_or(month_start), to.unwrap_or(today))
                }
                None => current_month(today),
            };
            if start > end {
                return Err(DefterError::invalid("from", "Başlangıç tarihi bitişten sonra olamaz"));
            }
            let report = SummaryReport::generate(storage, start, end, base)?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Debts { days, as_of } => {
            let report = DebtReport::generate(
                storage,
                as_of.unwrap_or(today),
                days.unwrap_or(settings.upcoming_days),
            )?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Statement { party, from, to } => {
            let party = PartyService::new(storage).resolve(&party)?;
            let start = from.unwrap_or_else(|| {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
            });
            let end = to.unwrap_or(today);
            if start > end {
                return Err(DefterError::invalid("from", "Başlangıç tarihi bitişten sonra olamaz"));
            }
            let report = PartyStatement::generate(storage, party.id, start, end)?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Project { project } => {
            let project_id = project
                .map(|p| ProjectService::new(storage).resolve(&p))
                .transpose()?
                .map(|p| p.id);
            let report = ProjectReport::generate(storage, project_id, base)?;
            print!("{}", report.format_terminal());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let (start, end) = parse_month("2024-02").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_month("2024-13").is_err());
    }
}
