//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Each handler takes
//! the loaded storage and settings, runs one operation and prints the
//! result. Value parsers here turn user input into domain types so clap can
//! report bad input before any data is touched.

pub mod audit;
pub mod backup;
pub mod category;
pub mod debt;
pub mod grant;
pub mod party;
pub mod payment;
pub mod project;
pub mod rate;
pub mod report;
pub mod transaction;

pub use audit::{handle_audit_command, AuditCommands};
pub use backup::{handle_backup_command, BackupCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use debt::{handle_debt_command, DebtCommands};
pub use grant::{handle_grant_command, GrantCommands};
pub use party::{handle_party_command, PartyCommands};
pub use payment::{handle_payment_command, PaymentCommands};
pub use project::{handle_milestone_command, handle_project_command, MilestoneCommands, ProjectCommands};
pub use rate::{handle_rate_command, RateCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    Currency, DebtDirection, Money, PartyKind, PaymentMethod, PaymentStatus, Percent, ProjectStatus,
    RateSource, TransactionKind,
};

/// Today in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `2025-03-14` and `14.03.2025`
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| format!("Geçersiz tarih: '{}' (YYYY-AA-GG veya GG.AA.YYYY)", s))
}

pub fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}

pub fn parse_percent(s: &str) -> Result<Percent, String> {
    Percent::parse(s).map_err(|e| e.to_string())
}

pub fn parse_currency(s: &str) -> Result<Currency, String> {
    Currency::parse(s).ok_or_else(|| format!("Bilinmeyen para birimi: '{}'", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal, String> {
    s.trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("Geçersiz sayı: '{}'", s))
}

pub fn parse_kind(s: &str) -> Result<TransactionKind, String> {
    TransactionKind::parse(s).ok_or_else(|| format!("Tür 'gelir' veya 'gider' olmalı: '{}'", s))
}

pub fn parse_direction(s: &str) -> Result<DebtDirection, String> {
    DebtDirection::parse(s).ok_or_else(|| format!("Yön 'borç' veya 'alacak' olmalı: '{}'", s))
}

pub fn parse_party_kind(s: &str) -> Result<PartyKind, String> {
    PartyKind::parse(s).ok_or_else(|| format!("Bilinmeyen cari türü: '{}'", s))
}

pub fn parse_method(s: &str) -> Result<PaymentMethod, String> {
    PaymentMethod::parse(s).ok_or_else(|| format!("Bilinmeyen ödeme şekli: '{}'", s))
}

pub fn parse_payment_status(s: &str) -> Result<PaymentStatus, String> {
    PaymentStatus::parse(s).ok_or_else(|| format!("Bilinmeyen durum: '{}'", s))
}

pub fn parse_project_status(s: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(s).ok_or_else(|| format!("Bilinmeyen proje durumu: '{}'", s))
}

pub fn parse_rate_source(s: &str) -> Result<RateSource, String> {
    RateSource::parse(s).ok_or_else(|| format!("Bilinmeyen kur kaynağı: '{}'", s))
}

/// First and last day of the current month
pub fn current_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    use chrono::Datelike;
    let start = today.with_day(1).unwrap_or(today);
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(today);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2025-03-14")]
    #[case("14.03.2025")]
    #[case(" 2025-03-14 ")]
    fn test_parse_date_formats(#[case] input: &str) {
        assert_eq!(parse_date(input), Ok(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_money("1.250,00").ok(), None);
        assert_eq!(parse_money("1250,50").unwrap().cents(), 125_050);
        assert_eq!(parse_percent("%18").unwrap(), Percent::whole(18));
        assert_eq!(parse_currency("tl").unwrap(), Currency::Try);
        assert_eq!(parse_kind("gider").unwrap(), TransactionKind::Expense);
        assert!(parse_currency("xyz").is_err());
        assert_eq!(parse_decimal("38,75").unwrap().to_string(), "38.75");
    }

    #[test]
    fn test_current_month() {
        let (start, end) = current_month(NaiveDate::from_ymd_opt(2024, 2, 17).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
