//! Debt Report
//!
//! Outstanding receivables and payables as of a date, with overdue items
//! and what falls due in the coming days. A debt with a schedule is listed
//! per installment; one without a schedule is listed as a whole.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};

use crate::error::DefterResult;
use crate::models::{Currency, DebtDirection, DebtId, Money, PartyId};
use crate::storage::Storage;

/// Outstanding totals in one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outstanding {
    pub receivable: Money,
    pub payable: Money,
}

impl Outstanding {
    pub fn net(&self) -> Money {
        self.receivable - self.payable
    }
}

/// An open amount with a due date
#[derive(Debug, Clone)]
pub struct DueItem {
    pub debt_id: DebtId,
    /// Installment sequence, when the debt has a schedule
    pub sequence: Option<u32>,
    pub party_name: String,
    pub direction: DebtDirection,
    pub description: String,
    pub due_date: NaiveDate,
    pub remaining: Money,
    pub currency: Currency,
}

impl DueItem {
    /// Days past due on `as_of` (negative while still upcoming)
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days()
    }
}

#[derive(Debug, Clone)]
pub struct DebtReport {
    pub as_of: NaiveDate,
    pub upcoming_days: u32,
    pub outstanding: BTreeMap<Currency, Outstanding>,
    /// Oldest first
    pub overdue: Vec<DueItem>,
    /// Due within `upcoming_days` of `as_of`, earliest first
    pub upcoming: Vec<DueItem>,
}

impl DebtReport {
    pub fn generate(storage: &Storage, as_of: NaiveDate, upcoming_days: u32) -> DefterResult<Self> {
        let horizon = as_of
            .checked_add_days(Days::new(u64::from(upcoming_days)))
            .unwrap_or(NaiveDate::MAX);
        let party_names: HashMap<PartyId, String> = storage
            .parties
            .get_all()?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let mut outstanding: BTreeMap<Currency, Outstanding> = BTreeMap::new();
        let mut open_items = Vec::new();

        for debt in storage.debts.get_all()? {
            if debt.is_paid() {
                continue;
            }
            let totals = outstanding.entry(debt.currency).or_default();
            match debt.direction {
                DebtDirection::Receivable => totals.receivable += debt.remaining(),
                DebtDirection::Payable => totals.payable += debt.remaining(),
            }

            let party_name = party_names
                .get(&debt.party_id)
                .cloned()
                .unwrap_or_else(|| debt.party_id.to_string());
            let installments = storage.debts.installments_for(debt.id)?;

            if installments.is_empty() {
                open_items.push(DueItem {
                    debt_id: debt.id,
                    sequence: None,
                    party_name,
                    direction: debt.direction,
                    description: debt.description.clone(),
                    due_date: debt.due_date,
                    remaining: debt.remaining(),
                    currency: debt.currency,
                });
            } else {
                open_items.extend(installments.iter().filter(|i| i.is_open()).map(|i| DueItem {
                    debt_id: debt.id,
                    sequence: Some(i.sequence),
                    party_name: party_name.clone(),
                    direction: debt.direction,
                    description: debt.description.clone(),
                    due_date: i.due_date,
                    remaining: i.remaining(),
                    currency: debt.currency,
                }));
            }
        }

        open_items.sort_by_key(|item| (item.due_date, item.sequence));
        let (overdue, rest): (Vec<DueItem>, Vec<DueItem>) =
            open_items.into_iter().partition(|item| item.due_date < as_of);
        let upcoming = rest.into_iter().filter(|item| item.due_date <= horizon).collect();

        Ok(Self {
            as_of,
            upcoming_days,
            outstanding,
            overdue,
            upcoming,
        })
    }

    pub fn overdue_total(&self, currency: Currency, direction: DebtDirection) -> Money {
        self.overdue
            .iter()
            .filter(|i| i.currency == currency && i.direction == direction)
            .map(|i| i.remaining)
            .sum()
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Borç/Alacak Raporu: {}\n", self.as_of.format("%d.%m.%Y")));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        if self.outstanding.is_empty() {
            output.push_str("Açık borç veya alacak yok.\n");
            return output;
        }

        output.push_str(&format!("{:<8} {:>20} {:>20} {:>20}\n", "Döviz", "Alacak", "Borç", "Net"));
        output.push_str(&"-".repeat(80));
        output.push('\n');
        for (currency, totals) in &self.outstanding {
            output.push_str(&format!(
                "{:<8} {:>20} {:>20} {:>20}\n",
                currency, totals.receivable, totals.payable, totals.net()
            ));
        }

        output.push_str(&format!("\nVadesi geçenler ({})\n", self.overdue.len()));
        output.push_str(&self.format_items(&self.overdue, true));

        output.push_str(&format!(
            "\n{} gün içinde vadesi gelenler ({})\n",
            self.upcoming_days,
            self.upcoming.len()
        ));
        output.push_str(&self.format_items(&self.upcoming, false));

        output
    }

    fn format_items(&self, items: &[DueItem], overdue: bool) -> String {
        if items.is_empty() {
            return "  -\n".to_string();
        }
        let mut output = String::new();
        for item in items {
            let label = match item.sequence {
                Some(seq) => format!("{} #{}", item.description, seq),
                None => item.description.clone(),
            };
            let days = if overdue {
                format!("{} gün gecikme", item.days_overdue(self.as_of))
            } else {
                format!("{} gün kaldı", -item.days_overdue(self.as_of))
            };
            output.push_str(&format!(
                "  {} {:<7} {:<20} {:<24} {:>16} {}\n",
                item.due_date.format("%d.%m.%Y"),
                item.direction,
                truncate(&item.party_name, 20),
                truncate(&label, 24),
                item.remaining.format_with_currency(item.currency),
                days
            ));
        }
        output
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InstallmentPlan, Party, PartyKind, PaymentTarget};
    use crate::services::testing::{create_test_storage, date};
    use crate::services::{CreateDebtInput, DebtService, PaymentService, RecordPaymentInput};

    #[test]
    fn test_overdue_and_upcoming_split() {
        let (_temp_dir, storage) = create_test_storage();
        let party = Party::new("Müşteri A", PartyKind::Customer);
        storage.parties.upsert(party.clone()).unwrap();
        let debts = DebtService::new(&storage);

        let mut receivable = CreateDebtInput::new(
            DebtDirection::Receivable,
            party.id,
            "Proje bedeli",
            Money::from_cents(30_000),
            Currency::Try,
            date(2025, 1, 1),
        );
        receivable.plan = Some(InstallmentPlan::monthly(3, date(2025, 2, 1)));
        let receivable = debts.create(receivable).unwrap();

        let mut payable = CreateDebtInput::new(
            DebtDirection::Payable,
            party.id,
            "Kira",
            Money::from_cents(8_000),
            Currency::Eur,
            date(2025, 1, 1),
        );
        payable.due_date = Some(date(2025, 6, 1));
        debts.create(payable).unwrap();

        PaymentService::new(&storage, Currency::Try)
            .record(RecordPaymentInput::new(
                PaymentTarget::Debt { debt_id: receivable.id },
                date(2025, 2, 1),
                Money::from_cents(10_000),
            ))
            .unwrap();

        let report = DebtReport::generate(&storage, date(2025, 3, 10), 30).unwrap();
        assert_eq!(report.outstanding[&Currency::Try].receivable.cents(), 20_000);
        assert_eq!(report.outstanding[&Currency::Eur].payable.cents(), 8_000);

        assert_eq!(report.overdue.len(), 1);
        assert_eq!(report.overdue[0].sequence, Some(2));
        assert_eq!(report.overdue[0].days_overdue(report.as_of), 9);
        assert_eq!(
            report.overdue_total(Currency::Try, DebtDirection::Receivable).cents(),
            10_000
        );

        assert_eq!(report.upcoming.len(), 1);
        assert_eq!(report.upcoming[0].due_date, date(2025, 4, 1));

        let text = report.format_terminal();
        assert!(text.contains("Vadesi geçenler (1)"));
        assert!(text.contains("EUR"));
    }

    #[test]
    fn test_empty_report() {
        let (_temp_dir, storage) = create_test_storage();
        let report = DebtReport::generate(&storage, date(2025, 1, 1), 30).unwrap();
        assert!(report.overdue.is_empty());
        assert!(report.format_terminal().contains("Açık borç veya alacak yok"));
    }
}
