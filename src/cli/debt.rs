//! Debt and receivable CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{
    parse_currency, parse_date, parse_direction, parse_money, parse_payment_status, parse_percent,
    today,
};
use crate::config::Settings;
use crate::display::{format_debt_details, format_debt_list, Names};
use crate::error::DefterResult;
use crate::models::{Currency, DebtDirection, InstallmentPlan, Money, PaymentStatus, Percent};
use crate::services::{CreateDebtInput, DebtFilter, DebtService, PartyService, UpdateDebtInput};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum DebtCommands {
    /// Record a payable (borç) or receivable (alacak)
    Create {
        /// borç or alacak
        #[arg(value_parser = parse_direction)]
        direction: DebtDirection,
        /// Party name or ID
        party: String,
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// What the debt is for
        #[arg(short, long)]
        description: String,
        #[arg(short = 'C', long, value_parser = parse_currency)]
        currency: Option<Currency>,
        /// Issue date (defaults to today)
        #[arg(long, value_parser = parse_date)]
        issued: Option<NaiveDate>,
        /// Due date when not paid in installments
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        /// Split into this many installments
        #[arg(short, long, requires = "first_due")]
        installments: Option<u32>,
        /// Due date of the first installment
        #[arg(long, value_parser = parse_date)]
        first_due: Option<NaiveDate>,
        /// Months between installments
        #[arg(long, default_value = "1")]
        interval: u32,
        #[arg(long, value_parser = parse_percent)]
        vat: Option<Percent>,
        #[arg(long, value_parser = parse_percent)]
        withholding: Option<Percent>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List debts, earliest due first
    List {
        #[arg(short, long, value_parser = parse_direction)]
        direction: Option<DebtDirection>,
        #[arg(short, long)]
        party: Option<String>,
        #[arg(short, long, value_parser = parse_payment_status)]
        status: Option<PaymentStatus>,
        /// Only overdue debts
        #[arg(long)]
        overdue: bool,
        /// Hide fully paid debts
        #[arg(long)]
        open: bool,
    },

    /// Show a debt with its installments
    Show { id: String },

    /// Edit a debt
    Edit {
        id: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_money)]
        amount: Option<Money>,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        #[arg(long, value_parser = parse_percent, conflicts_with = "clear_vat")]
        vat: Option<Percent>,
        #[arg(long)]
        clear_vat: bool,
        #[arg(long, value_parser = parse_percent, conflicts_with = "clear_withholding")]
        withholding: Option<Percent>,
        #[arg(long)]
        clear_withholding: bool,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Replace the installment schedule of an unpaid debt
    Reschedule {
        id: String,
        /// New installment count; omit to pay in one go
        #[arg(short, long, requires = "first_due")]
        installments: Option<u32>,
        #[arg(long, value_parser = parse_date)]
        first_due: Option<NaiveDate>,
        #[arg(long, default_value = "1")]
        interval: u32,
    },

    /// Delete a debt without payments
    Delete { id: String },
}

fn plan(count: Option<u32>, first_due: Option<NaiveDate>, interval: u32) -> Option<InstallmentPlan> {
    match (count, first_due) {
        (Some(count), Some(first_due_date)) => Some(InstallmentPlan {
            count,
            first_due_date,
            interval_months: interval,
        }),
        _ => None,
    }
}

pub fn handle_debt_command(storage: &Storage, settings: &Settings, cmd: DebtCommands) -> DefterResult<()> {
    let service = DebtService::new(storage);
    let parties = PartyService::new(storage);
    let date_format = settings.date_format.as_str();
    let today = today();

    match cmd {
        DebtCommands::Create {
            direction,
            party,
            amount,
            description,
            currency,
            issued,
            due,
            installments,
            first_due,
            interval,
            vat,
            withholding,
            notes,
        } => {
            let party = parties.resolve(&party)?;
            let mut input = CreateDebtInput::new(
                direction,
                party.id,
                description,
                amount,
                currency.unwrap_or(settings.base_currency),
                issued.unwrap_or(today),
            );
            input.due_date = due;
            input.vat_rate = vat;
            input.withholding_rate = withholding;
            input.notes = notes;
            input.plan = plan(installments, first_due, interval);

            let debt = service.create(input)?;
            println!(
                "{} kaydedildi: {} - {}",
                debt.direction,
                party.name,
                debt.principal.format_with_currency(debt.currency)
            );
            if let Some(plan) = debt.installment_plan {
                println!(
                    "  {} taksit, ilk vade {}",
                    plan.count,
                    plan.first_due_date.format(date_format)
                );
            } else {
                println!("  Vade: {}", debt.due_date.format(date_format));
            }
            println!("  ID: {}", debt.id);
        }

        DebtCommands::List {
            direction,
            party,
            status,
            overdue,
            open,
        } => {
            let mut filter = DebtFilter::new().as_of(today);
            if let Some(direction) = direction {
                filter = filter.direction(direction);
            }
            if let Some(party) = party {
                filter = filter.party(parties.resolve(&party)?.id);
            }
            if let Some(status) = status {
                filter = filter.status(status);
            }
            if overdue {
                filter = filter.overdue_only();
            }
            if open {
                filter = filter.open_only();
            }

            let debts = service.list(filter)?;
            let names = Names::load(storage)?;
            print!("{}", format_debt_list(&debts, &names, today, date_format));
        }

        DebtCommands::Show { id } => {
            let debt = service.resolve(&id)?;
            let summary = service.summary(debt.id, today)?;
            let names = Names::load(storage)?;
            print!("{}", format_debt_details(&summary, &names, today, date_format));
        }

        DebtCommands::Edit {
            id,
            description,
            amount,
            due,
            vat,
            clear_vat,
            withholding,
            clear_withholding,
            notes,
        } => {
            let debt = service.resolve(&id)?;
            let input = UpdateDebtInput {
                description,
                due_date: due,
                notes,
                principal: amount,
                vat_rate: if clear_vat { Some(None) } else { vat.map(Some) },
                withholding_rate: if clear_withholding {
                    Some(None)
                } else {
                    withholding.map(Some)
                },
            };
            let updated = service.update(debt.id, input)?;
            println!("Kayıt güncellendi: {}", updated.description);
        }

        DebtCommands::Reschedule {
            id,
            installments,
            first_due,
            interval,
        } => {
            let debt = service.resolve(&id)?;
            let updated = service.reschedule(debt.id, plan(installments, first_due, interval))?;
            let count = service.installments(updated.id)?.len();
            if count == 0 {
                println!(
                    "Taksitler kaldırıldı. Vade: {}",
                    updated.due_date.format(date_format)
                );
            } else {
                println!(
                    "{} taksit planlandı, son vade {}",
                    count,
                    updated.due_date.format(date_format)
                );
            }
        }

        DebtCommands::Delete { id } => {
            let debt = service.resolve(&id)?;
            service.delete(debt.id)?;
            println!("Kayıt silindi: {}", debt.description);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_needs_count_and_first_due() {
        let first = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(plan(None, Some(first), 1), None);
        assert_eq!(plan(Some(3), None, 1), None);

        let plan = plan(Some(3), Some(first), 2).unwrap();
        assert_eq!(plan.count, 3);
        assert_eq!(plan.interval_months, 2);
    }
}
