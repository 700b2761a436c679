//! Payment CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_currency, parse_date, parse_method, parse_money, today};
use crate::config::Settings;
use crate::display::{format_payment_details, format_payment_list};
use crate::error::{DefterError, DefterResult};
use crate::models::{Currency, DebtDirection, Money, PaymentMethod, PaymentTarget, TransactionKind};
use crate::services::{
    CategoryService, DebtService, GrantService, PaymentFilter, PaymentService, RecordPaymentInput,
};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Record a payment against a debt, one installment or a grant
    Record {
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// Debt ID
        #[arg(long, required_unless_present = "grant", conflicts_with = "grant")]
        debt: Option<String>,
        /// Installment number within the debt
        #[arg(long, requires = "debt")]
        installment: Option<u32>,
        /// Grant ID
        #[arg(long)]
        grant: Option<String>,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short = 'C', long, value_parser = parse_currency)]
        currency: Option<Currency>,
        #[arg(short, long, value_parser = parse_method)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        notes: Option<String>,
        /// Also record a matching income/expense transaction
        #[arg(long)]
        create_transaction: bool,
        /// Category for the generated transaction
        #[arg(short, long, requires = "create_transaction")]
        category: Option<String>,
    },

    /// List payments, oldest first
    List {
        #[arg(long, conflicts_with = "grant")]
        debt: Option<String>,
        #[arg(long)]
        grant: Option<String>,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one payment with its installment allocations
    Show { id: String },

    /// Delete a payment and recompute what it settled
    Delete { id: String },
}

pub fn handle_payment_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PaymentCommands,
) -> DefterResult<()> {
    let service = PaymentService::new(storage, settings.base_currency);
    let debts = DebtService::new(storage);
    let grants = GrantService::new(storage);
    let date_format = settings.date_format.as_str();

    match cmd {
        PaymentCommands::Record {
            amount,
            debt,
            installment,
            grant,
            date,
            currency,
            method,
            notes,
            create_transaction,
            category,
        } => {
            let (target, kind) = match (debt, grant) {
                (Some(debt), _) => {
                    let debt = debts.resolve(&debt)?;
                    let kind = match debt.direction {
                        DebtDirection::Payable => TransactionKind::Expense,
                        DebtDirection::Receivable => TransactionKind::Income,
                    };
                    let target = match installment {
                        Some(sequence) => {
                            let inst = debts
                                .installments(debt.id)?
                                .into_iter()
                                .find(|i| i.sequence == sequence)
                                .ok_or_else(|| {
                                    DefterError::installment_not_found(format!("{}#{}", debt.id, sequence))
                                })?;
                            PaymentTarget::Installment {
                                debt_id: debt.id,
                                installment_id: inst.id,
                            }
                        }
                        None => PaymentTarget::Debt { debt_id: debt.id },
                    };
                    (target, kind)
                }
                (None, Some(grant)) => {
                    let grant = grants.resolve(&grant)?;
                    (PaymentTarget::Grant { grant_id: grant.id }, TransactionKind::Income)
                }
                (None, None) => {
                    return Err(DefterError::invalid("target", "--debt veya --grant belirtilmeli"));
                }
            };

            let mut input = RecordPaymentInput::new(target, date.unwrap_or_else(today), amount);
            input.currency = currency;
            input.method = method.unwrap_or_default();
            input.notes = notes;
            input.create_transaction = create_transaction;
            input.category_id = category
                .map(|c| CategoryService::new(storage).resolve(&c, Some(kind)))
                .transpose()?
                .map(|c| c.id);

            let payment = service.record(input)?;
            println!(
                "Ödeme kaydedildi: {}",
                payment.amount.format_with_currency(payment.currency)
            );
            println!("  ID: {}", payment.id);
            if let Some(txn_id) = payment.transaction_id {
                println!("  İşlem: {}", txn_id);
            }
        }

        PaymentCommands::List {
            debt,
            grant,
            from,
            to,
            limit,
        } => {
            let mut filter = PaymentFilter::new();
            if let Some(debt) = debt {
                filter = filter.debt(debts.resolve(&debt)?.id);
            }
            if let Some(grant) = grant {
                filter = filter.grant(grants.resolve(&grant)?.id);
            }
            if from.is_some() || to.is_some() {
                filter = filter.date_range(
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                );
            }
            if let Some(limit) = limit {
                filter = filter.limit(limit);
            }
            print!("{}", format_payment_list(&service.list(filter)?, date_format));
        }

        PaymentCommands::Show { id } => {
            let payment = service.resolve(&id)?;
            print!("{}", format_payment_details(&payment, date_format));
        }

        PaymentCommands::Delete { id } => {
            let payment = service.resolve(&id)?;
            service.delete(payment.id)?;
            println!("Ödeme silindi: {}", payment.id);
        }
    }

    Ok(())
}
