//! Transaction CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_currency, parse_date, parse_kind, parse_method, parse_money, parse_percent, today};
use crate::config::Settings;
use crate::display::{format_transaction_details, format_transaction_list, Names};
use crate::error::DefterResult;
use crate::models::{Currency, Money, PaymentMethod, Percent, TransactionKind};
use crate::services::{
    CategoryService, CreateTransactionInput, PartyService, ProjectService, TransactionFilter,
    TransactionService, UpdateTransactionInput,
};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an income or expense
    Add {
        /// income or expense
        #[arg(value_parser = parse_kind)]
        kind: TransactionKind,
        /// Amount, e.g. 1250.00
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// Currency (defaults to the base currency)
        #[arg(short = 'C', long, value_parser = parse_currency)]
        currency: Option<Currency>,
        /// Date (defaults to today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        party: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// VAT rate (defaults to the configured rate)
        #[arg(long, value_parser = parse_percent)]
        vat: Option<Percent>,
        /// Withholding (stopaj) rate
        #[arg(long, value_parser = parse_percent)]
        withholding: Option<Percent>,
        /// The amount already includes VAT
        #[arg(long)]
        vat_included: bool,
        #[arg(short, long, value_parser = parse_method)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        description: Option<String>,
        /// Invoice or receipt number
        #[arg(long)]
        document: Option<String>,
    },

    /// List transactions, newest first
    List {
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<TransactionKind>,
        #[arg(short, long)]
        party: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show one transaction with its tax breakdown
    Show { id: String },

    /// Edit a transaction
    Edit {
        id: String,
        #[arg(long, value_parser = parse_money)]
        amount: Option<Money>,
        #[arg(short = 'C', long, value_parser = parse_currency)]
        currency: Option<Currency>,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long, conflicts_with = "clear_party")]
        party: Option<String>,
        #[arg(long)]
        clear_party: bool,
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[arg(long)]
        clear_category: bool,
        #[arg(long, conflicts_with = "clear_project")]
        project: Option<String>,
        #[arg(long)]
        clear_project: bool,
        #[arg(long, value_parser = parse_percent)]
        vat: Option<Percent>,
        #[arg(long, value_parser = parse_percent)]
        withholding: Option<Percent>,
        #[arg(long)]
        vat_included: Option<bool>,
        #[arg(short, long, value_parser = parse_method)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        document: Option<String>,
    },

    /// Delete a transaction
    Delete { id: String },
}

pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> DefterResult<()> {
    let service = TransactionService::new(storage, settings.base_currency);
    let parties = PartyService::new(storage);
    let categories = CategoryService::new(storage);
    let projects = ProjectService::new(storage);
    let date_format = settings.date_format.as_str();

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            currency,
            date,
            party,
            category,
            project,
            vat,
            withholding,
            vat_included,
            method,
            description,
            document,
        } => {
            let mut input = CreateTransactionInput::new(
                kind,
                date.unwrap_or_else(today),
                amount,
                currency.unwrap_or(settings.base_currency),
            );
            input.party_id = party.map(|p| parties.resolve(&p)).transpose()?.map(|p| p.id);
            input.category_id = category
                .map(|c| categories.resolve(&c, Some(kind)))
                .transpose()?
                .map(|c| c.id);
            input.project_id = project.map(|p| projects.resolve(&p)).transpose()?.map(|p| p.id);
            input.vat_rate = vat.unwrap_or(settings.default_vat_rate);
            input.withholding_rate = withholding.unwrap_or_default();
            input.vat_included = vat_included;
            input.method = method.unwrap_or_default();
            input.description = description;
            input.document_no = document;

            let txn = service.create(input)?;
            println!("{} kaydedildi: {}", txn.kind, txn.tax.net.format_with_currency(txn.currency));
            if txn.currency != txn.base_currency {
                println!(
                    "  Ana para: {}",
                    txn.base_net.format_with_currency(txn.base_currency)
                );
            }
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List {
            kind,
            party,
            category,
            project,
            from,
            to,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }
            if let Some(party) = party {
                filter = filter.party(parties.resolve(&party)?.id);
            }
            if let Some(category) = category {
                filter = filter.category(categories.resolve(&category, kind)?.id);
            }
            if let Some(project) = project {
                filter = filter.project(projects.resolve(&project)?.id);
            }
            if from.is_some() || to.is_some() {
                filter = filter.date_range(
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                );
            }

            let transactions = service.list(filter)?;
            let names = Names::load(storage)?;
            print!("{}", format_transaction_list(&transactions, &names, date_format));
        }

        TransactionCommands::Show { id } => {
            let txn = service.resolve(&id)?;
            let names = Names::load(storage)?;
            print!("{}", format_transaction_details(&txn, &names, date_format));
        }

        TransactionCommands::Edit {
            id,
            amount,
            currency,
            date,
            party,
            clear_party,
            category,
            clear_category,
            project,
            clear_project,
            vat,
            withholding,
            vat_included,
            method,
            description,
            document,
        } => {
            let txn = service.resolve(&id)?;

            let party_id = match (party, clear_party) {
                (_, true) => Some(None),
                (Some(p), false) => Some(Some(parties.resolve(&p)?.id)),
                (None, false) => None,
            };
            let category_id = match (category, clear_category) {
                (_, true) => Some(None),
                (Some(c), false) => Some(Some(categories.resolve(&c, Some(txn.kind))?.id)),
                (None, false) => None,
            };
            let project_id = match (project, clear_project) {
                (_, true) => Some(None),
                (Some(p), false) => Some(Some(projects.resolve(&p)?.id)),
                (None, false) => None,
            };

            let input = UpdateTransactionInput {
                date,
                amount,
                currency,
                party_id,
                category_id,
                project_id,
                vat_rate: vat,
                withholding_rate: withholding,
                vat_included,
                method,
                description,
                document_no: document.map(|d| Some(d).filter(|d| !d.trim().is_empty())),
            };
            let updated = service.update(txn.id, input)?;
            println!(
                "İşlem güncellendi: {} {}",
                updated.id,
                updated.tax.net.format_with_currency(updated.currency)
            );
        }

        TransactionCommands::Delete { id } => {
            let txn = service.resolve(&id)?;
            service.delete(txn.id)?;
            println!("İşlem silindi: {}", txn.id);
        }
    }

    Ok(())
}
