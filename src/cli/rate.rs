//! Exchange rate CLI commands

use chrono::NaiveDate;
use clap::Subcommand;
use rust_decimal::Decimal;

use super::{parse_currency, parse_date, parse_decimal, parse_money, parse_rate_source, today};
use crate::config::Settings;
use crate::display::format_rate_list;
use crate::error::{DefterError, DefterResult};
use crate::models::{Currency, Money, RateSource};
use crate::services::ExchangeRateService;
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum RateCommands {
    /// Store the rate of a currency against the base currency
    Set {
        #[arg(value_parser = parse_currency)]
        currency: Currency,
        /// Base-currency units per one unit, e.g. 38.75
        #[arg(value_parser = parse_decimal)]
        rate: Decimal,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long, default_value = "manual", value_parser = parse_rate_source)]
        source: RateSource,
    },

    /// List stored rates
    List {
        #[arg(value_parser = parse_currency)]
        currency: Option<Currency>,
    },

    /// Show the rate in effect on a date
    Latest {
        #[arg(value_parser = parse_currency)]
        currency: Currency,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Convert an amount between currencies
    Convert {
        #[arg(value_parser = parse_money)]
        amount: Money,
        #[arg(value_parser = parse_currency)]
        from: Currency,
        #[arg(value_parser = parse_currency)]
        to: Currency,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Delete a stored rate
    Delete { id: String },
}

pub fn handle_rate_command(storage: &Storage, settings: &Settings, cmd: RateCommands) -> DefterResult<()> {
    let service = ExchangeRateService::new(storage, settings.base_currency);
    let base = service.base_currency();
    let date_format = settings.date_format.as_str();

    match cmd {
        RateCommands::Set {
            currency,
            rate,
            date,
            source,
        } => {
            let date = date.unwrap_or_else(today);
            let entry = service.set(currency, date, rate, source)?;
            println!(
                "Kur kaydedildi: 1 {} = {} {} ({})",
                entry.currency,
                entry.rate,
                base,
                entry.date.format(date_format)
            );
        }

        RateCommands::List { currency } => {
            print!("{}", format_rate_list(&service.list(currency)?, base, date_format));
        }

        RateCommands::Latest { currency, date } => {
            let date = date.unwrap_or_else(today);
            if currency == base {
                println!("{} ana para birimidir: 1 {} = 1 {}", base, base, base);
                return Ok(());
            }
            match service.latest(currency, date)? {
                Some(rate) => println!(
                    "1 {} = {} {} ({}, {})",
                    rate.currency,
                    rate.rate,
                    base,
                    rate.date.format(date_format),
                    rate.source
                ),
                None => println!(
                    "{} için {} veya öncesine ait kur yok.",
                    currency,
                    date.format(date_format)
                ),
            }
        }

        RateCommands::Convert {
            amount,
            from,
            to,
            date,
        } => {
            let converted = service.convert(amount, from, to, date.unwrap_or_else(today))?;
            println!(
                "{} = {}",
                amount.format_with_currency(from),
                converted.format_with_currency(to)
            );
        }

        RateCommands::Delete { id } => {
            let rate = service
                .find(&id)?
                .ok_or_else(|| DefterError::rate_not_found(id.as_str()))?;
            service.delete(rate.id)?;
            println!(
                "Kur silindi: {} {}",
                rate.currency,
                rate.date.format(date_format)
            );
        }
    }

    Ok(())
}
