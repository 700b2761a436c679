//! Currency conversion
//!
//! Rates are stored as base-currency units per one unit of a foreign
//! currency. Conversions round half away from zero to minor units.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Currency, ExchangeRate, Money};

/// Multiply an amount by a rate
pub fn convert(amount: Money, rate: Decimal) -> Money {
    amount.mul_decimal(rate)
}

/// Rate from one currency to another given both rates against the base
///
/// Returns `None` when the target rate is zero.
pub fn cross_rate(from_rate: Decimal, to_rate: Decimal) -> Option<Decimal> {
    if to_rate.is_zero() {
        return None;
    }
    from_rate.checked_div(to_rate)
}

/// Most recent rate for `currency` dated on or before `date`
pub fn latest_on_or_before<'a, I>(rates: I, currency: Currency, date: NaiveDate) -> Option<&'a ExchangeRate>
where
    I: IntoIterator<Item = &'a ExchangeRate>,
{
    rates
        .into_iter()
        .filter(|r| r.currency == currency && r.date <= date)
        .max_by_key(|r| r.date)
}
