//! Exchange rate service
//!
//! Rates are entered by hand, one per currency per day, as base-currency
//! units per one unit of the foreign currency. Conversions look up the most
//! recent rate on or before the requested date.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::finance::{convert, cross_rate};
use crate::models::{Currency, ExchangeRate, ExchangeRateId, Money, RateSource};
use crate::storage::Storage;

/// Fractional digits kept on a stored rate
pub const RATE_SCALE: u32 = 6;

/// Service for exchange rates against the base currency
pub struct ExchangeRateService<'a> {
    storage: &'a Storage,
    base: Currency,
}

impl<'a> ExchangeRateService<'a> {
    pub fn new(storage: &'a Storage, base: Currency) -> Self {
        Self { storage, base }
    }

    pub fn base_currency(&self) -> Currency {
        self.base
    }

    /// Record the rate for a currency on a date, replacing any earlier entry
    pub fn set(
        &self,
        currency: Currency,
        date: NaiveDate,
        rate: Decimal,
        source: RateSource,
    ) -> DefterResult<ExchangeRate> {
        if currency == self.base {
            return Err(DefterError::invalid(
                "currency",
                format!("{} ana para birimidir, kuru her zaman 1", currency),
            ));
        }
        let rate = rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rate <= Decimal::ZERO {
            return Err(DefterError::invalid(
                "rate",
                format!("Kur {} ondalık basamağa yuvarlandığında sıfırdan büyük olmalıdır", RATE_SCALE),
            ));
        }

        match self.storage.exchange_rates.get_for(currency, date)? {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.rate = rate;
                updated.source = source;
                updated.updated_at = Utc::now();

                self.storage.exchange_rates.upsert(updated.clone())?;
                self.storage.exchange_rates.save()?;

                self.storage.log_update(
                    EntityType::ExchangeRate,
                    updated.id.to_string(),
                    Some(format!("{} {}", currency, date)),
                    &existing,
                    &updated,
                )?;
                Ok(updated)
            }
            None => {
                let entry = ExchangeRate::new(currency, date, rate, source);

                self.storage.exchange_rates.upsert(entry.clone())?;
                self.storage.exchange_rates.save()?;

                self.storage.log_create(
                    EntityType::ExchangeRate,
                    entry.id.to_string(),
                    Some(format!("{} {}", currency, date)),
                    &entry,
                )?;
                Ok(entry)
            }
        }
    }

    pub fn list(&self, currency: Option<Currency>) -> DefterResult<Vec<ExchangeRate>> {
        let rates = self.storage.exchange_rates.get_all()?;
        Ok(rates
            .into_iter()
            .filter(|r| currency.map_or(true, |c| r.currency == c))
            .collect())
    }

    pub fn find(&self, identifier: &str) -> DefterResult<Option<ExchangeRate>> {
        self.storage.exchange_rates.find(identifier)
    }

    /// Most recent stored rate on or before `date`
    pub fn latest(&self, currency: Currency, on_or_before: NaiveDate) -> DefterResult<Option<ExchangeRate>> {
        self.storage.exchange_rates.latest(currency, on_or_before)
    }

    /// Base-currency units per unit of `currency` on `date`
    ///
    /// The base currency is always 1; any other currency needs a stored
    /// rate on or before the date.
    pub fn rate_to_base(&self, currency: Currency, date: NaiveDate) -> DefterResult<Decimal> {
        if currency == self.base {
            return Ok(Decimal::ONE);
        }
        self.latest(currency, date)?
            .map(|r| r.rate)
            .ok_or_else(|| DefterError::rate_not_found(format!("{} ({} veya öncesi)", currency, date)))
    }

    /// Convert an amount between two currencies as of a date
    pub fn convert(
        &self,
        amount: Money,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> DefterResult<Money> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self.rate_to_base(from, date)?;
        let to_rate = self.rate_to_base(to, date)?;
        let rate = cross_rate(from_rate, to_rate)
            .ok_or_else(|| DefterError::invalid("rate", "Geçersiz çapraz kur"))?;

        tracing::debug!(%from, %to, %rate, "converting amount");
        Ok(convert(amount, rate))
    }

    pub fn delete(&self, id: ExchangeRateId) -> DefterResult<ExchangeRate> {
        let rate = self
            .storage
            .exchange_rates
            .get(id)?
            .ok_or_else(|| DefterError::rate_not_found(id.to_string()))?;

        self.storage.exchange_rates.delete(id)?;
        self.storage.exchange_rates.save()?;

        self.storage.log_delete(
            EntityType::ExchangeRate,
            rate.id.to_string(),
            Some(format!("{} {}", rate.currency, rate.date)),
            &rate,
        )?;

        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{create_test_storage, date};
    use rust_decimal_macros::dec;

    #[test]
    fn test_set_replaces_same_day() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);

        let first = service
            .set(Currency::Usd, date(2025, 3, 3), dec!(36.1), RateSource::Manual)
            .unwrap();
        let second = service
            .set(Currency::Usd, date(2025, 3, 3), dec!(36.25), RateSource::Tcmb)
            .unwrap();

        assert_eq!(first.id, second.id);
        let rates = service.list(Some(Currency::Usd)).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].rate, dec!(36.25));
        assert_eq!(rates[0].source, RateSource::Tcmb);
    }

    #[test]
    fn test_base_currency_rate_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);

        assert!(service
            .set(Currency::Try, date(2025, 3, 3), dec!(1), RateSource::Manual)
            .unwrap_err()
            .is_validation());
        assert!(service
            .set(Currency::Eur, date(2025, 3, 3), dec!(0), RateSource::Manual)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_rate_rounds_half_away_from_zero_before_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);

        assert!(service
            .set(Currency::Usd, date(2025, 3, 3), dec!(0.0000004), RateSource::Manual)
            .unwrap_err()
            .is_validation());
        assert!(service.list(None).unwrap().is_empty());

        let tiny = service
            .set(Currency::Usd, date(2025, 3, 3), dec!(0.0000005), RateSource::Manual)
            .unwrap();
        assert_eq!(tiny.rate, dec!(0.000001));

        let half = service
            .set(Currency::Eur, date(2025, 3, 3), dec!(38.1234565), RateSource::Manual)
            .unwrap();
        assert_eq!(half.rate, dec!(38.123457));
    }

    #[test]
    fn test_conversion_uses_latest_rate_on_or_before() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);
        service
            .set(Currency::Usd, date(2025, 1, 1), dec!(35), RateSource::Manual)
            .unwrap();
        service
            .set(Currency::Usd, date(2025, 1, 10), dec!(36), RateSource::Manual)
            .unwrap();

        let amount = Money::from_cents(10_000);
        let on_5th = service
            .convert(amount, Currency::Usd, Currency::Try, date(2025, 1, 5))
            .unwrap();
        let on_20th = service
            .convert(amount, Currency::Usd, Currency::Try, date(2025, 1, 20))
            .unwrap();

        assert_eq!(on_5th.cents(), 350_000);
        assert_eq!(on_20th.cents(), 360_000);
    }

    #[test]
    fn test_cross_conversion_between_foreign_currencies() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);
        service
            .set(Currency::Eur, date(2025, 2, 1), dec!(40), RateSource::Manual)
            .unwrap();
        service
            .set(Currency::Usd, date(2025, 2, 1), dec!(32), RateSource::Manual)
            .unwrap();

        let usd = service
            .convert(Money::from_cents(10_000), Currency::Eur, Currency::Usd, date(2025, 2, 1))
            .unwrap();
        assert_eq!(usd.cents(), 12_500);

        let back_to_base = service
            .convert(Money::from_cents(32_000), Currency::Try, Currency::Usd, date(2025, 2, 1))
            .unwrap();
        assert_eq!(back_to_base.cents(), 1_000);
    }

    #[test]
    fn test_missing_rate_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);
        service
            .set(Currency::Usd, date(2025, 1, 10), dec!(36), RateSource::Manual)
            .unwrap();

        let err = service
            .convert(Money::from_cents(100), Currency::Usd, Currency::Try, date(2025, 1, 9))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            service.rate_to_base(Currency::Try, date(2025, 1, 1)).unwrap(),
            Decimal::ONE
        );
    }

    #[test]
    fn test_delete_rate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExchangeRateService::new(&storage, Currency::Try);
        let rate = service
            .set(Currency::Gbp, date(2025, 1, 1), dec!(44.5), RateSource::Manual)
            .unwrap();

        service.delete(rate.id).unwrap();
        assert!(service.list(None).unwrap().is_empty());
        assert!(service.delete(rate.id).unwrap_err().is_not_found());
    }
}
