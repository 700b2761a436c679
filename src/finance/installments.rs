//! Installment schedule generation

use chrono::{Months, NaiveDate};

use crate::error::{DefterError, DefterResult};
use crate::models::Money;

/// Longest plan accepted: thirty years of monthly installments
pub const MAX_INSTALLMENTS: u32 = 360;

/// One row of a generated schedule, before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedInstallment {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
}

/// Split a principal into `count` equal shares
///
/// Each share is truncated to minor units and the last one absorbs the
/// remainder, so the shares always sum to the principal. Every share is at
/// least one minor unit.
pub fn split_equal(principal: Money, count: u32) -> DefterResult<Vec<Money>> {
    if count == 0 {
        return Err(DefterError::invalid("count", "Taksit sayısı en az 1 olmalıdır"));
    }
    if count > MAX_INSTALLMENTS {
        return Err(DefterError::invalid(
            "count",
            format!("Taksit sayısı en fazla {} olabilir", MAX_INSTALLMENTS),
        ));
    }
    if !principal.is_positive() {
        return Err(DefterError::invalid("principal", "Anapara sıfırdan büyük olmalıdır"));
    }
    if i64::from(count) > principal.cents() {
        return Err(DefterError::invalid(
            "count",
            format!("{} tutarı {} taksite bölünemez", principal, count),
        ));
    }

    let share = Money::from_cents(principal.cents() / i64::from(count));
    let mut shares = vec![share; count as usize];
    let allocated = Money::from_cents(share.cents() * i64::from(count - 1));
    if let Some(last) = shares.last_mut() {
        *last = principal - allocated;
    }
    Ok(shares)
}

/// Build a schedule of `count` installments `interval_months` apart
///
/// Due dates are computed from `first_due` rather than from the previous
/// installment, so a 31st stays on the last day of short months without
/// drifting.
pub fn schedule(
    principal: Money,
    count: u32,
    first_due: NaiveDate,
    interval_months: u32,
) -> DefterResult<Vec<PlannedInstallment>> {
    if interval_months == 0 {
        return Err(DefterError::invalid("interval_months", "Taksit aralığı en az 1 ay olmalıdır"));
    }

    let shares = split_equal(principal, count)?;
    shares
        .into_iter()
        .enumerate()
        .map(|(i, amount)| {
            let offset = interval_months
                .checked_mul(i as u32)
                .ok_or_else(|| DefterError::invalid("count", "Taksit planı çok uzun"))?;
            let due_date = first_due
                .checked_add_months(Months::new(offset))
                .ok_or_else(|| DefterError::invalid("first_due_date", "Vade tarihi hesaplanamadı"))?;
            Ok(PlannedInstallment {
                sequence: i as u32 + 1,
                due_date,
                amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(30_000, 3, vec![10_000, 10_000, 10_000])]
    #[case(10_000, 3, vec![3_333, 3_333, 3_334])]
    #[case(100, 7, vec![14, 14, 14, 14, 14, 14, 16])]
    #[case(1, 1, vec![1])]
    fn test_split_equal(#[case] principal: i64, #[case] count: u32, #[case] expected: Vec<i64>) {
        let shares = split_equal(Money::from_cents(principal), count).unwrap();
        let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
        assert_eq!(cents, expected);
        assert_eq!(shares.iter().sum::<Money>().cents(), principal);
    }

    #[test]
    fn test_split_rejects_zero_count_and_principal() {
        assert!(split_equal(Money::from_cents(100), 0).unwrap_err().is_validation());
        assert!(split_equal(Money::zero(), 3).unwrap_err().is_validation());
    }

    #[test]
    fn test_split_rejects_empty_shares_and_huge_counts() {
        assert!(split_equal(Money::from_cents(5), 10).unwrap_err().is_validation());
        assert_eq!(split_equal(Money::from_cents(5), 5).unwrap().len(), 5);
        assert!(split_equal(Money::from_cents(100_000), 4_000_000_000)
            .unwrap_err()
            .is_validation());
        assert_eq!(
            split_equal(Money::from_cents(100_000), MAX_INSTALLMENTS).unwrap().len(),
            MAX_INSTALLMENTS as usize
        );
    }

    #[test]
    fn test_schedule_clamps_to_month_end() {
        let plan = schedule(Money::from_cents(40_000), 4, date(2024, 1, 31), 1).unwrap();
        let dates: Vec<NaiveDate> = plan.iter().map(|p| p.due_date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
        assert_eq!(plan[3].sequence, 4);
    }

    #[test]
    fn test_schedule_quarterly() {
        let plan = schedule(Money::from_cents(90_000), 3, date(2025, 1, 15), 3).unwrap();
        assert_eq!(plan[1].due_date, date(2025, 4, 15));
        assert_eq!(plan[2].due_date, date(2025, 7, 15));
    }

    #[test]
    fn test_schedule_rejects_zero_interval() {
        assert!(schedule(Money::from_cents(100), 1, date(2025, 1, 1), 0).is_err());
    }
}
