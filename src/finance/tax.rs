//! VAT (KDV) and withholding (stopaj) calculation

use rust_decimal::Decimal;

use crate::models::{Money, Percent, TaxBreakdown};

/// Amount and rates as entered on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxInput {
    pub amount: Money,
    pub vat_rate: Percent,
    pub withholding_rate: Percent,
    /// `amount` already contains VAT
    pub vat_included: bool,
}

impl TaxInput {
    pub fn untaxed(amount: Money) -> Self {
        Self {
            amount,
            vat_rate: Percent::zero(),
            withholding_rate: Percent::zero(),
            vat_included: false,
        }
    }
}

/// Split an amount into base, VAT, withholding and net
///
/// When VAT is included the base is backed out of the amount and the VAT is
/// the difference, so `base + vat` always equals the entered amount.
/// Withholding is always taken on the base.
pub fn calculate(input: TaxInput) -> TaxBreakdown {
    let (base, vat) = if input.vat_included {
        let divisor = Decimal::ONE + input.vat_rate.ratio();
        let base = Money::from_decimal(input.amount.to_decimal() / divisor);
        (base, input.amount - base)
    } else {
        (input.amount, input.vat_rate.of(input.amount))
    };

    let withholding = input.withholding_rate.of(base);

    TaxBreakdown {
        base,
        vat,
        withholding,
        net: base + vat - withholding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(cents: i64, vat: u8, withholding: u8, included: bool) -> TaxInput {
        TaxInput {
            amount: Money::from_cents(cents),
            vat_rate: Percent::whole(vat),
            withholding_rate: Percent::whole(withholding),
            vat_included: included,
        }
    }

    #[rstest]
    #[case::vat_excluded(input(100_000, 20, 0, false), 100_000, 20_000, 0, 120_000)]
    #[case::vat_and_withholding(input(100_000, 20, 20, false), 100_000, 20_000, 20_000, 100_000)]
    #[case::vat_included(input(120_000, 20, 0, true), 100_000, 20_000, 0, 120_000)]
    #[case::reduced_rate(input(10_000, 10, 0, false), 10_000, 1_000, 0, 11_000)]
    #[case::untaxed(input(4_999, 0, 0, false), 4_999, 0, 0, 4_999)]
    fn test_breakdown(
        #[case] input: TaxInput,
        #[case] base: i64,
        #[case] vat: i64,
        #[case] withholding: i64,
        #[case] net: i64,
    ) {
        let tax = calculate(input);
        assert_eq!(tax.base.cents(), base);
        assert_eq!(tax.vat.cents(), vat);
        assert_eq!(tax.withholding.cents(), withholding);
        assert_eq!(tax.net.cents(), net);
        assert!(tax.is_consistent());
    }

    #[test]
    fn test_included_vat_keeps_total() {
        // 100.00 / 1.18 = 84.745... -> 84.75, VAT takes the rest
        let tax = calculate(input(10_000, 18, 0, true));
        assert_eq!(tax.base.cents(), 8_475);
        assert_eq!(tax.vat.cents(), 1_525);
        assert_eq!((tax.base + tax.vat).cents(), 10_000);
    }

    #[test]
    fn test_withholding_rounds_half_away_from_zero() {
        // 0.15 * 10% = 0.015 -> 0.02
        let tax = calculate(input(15, 0, 10, false));
        assert_eq!(tax.withholding.cents(), 2);
        assert_eq!(tax.net.cents(), 13);
    }
}
