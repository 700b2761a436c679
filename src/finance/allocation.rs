//! Spreading a debt-level payment over installments

use crate::models::{Installment, Money, PaymentAllocation};

/// Result of allocating a payment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocation {
    pub allocations: Vec<PaymentAllocation>,
    /// Part of the payment no open installment could absorb
    pub unallocated: Money,
}

/// Fill open installments in due-date order
///
/// The oldest installment is settled first; the last one touched may be
/// left partially paid.
pub fn allocate_oldest_first(installments: &[Installment], amount: Money) -> Allocation {
    let mut open: Vec<&Installment> = installments.iter().filter(|i| i.is_open()).collect();
    open.sort_by_key(|i| (i.due_date, i.sequence));

    let mut left = amount;
    let mut allocations = Vec::new();
    for installment in open {
        if !left.is_positive() {
            break;
        }
        let applied = left.min(installment.remaining());
        allocations.push(PaymentAllocation {
            installment_id: installment.id,
            amount: applied,
        });
        left -= applied;
    }

    Allocation {
        allocations,
        unallocated: left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DebtId;
    use chrono::NaiveDate;

    fn installments() -> Vec<Installment> {
        let debt_id = DebtId::new();
        (1..=3)
            .map(|n| {
                let due = NaiveDate::from_ymd_opt(2025, n, 10).unwrap();
                Installment::new(debt_id, n, due, Money::from_cents(10_000))
            })
            .rev()
            .collect()
    }

    #[test]
    fn test_oldest_first_with_partial_tail() {
        let installments = installments();
        let result = allocate_oldest_first(&installments, Money::from_cents(15_000));

        assert_eq!(result.allocations.len(), 2);
        assert_eq!(result.allocations[0].installment_id, installments[2].id);
        assert_eq!(result.allocations[0].amount.cents(), 10_000);
        assert_eq!(result.allocations[1].installment_id, installments[1].id);
        assert_eq!(result.allocations[1].amount.cents(), 5_000);
        assert!(result.unallocated.is_zero());
    }

    #[test]
    fn test_skips_paid_and_uses_remaining() {
        let mut installments = installments();
        installments[2].paid_amount = Money::from_cents(10_000);
        installments[1].paid_amount = Money::from_cents(4_000);

        let result = allocate_oldest_first(&installments, Money::from_cents(6_000));
        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].installment_id, installments[1].id);
        assert_eq!(result.allocations[0].amount.cents(), 6_000);
    }

    #[test]
    fn test_excess_is_reported() {
        let installments = installments();
        let result = allocate_oldest_first(&installments, Money::from_cents(35_000));
        assert_eq!(result.allocations.len(), 3);
        assert_eq!(result.unallocated.cents(), 5_000);
    }
}
