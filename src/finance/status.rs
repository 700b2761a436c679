//! Status derivation for debts, installments and grants

use chrono::NaiveDate;

use crate::models::{GrantStatus, Money, PaymentStatus};

/// Stored status from the amount due and the amount paid
pub fn derive(due: Money, paid: Money) -> PaymentStatus {
    if paid >= due {
        PaymentStatus::Paid
    } else if paid.is_positive() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Status as seen on `today`: anything unpaid past its due date is overdue
pub fn effective(status: PaymentStatus, due_date: NaiveDate, today: NaiveDate) -> PaymentStatus {
    if status != PaymentStatus::Paid && due_date < today {
        PaymentStatus::Overdue
    } else {
        status
    }
}

pub fn grant(amount: Money, received: Money) -> GrantStatus {
    match derive(amount, received) {
        PaymentStatus::Paid => GrantStatus::Received,
        PaymentStatus::Partial => GrantStatus::Partial,
        _ => GrantStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10_000, 0, PaymentStatus::Pending)]
    #[case(10_000, 1, PaymentStatus::Partial)]
    #[case(10_000, 9_999, PaymentStatus::Partial)]
    #[case(10_000, 10_000, PaymentStatus::Paid)]
    fn test_derive(#[case] due: i64, #[case] paid: i64, #[case] expected: PaymentStatus) {
        assert_eq!(derive(Money::from_cents(due), Money::from_cents(paid)), expected);
    }

    #[test]
    fn test_effective_marks_overdue_only_when_open() {
        let due = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        assert_eq!(effective(PaymentStatus::Partial, due, today), PaymentStatus::Overdue);
        assert_eq!(effective(PaymentStatus::Paid, due, today), PaymentStatus::Paid);
        assert_eq!(effective(PaymentStatus::Pending, due, due), PaymentStatus::Pending);
    }

    #[test]
    fn test_grant_status() {
        let amount = Money::from_cents(50_000);
        assert_eq!(grant(amount, Money::zero()), GrantStatus::Pending);
        assert_eq!(grant(amount, Money::from_cents(100)), GrantStatus::Partial);
        assert_eq!(grant(amount, amount), GrantStatus::Received);
    }
}
