//! Sums over collections of transactions.

use serde::{Deserialize, Serialize};
use time_tz::Tz;

use crate::{
    category::same_category,
    report::period::{CalendarMonth, occurred_in},
    transaction::{Transaction, TransactionKind},
};

/// The amount of a transaction, or zero if the stored amount is not a finite number.
pub(crate) fn finite_amount(transaction: &Transaction) -> f64 {
    if transaction.amount.is_finite() {
        transaction.amount
    } else {
        0.0
    }
}

/// The signed effect of a transaction on the balance.
fn contribution(transaction: &Transaction) -> f64 {
    match transaction.kind {
        TransactionKind::Income => finite_amount(transaction),
        TransactionKind::Expense => -finite_amount(transaction),
    }
}

/// Total income minus total expenses.
pub fn balance(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(contribution).sum()
}

/// How a balance should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceState {
    /// More was earned than spent.
    Positive,
    /// More was spent than earned.
    Negative,
    /// Earnings and spending cancel out.
    Zero,
}

impl BalanceState {
    /// The display state for `balance`.
    pub fn of(balance: f64) -> Self {
        if balance > 0.0 {
            Self::Positive
        } else if balance < 0.0 {
            Self::Negative
        } else {
            Self::Zero
        }
    }
}

/// The total spent on `category` during `month`.
///
/// Categories are matched ignoring case and surrounding whitespace. A
/// transaction counts towards the month when its date in `timezone` falls
/// within it. Income is ignored.
pub fn spent_in_period(
    transactions: &[Transaction],
    category: &str,
    month: CalendarMonth,
    timezone: &Tz,
) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .filter(|transaction| same_category(&transaction.category, category))
        .filter(|transaction| occurred_in(transaction, month, timezone))
        .map(finite_amount)
        .sum()
}


#[cfg(test)]
mod spent_in_period_tests {
    use time::{Month, OffsetDateTime, macros::datetime};
    use time_tz::Tz;

    use crate::{
        report::{CalendarMonth, spent_in_period},
        test_utils::transaction_at,
        timezone::get_timezone,
        transaction::{Transaction, TransactionKind},
    };

    const MARCH: CalendarMonth = CalendarMonth {
        year: 2025,
        month: Month::March,
    };

    fn expense(id: i64, amount: f64, category: &str, occurred_at: OffsetDateTime) -> Transaction {
        transaction_at(id, amount, TransactionKind::Expense, category, occurred_at)
    }

    fn utc() -> &'static Tz {
        get_timezone("Etc/UTC").unwrap()
    }

    #[test]
    fn sums_matching_expenses_in_month() {
        let transactions = vec![
            expense(1, 20.0, "Food", datetime!(2025-03-01 00:00 UTC)),
            expense(2, 30.0, "food", datetime!(2025-03-31 23:59 UTC)),
            expense(3, 40.0, "Rent", datetime!(2025-03-10 00:00 UTC)),
            transaction_at(
                4,
                50.0,
                TransactionKind::Income,
                "Food",
                datetime!(2025-03-10 00:00 UTC),
            ),
            expense(5, 60.0, "Food", datetime!(2025-04-01 00:00 UTC)),
        ];

        let spent = spent_in_period(&transactions, "FOOD", MARCH, utc());

        assert_eq!(spent, 50.0);
    }

    #[test]
    fn uses_local_month_boundaries() {
        // 2025-02-28 12:00 UTC is already March 1st in Auckland (+13:00).
        let transactions = vec![expense(1, 20.0, "Food", datetime!(2025-02-28 12:00 UTC))];
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        assert_eq!(spent_in_period(&transactions, "Food", MARCH, auckland), 20.0);
        assert_eq!(spent_in_period(&transactions, "Food", MARCH, utc()), 0.0);
    }

    #[test]
    fn no_matches_is_zero() {
        assert_eq!(spent_in_period(&[], "Food", MARCH, utc()), 0.0);
    }
}
