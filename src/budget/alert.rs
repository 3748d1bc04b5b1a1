//! Decides whether a new expense pushes a category over one of its budget thresholds.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    budget::Budget,
    category::same_category,
    report::{CalendarMonth, spent_in_period},
    timezone::local_today,
    transaction::Transaction,
};

/// Percent of the limit at which a warning is raised.
const WARNING_PERCENT: f64 = 80.0;
/// Percent of the limit at which the budget counts as exceeded.
const EXCEEDED_PERCENT: f64 = 100.0;

/// The outcome of evaluating a new expense against the budget of its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AlertDecision {
    /// No threshold was crossed, or the category has no usable budget.
    NoAlert,
    /// Monthly spending just reached 80% of the limit.
    Warning {
        /// The percent of the limit spent this month, including the new expense.
        percent: f64,
        /// The monthly limit.
        limit: f64,
        /// The category as given with the new expense.
        category: String,
    },
    /// Monthly spending just reached the limit.
    Exceeded {
        /// The monthly limit.
        limit: f64,
        /// The amount spent this month, including the new expense.
        spent: f64,
        /// The category as given with the new expense.
        category: String,
    },
}

impl AlertDecision {
    /// The notification text for the user, or `None` for [AlertDecision::NoAlert].
    pub fn message(&self) -> Option<String> {
        match self {
            AlertDecision::NoAlert => None,
            AlertDecision::Warning {
                percent,
                limit,
                category,
            } => Some(format!(
                "Heads up! You have spent {percent:.0}% of your {limit:.2} budget for \"{category}\"."
            )),
            AlertDecision::Exceeded {
                limit,
                spent,
                category,
            } => Some(format!(
                "Budget of {limit:.2} for \"{category}\" exceeded! {spent:.2} spent this month."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threshold {
    Warning,
    Exceeded,
}

/// The highest threshold crossed when moving from `before` to `after` percent of a limit.
///
/// A threshold is crossed when `before` is below it and `after` is at or above it.
fn crossed_threshold(before: f64, after: f64) -> Option<Threshold> {
    if after >= EXCEEDED_PERCENT && before < EXCEEDED_PERCENT {
        Some(Threshold::Exceeded)
    } else if after >= WARNING_PERCENT && before < WARNING_PERCENT {
        Some(Threshold::Warning)
    } else {
        None
    }
}

/// Evaluate a just-recorded expense of `new_amount` in `category` against its budget.
///
/// `transactions` must already include the new expense. Spending is summed
/// over the calendar month containing `now` in `timezone`.
///
/// Returns [AlertDecision::NoAlert] if no budget matches `category` (ignoring
/// case) or the budget limit is not a positive number.
pub fn evaluate(
    transactions: &[Transaction],
    budgets: &[Budget],
    category: &str,
    new_amount: f64,
    now: OffsetDateTime,
    timezone: &Tz,
) -> AlertDecision {
    let Some(budget) = budgets
        .iter()
        .find(|budget| same_category(&budget.category, category))
    else {
        return AlertDecision::NoAlert;
    };

    let limit = budget.limit;
    if !limit.is_finite() || limit <= 0.0 {
        return AlertDecision::NoAlert;
    }

    let month = CalendarMonth::containing(local_today(now, timezone));
    let spent = spent_in_period(transactions, category, month, timezone);
    let spent_before = spent - new_amount;

    let percent = spent / limit * 100.0;
    let percent_before = spent_before / limit * 100.0;

    match crossed_threshold(percent_before, percent) {
        Some(Threshold::Exceeded) => AlertDecision::Exceeded {
            limit,
            spent,
            category: category.to_owned(),
        },
        Some(Threshold::Warning) => AlertDecision::Warning {
            percent,
            limit,
            category: category.to_owned(),
        },
        None => AlertDecision::NoAlert,
    }
}

#[cfg(test)]
mod crossed_threshold_tests {
    use crate::budget::alert::{Threshold, crossed_threshold};

    #[test]
    fn crossing_eighty_is_a_warning() {
        assert_eq!(crossed_threshold(70.0, 80.0), Some(Threshold::Warning));
        assert_eq!(crossed_threshold(79.9, 95.0), Some(Threshold::Warning));
    }

    #[test]
    fn crossing_one_hundred_is_exceeded() {
        assert_eq!(crossed_threshold(85.0, 100.0), Some(Threshold::Exceeded));
    }

    #[test]
    fn jumping_past_both_thresholds_is_only_exceeded() {
        assert_eq!(crossed_threshold(10.0, 150.0), Some(Threshold::Exceeded));
    }

    #[test]
    fn staying_on_one_side_is_no_crossing() {
        assert_eq!(crossed_threshold(10.0, 79.9), None);
        assert_eq!(crossed_threshold(80.0, 90.0), None);
        assert_eq!(crossed_threshold(120.0, 130.0), None);
    }
}
