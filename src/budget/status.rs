//! Progress of each budget through the current month.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    budget::Budget,
    report::{CalendarMonth, spent_in_period},
    timezone::local_today,
    transaction::Transaction,
};

/// How close a budget is to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetState {
    /// Less than 80% of the limit has been spent.
    Ok,
    /// At least 80% of the limit has been spent.
    Warning,
    /// More than the limit has been spent.
    Over,
}

impl BudgetState {
    fn of(percent_spent: f64) -> Self {
        if percent_spent > 100.0 {
            Self::Over
        } else if percent_spent >= 80.0 {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

/// A budget alongside what has been spent against it this month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// The budget's category label.
    pub category: String,
    /// The monthly limit.
    pub limit: f64,
    /// The amount spent in the category this month.
    pub spent: f64,
    /// The limit minus the amount spent, negative once over budget.
    pub remaining: f64,
    /// The amount spent as a percent of the limit, 0 if the limit is not positive.
    pub percent_spent: f64,
    /// The display state derived from `percent_spent`.
    pub state: BudgetState,
}

/// Compute the status of every budget for the calendar month containing `now` in `timezone`.
///
/// The output keeps the order of `budgets`.
pub fn budget_statuses(
    transactions: &[Transaction],
    budgets: &[Budget],
    now: OffsetDateTime,
    timezone: &Tz,
) -> Vec<BudgetStatus> {
    let month = CalendarMonth::containing(local_today(now, timezone));

    budgets
        .iter()
        .map(|budget| {
            let spent = spent_in_period(transactions, &budget.category, month, timezone);
            let percent_spent = if budget.limit > 0.0 {
                spent / budget.limit * 100.0
            } else {
                0.0
            };

            BudgetStatus {
                category: budget.category.clone(),
                limit: budget.limit,
                spent,
                remaining: budget.limit - spent,
                percent_spent,
                state: BudgetState::of(percent_spent),
            }
        })
        .collect()
}
