//! Calendar months and the reporting periods built from them.
//!
//! All months are evaluated in local civil time: a transaction belongs to a
//! month when its date in the configured timezone falls on any day of that
//! month.

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};
use time_tz::Tz;

use crate::{
    timezone::{local_date, local_today},
    transaction::Transaction,
};

/// A selectable reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    /// Every transaction ever recorded.
    #[default]
    All,
    /// The calendar month containing today.
    CurrentMonth,
    /// The calendar month before the current one.
    LastMonth,
}

impl Period {
    /// The calendar month this period covers relative to `today`, or `None` for [Period::All].
    pub fn month(self, today: Date) -> Option<CalendarMonth> {
        match self {
            Period::All => None,
            Period::CurrentMonth => Some(CalendarMonth::containing(today)),
            Period::LastMonth => Some(CalendarMonth::containing(today).previous()),
        }
    }
}

/// A month of a specific year, e.g. March 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarMonth {
    /// The calendar year.
    pub year: i32,
    /// The month of the year.
    pub month: Month,
}

impl CalendarMonth {
    /// Create a calendar month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The calendar month that `date` falls in.
    pub fn containing(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The calendar month before this one, rolling back across year boundaries.
    pub fn previous(self) -> Self {
        match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    /// Whether `date` falls on any day of this month.
    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Whether `transaction` happened during `month` in local time.
///
/// Transactions whose date cannot be represented in local time are never in the month.
pub(crate) fn occurred_in(transaction: &Transaction, month: CalendarMonth, timezone: &Tz) -> bool {
    local_date(transaction.occurred_at, timezone).is_some_and(|date| month.contains(date))
}

/// Select the transactions that happened during `period`, relative to `now`.
///
/// Calendar days are taken in `timezone`. [Period::All] returns every
/// transaction. The input is left untouched.
pub fn filter_by_period(
    transactions: &[Transaction],
    period: Period,
    now: OffsetDateTime,
    timezone: &Tz,
) -> Vec<Transaction> {
    let Some(month) = period.month(local_today(now, timezone)) else {
        return transactions.to_vec();
    };

    transactions
        .iter()
        .filter(|transaction| occurred_in(transaction, month, timezone))
        .cloned()
        .collect()
}
