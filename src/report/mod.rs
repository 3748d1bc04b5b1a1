//! Period filtering, aggregation and the spending reports built on them.
//!
//! The functions here are pure: they take the owner's collections as
//! parameters and never touch the database. The route handlers load the
//! collections and pass them in.

mod aggregation;
mod handlers;
mod period;
mod projection;

pub use aggregation::{BalanceState, balance, spent_in_period};
pub use handlers::{
    BalanceResponse, get_balance_endpoint, get_budget_report_endpoint, get_report_endpoint,
};
pub use period::{CalendarMonth, Period, filter_by_period};
pub use projection::{
    CategoryTotal, IncomeExpenseTotals, Report, expenses_by_category, income_vs_expense_totals,
};

pub(crate) use period::occurred_in;
