//! Monthly category budgets and the alerts raised against them.
//!
//! This module contains:
//! - The `Budget` model and its database functions
//! - The threshold evaluator that decides whether a new expense raises an alert
//! - Monthly budget progress for reports
//! - Route handlers for the budget API

mod alert;
mod core;
mod handlers;
mod status;

pub use alert::{AlertDecision, evaluate};
pub use core::{Budget, NewBudget, create_budget, create_budget_table, delete_budget, get_budgets};
pub use handlers::{create_budget_endpoint, delete_budget_endpoint, get_budgets_endpoint};
pub use status::{BudgetState, BudgetStatus, budget_statuses};
