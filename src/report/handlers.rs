//! Route handlers for the balance and report endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    budget::{BudgetStatus, budget_statuses, get_budgets},
    owner::OwnerId,
    report::{BalanceState, Period, Report, balance, filter_by_period},
    timezone::local_timezone,
    transaction::{Transaction, get_transactions},
};

/// The state needed to compute reports.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the reports endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    /// The period to report on, defaults to [Period::All].
    #[serde(default)]
    pub period: Period,
}

/// The response body of the balance endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Total income minus total expenses.
    pub balance: f64,
    /// Whether the balance is positive, negative or zero.
    pub state: BalanceState,
}

impl ReportState {
    fn load_transactions(&self, owner_id: &OwnerId) -> Result<Vec<Transaction>, Error> {
        let connection = self
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(owner_id, &connection)
    }
}

/// A route handler for the owner's overall balance.
pub async fn get_balance_endpoint(
    State(state): State<ReportState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Result<Json<BalanceResponse>, Error> {
    let transactions = state.load_transactions(&owner_id)?;
    let balance = balance(&transactions);

    Ok(Json(BalanceResponse {
        balance,
        state: BalanceState::of(balance),
    }))
}

/// A route handler for the spending report over the period in the query string.
///
/// Responds with 400 if the period is not one of `all`, `currentMonth` or `lastMonth`.
pub async fn get_report_endpoint(
    State(state): State<ReportState>,
    Extension(owner_id): Extension<OwnerId>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Report>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;
    let timezone = local_timezone(&state.local_timezone)?;

    let transactions = state.load_transactions(&owner_id)?;
    let transactions =
        filter_by_period(&transactions, query.period, OffsetDateTime::now_utc(), timezone);

    Ok(Json(Report::build(query.period, &transactions)))
}

/// A route handler for how far through each budget the owner is this month.
pub async fn get_budget_report_endpoint(
    State(state): State<ReportState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Result<Json<Vec<BudgetStatus>>, Error> {
    let timezone = local_timezone(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transactions = get_transactions(&owner_id, &connection)?;
    let budgets = get_budgets(&owner_id, &connection)?;

    Ok(Json(budget_statuses(&transactions, &budgets, OffsetDateTime::now_utc(), timezone)))
}
