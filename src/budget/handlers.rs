//! Route handlers for listing, creating and deleting budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    ApiMessage, AppState, Error,
    budget::{Budget, NewBudget, create_budget, delete_budget, get_budgets},
    owner::OwnerId,
};

/// The state needed to manage budgets.
#[derive(Debug, Clone)]
pub struct BudgetsState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a budget.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateBudgetRequest {
    /// The category the budget applies to.
    pub category: Option<String>,
    /// The monthly limit.
    pub limit: Option<f64>,
}

/// A route handler that lists the owner's budgets sorted by category.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetsState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_budgets(&owner_id, &connection).map(Json)
}

/// A route handler for creating a budget, responds with 201 and the stored budget.
///
/// Responds with 400 if the owner already has a budget for the category, ignoring case.
pub async fn create_budget_endpoint(
    State(state): State<BudgetsState>,
    Extension(owner_id): Extension<OwnerId>,
    body: Result<Json<CreateBudgetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let Json(request) = body.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;
    let category = request.category.ok_or(Error::MissingField("category"))?;
    let limit = request.limit.ok_or(Error::MissingField("limit"))?;
    let new_budget = NewBudget::new(owner_id, &category, limit)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = create_budget(new_budget, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// A route handler for deleting the owner's budget for a category, ignoring case.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetsState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(category): Path<String>,
) -> Result<Json<ApiMessage>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_budget(&owner_id, &category, &connection)?;

    Ok(Json(ApiMessage::new(format!(
        "Budget for \"{category}\" deleted"
    ))))
}
