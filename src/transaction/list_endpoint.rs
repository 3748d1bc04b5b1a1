use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    owner::OwnerId,
    transaction::{Transaction, core::get_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the owner's transactions, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(&owner_id, &connection).map(Json)
}
