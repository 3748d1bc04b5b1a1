use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    ApiMessage, AppState, Error,
    database_id::TransactionId,
    owner::OwnerId,
    transaction::core::{delete_all_transactions, delete_transaction},
};

/// The state needed to delete transactions.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTransactions {
    /// How many transactions were deleted.
    pub deleted: usize,
}

/// A route handler for deleting one of the owner's transactions.
///
/// Responds with 404 if the transaction does not exist or belongs to someone
/// else, and 400 if the ID is not an integer.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(raw_transaction_id): Path<String>,
) -> Result<Json<ApiMessage>, Error> {
    let transaction_id: TransactionId = raw_transaction_id
        .parse()
        .map_err(|_| Error::InvalidTransactionId(raw_transaction_id.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, &owner_id, &connection)?;

    Ok(Json(ApiMessage::new("Transaction deleted")))
}

/// A route handler for deleting every transaction of the owner.
pub async fn delete_all_transactions_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(owner_id): Extension<OwnerId>,
) -> Result<Json<DeletedTransactions>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let deleted = delete_all_transactions(&owner_id, &connection)?;
    tracing::info!("Deleted {deleted} transactions for owner {owner_id}");

    Ok(Json(DeletedTransactions { deleted }))
}
