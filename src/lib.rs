//! A personal finance tracker backend.
//!
//! Users record income and expense transactions, set monthly budgets per
//! category and view spending reports. Data is partitioned by an opaque owner
//! token sent by the client with every API request.
//!
//! This library provides a JSON REST API over a SQLite store together with the
//! pure computations behind it: period filtering and aggregation, budget
//! threshold alerts and report projections.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod budget;
mod category;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod not_found;
mod owner;
mod report;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use budget::{
    AlertDecision, Budget, BudgetState, BudgetStatus, NewBudget, budget_statuses, create_budget,
    evaluate,
};
pub use category::{DEFAULT_CATEGORY, category_key};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use owner::{OWNER_TOKEN_HEADER, OwnerId};
pub use report::{
    BalanceState, CalendarMonth, CategoryTotal, IncomeExpenseTotals, Period, Report, balance,
    expenses_by_category, filter_by_period, income_vs_expense_totals, spent_in_period,
};
pub use routing::build_router;
pub use timezone::get_timezone;
pub use transaction::{NewTransaction, Transaction, TransactionKind, create_transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The JSON body used for error responses and simple acknowledgements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable text for the client.
    pub message: String,
}

impl ApiMessage {
    /// Create a message body from any string-like value.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry an owner token, or the token was blank.
    #[error("the owner token is missing, set the \"{}\" header", OWNER_TOKEN_HEADER)]
    MissingOwnerToken,

    /// The request body could not be parsed as the expected JSON document.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// A response body could not be read back for logging.
    #[error("could not read the response body: {0}")]
    InvalidResponseBody(String),

    /// The query string could not be parsed, e.g. an unknown report period.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A required field was absent from the request body.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// A transaction description was empty or only whitespace.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// A transaction amount was zero, negative or not a finite number.
    #[error("the amount must be a number greater than zero")]
    InvalidAmount,

    /// A budget category was empty or only whitespace.
    #[error("the category cannot be empty")]
    EmptyCategory,

    /// A budget limit was zero, negative or not a finite number.
    #[error("the limit must be a number greater than zero")]
    InvalidLimit,

    /// The transaction date could not be parsed.
    ///
    /// Callers should pass in the date string that caused the error.
    #[error("could not parse the date \"{0}\", expected an RFC 3339 date-time or YYYY-MM-DD")]
    InvalidDate(String),

    /// The owner already has a budget for the category, compared case-insensitively.
    #[error("a budget for the category \"{0}\" already exists")]
    DuplicateBudget(String),

    /// The transaction ID in the request path is not a valid ID.
    #[error("\"{0}\" is not a valid transaction ID")]
    InvalidTransactionId(String),

    /// Tried to delete a transaction that does not exist for the owner.
    #[error("the transaction could not be found")]
    DeleteMissingTransaction,

    /// Tried to delete a budget that does not exist for the owner.
    #[error("no budget exists for the category \"{0}\"")]
    DeleteMissingBudget(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingOwnerToken
            | Error::InvalidRequestBody(_)
            | Error::InvalidQuery(_)
            | Error::MissingField(_)
            | Error::EmptyDescription
            | Error::InvalidAmount
            | Error::EmptyCategory
            | Error::InvalidLimit
            | Error::InvalidDate(_)
            | Error::DuplicateBudget(_)
            | Error::InvalidTransactionId(_) => StatusCode::BAD_REQUEST,
            Error::DeleteMissingTransaction | Error::DeleteMissingBudget(_) | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::InvalidResponseBody(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // Server-side errors are not intended to be shown to the client.
        let message = if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(ApiMessage { message })).into_response()
    }
}
