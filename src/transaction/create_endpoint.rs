//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    AppState, Error,
    budget::{AlertDecision, evaluate, get_budgets},
    owner::OwnerId,
    report::{CalendarMonth, occurred_in},
    timezone::{local_timezone, local_today},
    transaction::{
        NewTransaction, Transaction, TransactionKind,
        core::{create_transaction, get_transactions, parse_occurred_at},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
///
/// Every field is optional at the parsing stage so that a missing field can be
/// reported by name.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// Text detailing the transaction.
    pub description: Option<String>,
    /// The magnitude of the transaction.
    pub amount: Option<f64>,
    /// Whether money was earned or spent.
    pub kind: Option<TransactionKind>,
    /// The category label, defaults to "Uncategorized".
    pub category: Option<String>,
    /// An RFC 3339 date-time or a `YYYY-MM-DD` date.
    pub occurred_at: Option<String>,
}

impl CreateTransactionRequest {
    fn into_new_transaction(
        self,
        owner_id: OwnerId,
        timezone: &Tz,
    ) -> Result<NewTransaction, Error> {
        let description = self.description.ok_or(Error::MissingField("description"))?;
        let amount = self.amount.ok_or(Error::MissingField("amount"))?;
        let kind = self.kind.ok_or(Error::MissingField("kind"))?;
        let occurred_at = self.occurred_at.ok_or(Error::MissingField("occurredAt"))?;
        let occurred_at = parse_occurred_at(&occurred_at, timezone)?;

        Ok(
            NewTransaction::build(owner_id, &description, amount, kind, occurred_at)
                .category(self.category.as_deref()),
        )
    }
}

/// The response body for a created transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTransaction {
    /// The stored transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Whether the transaction pushed its category over a budget threshold.
    pub budget_alert: AlertDecision,
}

/// A route handler for recording a new transaction.
///
/// Responds with 201 and the stored transaction. Expenses dated within the
/// current local month are checked against the budget for their category and
/// the resulting alert is included in the response. The alert check never
/// fails the request: the transaction is already stored by then, so errors
/// are logged and reported as no alert.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedTransaction>), Error> {
    let Json(request) = body.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;
    let timezone = local_timezone(&state.local_timezone)?;
    let new_transaction = request.into_new_transaction(owner_id.clone(), timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(new_transaction, &connection)
        .inspect_err(|error| tracing::debug!("could not create transaction: {error}"))?;

    let budget_alert = check_budget(&transaction, &owner_id, timezone, &connection)
        .unwrap_or_else(|error| {
            tracing::warn!("Could not check budget for transaction {}: {error}", transaction.id);
            AlertDecision::NoAlert
        });
    if let Some(message) = budget_alert.message() {
        tracing::info!("Budget alert for owner {owner_id}: {message}");
    }

    Ok((
        StatusCode::CREATED,
        Json(CreatedTransaction {
            transaction,
            budget_alert,
        }),
    ))
}

fn check_budget(
    transaction: &Transaction,
    owner_id: &OwnerId,
    timezone: &Tz,
    connection: &Connection,
) -> Result<AlertDecision, Error> {
    let now = OffsetDateTime::now_utc();
    let current_month = CalendarMonth::containing(local_today(now, timezone));

    if transaction.kind != TransactionKind::Expense
        || !occurred_in(transaction, current_month, timezone)
    {
        return Ok(AlertDecision::NoAlert);
    }

    let transactions = get_transactions(owner_id, connection)?;
    let budgets = get_budgets(owner_id, connection)?;

    Ok(evaluate(
        &transactions,
        &budgets,
        &transaction.category,
        transaction.amount,
        now,
        timezone,
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use time::OffsetDateTime;

    use crate::{
        ApiMessage, AppState, DEFAULT_CATEGORY, build_router,
        budget::AlertDecision,
        endpoints,
        test_utils::{OTHER_OWNER, TEST_OWNER, get_test_server, get_test_state},
        transaction::{CreatedTransaction, Transaction, TransactionKind},
    };

    fn today() -> String {
        OffsetDateTime::now_utc().date().to_string()
    }

    #[tokio::test]
    async fn creates_transaction() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .json(&json!({
                "description": "Weekly shop",
                "amount": 45.5,
                "kind": "expense",
                "category": "Groceries",
                "occurredAt": "2024-06-01",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created = response.json::<CreatedTransaction>();
        assert_eq!(created.transaction.description, "Weekly shop");
        assert_eq!(created.transaction.amount, 45.5);
        assert_eq!(created.transaction.kind, TransactionKind::Expense);
        assert_eq!(created.transaction.category, "Groceries");
        assert_eq!(created.transaction.owner_id.as_str(), TEST_OWNER);
        assert_eq!(created.budget_alert, AlertDecision::NoAlert);
    }

    #[tokio::test]
    async fn defaults_category() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .json(&json!({
                "description": "Pay",
                "amount": 1000,
                "kind": "income",
                "occurredAt": "2024-06-01T09:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created = response.json::<CreatedTransaction>();
        assert_eq!(created.transaction.category, DEFAULT_CATEGORY);
    }

    #[tokio::test]
    async fn rejects_invalid_amounts() {
        let server = get_test_server();

        for amount in [json!(0), json!(-3.5), json!("12")] {
            let response = server
                .post(endpoints::TRANSACTIONS_API)
                .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
                .json(&json!({
                    "description": "Coffee",
                    "amount": amount,
                    "kind": "expense",
                    "occurredAt": "2024-06-01",
                }))
                .await;

            response.assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn rejects_missing_fields_by_name() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .json(&json!({
                "description": "Coffee",
                "amount": 4.5,
                "kind": "expense",
            }))
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<ApiMessage>().message.contains("occurredAt"));
    }

    #[tokio::test]
    async fn rejects_unknown_kind_and_bad_dates() {
        let server = get_test_server();

        for (kind, occurred_at) in [("refund", "2024-06-01"), ("expense", "yesterday")] {
            let response = server
                .post(endpoints::TRANSACTIONS_API)
                .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
                .json(&json!({
                    "description": "Coffee",
                    "amount": 4.5,
                    "kind": kind,
                    "occurredAt": occurred_at,
                }))
                .await;

            response.assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn warns_then_exceeds_budget_this_month() {
        let server = get_test_server();
        server
            .post(endpoints::BUDGETS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .json(&json!({ "category": "Food", "limit": 100 }))
            .await
            .assert_status(StatusCode::CREATED);

        let mut alerts = Vec::new();
        for amount in [70.0, 15.0, 20.0] {
            let response = server
                .post(endpoints::TRANSACTIONS_API)
                .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
                .json(&json!({
                    "description": "Food",
                    "amount": amount,
                    "kind": "expense",
                    "category": "food",
                    "occurredAt": today(),
                }))
                .await;
            response.assert_status(StatusCode::CREATED);
            alerts.push(response.json::<CreatedTransaction>().budget_alert);
        }

        assert_eq!(alerts[0], AlertDecision::NoAlert);
        assert!(matches!(alerts[1], AlertDecision::Warning { .. }));
        assert!(matches!(alerts[2], AlertDecision::Exceeded { spent, .. } if spent == 105.0));
    }

    #[tokio::test]
    async fn other_owners_budgets_do_not_alert() {
        let server = get_test_server();
        server
            .post(endpoints::BUDGETS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, OTHER_OWNER)
            .json(&json!({ "category": "Food", "limit": 10 }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .json(&json!({
                "description": "Food",
                "amount": 50,
                "kind": "expense",
                "category": "Food",
                "occurredAt": today(),
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(
            response.json::<CreatedTransaction>().budget_alert,
            AlertDecision::NoAlert
        );
    }

    fn server_with_sql(state: AppState, sql: &str) -> TestServer {
        state
            .db_connection
            .lock()
            .unwrap()
            .execute_batch(sql)
            .unwrap();

        TestServer::try_new(build_router(state, None)).unwrap()
    }

    async fn create_food_expense(server: &TestServer) -> CreatedTransaction {
        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .json(&json!({
                "description": "Food",
                "amount": 50,
                "kind": "expense",
                "category": "Food",
                "occurredAt": today(),
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<CreatedTransaction>()
    }

    async fn stored_transactions(server: &TestServer) -> Vec<Transaction> {
        server
            .get(endpoints::TRANSACTIONS_API)
            .add_header(crate::OWNER_TOKEN_HEADER, TEST_OWNER)
            .await
            .json::<Vec<Transaction>>()
    }

    #[tokio::test]
    async fn unreadable_budget_row_does_not_fail_create() {
        let server = server_with_sql(
            get_test_state(),
            "INSERT INTO budget
                (owner_id, category, category_key, monthly_limit, created_at, updated_at)
             VALUES ('owner-a', 'Food', 'food', 10.0, 'not a date', 'not a date');",
        );

        let created = create_food_expense(&server).await;

        assert_eq!(created.budget_alert, AlertDecision::NoAlert);
        assert_eq!(stored_transactions(&server).await.len(), 1);
    }

    #[tokio::test]
    async fn failed_budget_check_still_responds_created() {
        let server = server_with_sql(get_test_state(), "DROP TABLE budget;");

        let created = create_food_expense(&server).await;

        assert_eq!(created.budget_alert, AlertDecision::NoAlert);
        let stored = stored_transactions(&server).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created.transaction.id);
    }
}
