//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};
use time_tz::Tz;

use crate::{
    Error, category::CategoryName, database_id::TransactionId, owner::OwnerId,
    timezone::local_midnight,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database and used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction kind \"{other}\"")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always positive, the direction of the money is given by [TransactionKind].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub owner_id: OwnerId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The category label, e.g. "Groceries".
    pub category: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The data needed to record a new transaction.
///
/// Create one with [NewTransaction::build] and store it with [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user recording the transaction.
    pub owner_id: OwnerId,
    /// A human-readable description, must not be blank.
    pub description: String,
    /// The magnitude of the transaction, must be positive.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The category label, defaults to [crate::DEFAULT_CATEGORY].
    pub category: CategoryName,
    /// When the transaction happened.
    pub occurred_at: OffsetDateTime,
}

impl NewTransaction {
    /// Start a new transaction in the default category.
    pub fn build(
        owner_id: OwnerId,
        description: &str,
        amount: f64,
        kind: TransactionKind,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            owner_id,
            description: description.to_owned(),
            amount,
            kind,
            category: CategoryName::or_default(None),
            occurred_at,
        }
    }

    /// Set the category, falling back to the default category when `category` is absent or blank.
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = CategoryName::or_default(category);
        self
    }
}

/// Parse the date of a transaction.
///
/// Accepts an RFC 3339 date-time, or a plain `YYYY-MM-DD` date which is
/// taken as local midnight in `timezone`.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` is neither format.
pub fn parse_occurred_at(raw: &str, timezone: &Tz) -> Result<OffsetDateTime, Error> {
    let raw = raw.trim();

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(date_time);
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|date| local_midnight(date, timezone))
        .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// Timestamps are stored in UTC.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDescription] if the description is blank,
/// - or [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let description = new_transaction.description.trim();
    if description.is_empty() {
        return Err(Error::EmptyDescription);
    }

    if !new_transaction.amount.is_finite() || new_transaction.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let occurred_at = new_transaction
        .occurred_at
        .checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| Error::InvalidDate(new_transaction.occurred_at.to_string()))?;
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (owner_id, description, amount, kind, category, occurred_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, owner_id, description, amount, kind, category, occurred_at, created_at, updated_at",
        )?
        .query_row(
            (
                new_transaction.owner_id.as_str(),
                description,
                new_transaction.amount,
                new_transaction.kind,
                new_transaction.category.as_ref(),
                occurred_at,
                now,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `owner_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of this owner,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(
    id: TransactionId,
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, owner_id, description, amount, kind, category, occurred_at, created_at, updated_at
             FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner_id.as_str()), map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions for `owner_id`, newest first.
///
/// Rows that cannot be read (e.g., a corrupted date) are logged and skipped
/// so that one bad record does not hide the rest of the collection.
///
/// # Errors
/// This function will return a [Error::SqlError] if the query itself fails.
pub fn get_transactions(
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, owner_id, description, amount, kind, category, occurred_at, created_at, updated_at
         FROM \"transaction\" WHERE owner_id = ?1
         ORDER BY occurred_at DESC, id DESC",
    )?;

    let rows = statement.query_map((owner_id.as_str(),), map_transaction_row)?;

    let mut transactions = Vec::new();
    for row in rows {
        match row {
            Ok(transaction) => transactions.push(transaction),
            Err(error) => tracing::warn!("Skipping unreadable transaction row: {error}"),
        }
    }

    Ok(transactions)
}

/// Delete the transaction `id` owned by `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if no transaction with `id` exists for this owner,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        (id, owner_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Delete every transaction owned by `owner_id`, returning how many were deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_all_transactions(
    owner_id: &OwnerId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE owner_id = ?1",
            (owner_id.as_str(),),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            category TEXT NOT NULL,
            occurred_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_owner_occurred_at
            ON \"transaction\"(owner_id, occurred_at);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_owner_id: String = row.get(1)?;
    let description = row.get(2)?;
    let amount = row.get(3)?;
    let kind = row.get(4)?;
    let category = row.get(5)?;
    let occurred_at = row.get(6)?;
    let created_at = row.get(7)?;
    let updated_at = row.get(8)?;

    Ok(Transaction {
        id,
        owner_id: OwnerId::new_unchecked(&raw_owner_id),
        description,
        amount,
        kind,
        category,
        occurred_at,
        created_at,
        updated_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
