//! Defines the budget model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{CategoryName, category_key},
    database_id::BudgetId,
    owner::OwnerId,
};

/// A monthly spending ceiling for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that set the budget.
    pub owner_id: OwnerId,
    /// The category label the budget applies to.
    pub category: String,
    /// The most that should be spent in the category per calendar month.
    pub limit: f64,
    /// When the budget was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the budget was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated budget that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The user setting the budget.
    pub owner_id: OwnerId,
    /// The category the budget applies to.
    pub category: CategoryName,
    /// The monthly ceiling, always positive.
    pub limit: f64,
}

impl NewBudget {
    /// Validate the parts of a new budget.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyCategory] if `category` is blank,
    /// - or [Error::InvalidLimit] if `limit` is not a positive, finite number.
    pub fn new(owner_id: OwnerId, category: &str, limit: f64) -> Result<Self, Error> {
        let category = CategoryName::new(category)?;

        if !limit.is_finite() || limit <= 0.0 {
            return Err(Error::InvalidLimit);
        }

        Ok(Self {
            owner_id,
            category,
            limit,
        })
    }
}

/// Create a budget in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the owner already has a budget for the category, ignoring case,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(
            "INSERT INTO budget (owner_id, category, category_key, monthly_limit, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, owner_id, category, monthly_limit, created_at, updated_at",
        )?
        .query_row(
            (
                new_budget.owner_id.as_str(),
                new_budget.category.as_ref(),
                new_budget.category.key(),
                new_budget.limit,
                now,
                now,
            ),
            map_budget_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateBudget(new_budget.category.to_string())
            }
            error => error.into(),
        })
}

/// Retrieve all budgets for `owner_id` ordered alphabetically by category, ignoring case.
///
/// Unreadable rows are logged and skipped.
///
/// # Errors
/// This function will return a [Error::SqlError] if the query itself fails.
pub fn get_budgets(owner_id: &OwnerId, connection: &Connection) -> Result<Vec<Budget>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, owner_id, category, monthly_limit, created_at, updated_at
         FROM budget WHERE owner_id = ?1
         ORDER BY category_key ASC, category ASC",
    )?;

    let rows = statement.query_map((owner_id.as_str(),), map_budget_row)?;

    let mut budgets = Vec::new();
    for row in rows {
        match row {
            Ok(budget) => budgets.push(budget),
            Err(error) => tracing::warn!("Skipping unreadable budget row: {error}"),
        }
    }

    Ok(budgets)
}

/// Delete the budget of `owner_id` for `category`, matching the category case-insensitively.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if the owner has no budget for the category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(
    owner_id: &OwnerId,
    category: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE owner_id = ?1 AND category_key = ?2",
        (owner_id.as_str(), category_key(category)),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget(category.to_owned()));
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// The unique index over the owner and canonical category key enforces one
/// budget per category per owner.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            owner_id TEXT NOT NULL,
            category TEXT NOT NULL,
            category_key TEXT NOT NULL,
            monthly_limit REAL NOT NULL CHECK (monthly_limit > 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_budget_owner_category
            ON budget(owner_id, category_key);",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_owner_id: String = row.get(1)?;
    let category = row.get(2)?;
    let limit = row.get(3)?;
    let created_at = row.get(4)?;
    let updated_at = row.get(5)?;

    Ok(Budget {
        id,
        owner_id: OwnerId::new_unchecked(&raw_owner_id),
        category,
        limit,
        created_at,
        updated_at,
    })
}


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        budget::{NewBudget, create_budget, delete_budget, get_budgets},
        db::initialize,
        owner::OwnerId,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_budget(owner: &str, category: &str, limit: f64) -> NewBudget {
        NewBudget::new(OwnerId::new_unchecked(owner), category, limit).unwrap()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let budget = create_budget(new_budget("alice", "Food", 100.0), &conn).unwrap();

        assert_eq!(budget.category, "Food");
        assert_eq!(budget.limit, 100.0);
        assert_eq!(budget.owner_id, OwnerId::new_unchecked("alice"));
    }

    #[test]
    fn create_fails_on_duplicate_category_ignoring_case() {
        let conn = get_test_connection();
        create_budget(new_budget("alice", "Food", 100.0), &conn).unwrap();

        let result = create_budget(new_budget("alice", "FOOD", 50.0), &conn);

        assert_eq!(result, Err(Error::DuplicateBudget("FOOD".to_owned())));
    }

    #[test]
    fn same_category_is_allowed_for_different_owners() {
        let conn = get_test_connection();
        create_budget(new_budget("alice", "Food", 100.0), &conn).unwrap();

        let result = create_budget(new_budget("bob", "food", 50.0), &conn);

        assert!(result.is_ok());
    }

    #[test]
    fn get_budgets_sorts_by_category() {
        let conn = get_test_connection();
        for category in ["rent", "Food", "Transport"] {
            create_budget(new_budget("alice", category, 10.0), &conn).unwrap();
        }
        create_budget(new_budget("bob", "Books", 10.0), &conn).unwrap();

        let categories: Vec<String> = get_budgets(&OwnerId::new_unchecked("alice"), &conn)
            .unwrap()
            .into_iter()
            .map(|budget| budget.category)
            .collect();

        assert_eq!(categories, vec!["Food", "rent", "Transport"]);
    }

    #[test]
    fn get_budgets_skips_unreadable_rows() {
        let conn = get_test_connection();
        let alice = OwnerId::new_unchecked("alice");
        create_budget(new_budget("alice", "Food", 100.0), &conn).unwrap();
        conn.execute(
            "INSERT INTO budget
                (owner_id, category, category_key, monthly_limit, created_at, updated_at)
             VALUES ('alice', 'Rent', 'rent', 900.0, 'not a date', 'not a date')",
            (),
        )
        .unwrap();

        let budgets = get_budgets(&alice, &conn).unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].category, "Food");
    }

    #[test]
    fn delete_matches_category_ignoring_case() {
        let conn = get_test_connection();
        let alice = OwnerId::new_unchecked("alice");
        create_budget(new_budget("alice", "Food", 100.0), &conn).unwrap();

        assert_eq!(delete_budget(&alice, "fOOD", &conn), Ok(()));
        assert!(get_budgets(&alice, &conn).unwrap().is_empty());
    }

    #[test]
    fn delete_fails_for_missing_or_foreign_budget() {
        let conn = get_test_connection();
        create_budget(new_budget("alice", "Food", 100.0), &conn).unwrap();

        let result = delete_budget(&OwnerId::new_unchecked("bob"), "Food", &conn);

        assert_eq!(result, Err(Error::DeleteMissingBudget("Food".to_owned())));
    }
}
