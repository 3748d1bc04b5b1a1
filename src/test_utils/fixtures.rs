use time::OffsetDateTime;

use crate::{
    database_id::TransactionId,
    owner::OwnerId,
    transaction::{Transaction, TransactionKind},
};

/// An in-memory transaction for exercising the pure report and budget functions.
pub(crate) fn transaction_at(
    id: TransactionId,
    amount: f64,
    kind: TransactionKind,
    category: &str,
    occurred_at: OffsetDateTime,
) -> Transaction {
    Transaction {
        id,
        owner_id: OwnerId::new_unchecked("test-owner"),
        description: format!("Transaction {id}"),
        amount,
        kind,
        category: category.to_owned(),
        occurred_at,
        created_at: occurred_at,
        updated_at: occurred_at,
    }
}
