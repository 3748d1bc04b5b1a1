//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for recording transactions
//! - Database functions for storing, querying and deleting transactions
//! - Route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, Transaction, TransactionKind, create_transaction, create_transaction_table,
    get_transactions,
};
pub use create_endpoint::{CreatedTransaction, create_transaction_endpoint};
pub use delete_endpoint::{
    DeletedTransactions, delete_all_transactions_endpoint, delete_transaction_endpoint,
};
pub use list_endpoint::get_transactions_endpoint;
