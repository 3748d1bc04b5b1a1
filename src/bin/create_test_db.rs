use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use finance_tracker::{
    NewBudget, NewTransaction, OwnerId, TransactionKind, create_budget, create_transaction,
    initialize_db,
};

/// A utility for creating a test database for the finance tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The owner token to create the sample data for.
    #[arg(long, default_value = "test-owner")]
    owner: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let owner_id = OwnerId::new(&args.owner)?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating budgets for owner {owner_id}...");
    for (category, limit) in [("Groceries", 400.0), ("Rent", 1600.0), ("Transport", 150.0)] {
        create_budget(NewBudget::new(owner_id.clone(), category, limit)?, &conn)?;
    }

    println!("Creating transactions...");
    let now = OffsetDateTime::now_utc();
    let sample_transactions = [
        ("Salary", 3200.0, TransactionKind::Income, None, 1),
        ("Rent", 1600.0, TransactionKind::Expense, Some("Rent"), 1),
        ("Supermarket", 182.4, TransactionKind::Expense, Some("Groceries"), 3),
        ("Bus pass", 60.0, TransactionKind::Expense, Some("Transport"), 4),
        ("Farmers market", 45.5, TransactionKind::Expense, Some("groceries"), 8),
        ("Cinema", 32.0, TransactionKind::Expense, None, 10),
        ("Salary", 3200.0, TransactionKind::Income, None, 31),
        ("Rent", 1600.0, TransactionKind::Expense, Some("Rent"), 31),
        ("Supermarket", 390.1, TransactionKind::Expense, Some("Groceries"), 35),
        ("Taxi", 48.0, TransactionKind::Expense, Some("Transport"), 40),
    ];

    for (description, amount, kind, category, days_ago) in sample_transactions {
        let occurred_at = now - Duration::days(days_ago);

        create_transaction(
            NewTransaction::build(owner_id.clone(), description, amount, kind, occurred_at)
                .category(category),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
