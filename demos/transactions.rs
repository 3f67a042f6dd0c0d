//! Transaction example
//!
//! Every statement runs inside a transaction that stays open until the
//! caller commits or rolls back. This example demonstrates:
//! - Committing a successful unit of work
//! - Rolling back when a step fails
//! - Several operations grouped in one transaction
//! - Uncommitted work being discarded when the connection closes
//!
//! Run with: cargo run --example transactions

use rust_db_wrapper::prelude::*;

type Db = DatabaseHandle<SqliteDriver>;

/// Reasons a transfer is abandoned
#[derive(Debug, thiserror::Error)]
enum TransferError {
    #[error("insufficient funds or invalid account {0}")]
    InsufficientFunds(i32),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

fn main() -> Result<()> {
    println!("=== Rust DB Wrapper - Transaction Example ===\n");

    let mut db = DatabaseHandle::new(SqliteDriver);
    db.connect(Some(":memory:"))?;

    // Create accounts table
    println!("1. Setting up accounts table...");
    db.query(
        "CREATE TABLE accounts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            balance REAL NOT NULL CHECK(balance >= 0)
        )",
        &[],
    )?;
    for (id, name, balance) in [(1, "Alice", 1000.0), (2, "Bob", 500.0), (3, "Charlie", 750.0)] {
        db.insert(
            "accounts",
            None,
            fields! { "id" => id, "name" => name, "balance" => balance },
        )?;
    }
    db.commit()?;
    println!("   ✓ Accounts created\n");

    print_balances(&mut db)?;

    // Example 1: Successful transaction
    println!("\n2. Example 1: Successful transaction (Alice -> Bob: $100)");
    let outcome = transfer(&mut db, 1, 2, 100.0);
    settle(&mut db, outcome)?;
    print_balances(&mut db)?;

    // Example 2: Failed transaction
    println!("\n3. Example 2: Failed transaction (Bob -> Alice: $1000, insufficient funds)");
    let outcome = transfer(&mut db, 2, 1, 1000.0);
    settle(&mut db, outcome)?;
    print_balances(&mut db)?;

    // Example 3: Multiple operations in one transaction
    println!("\n4. Example 3: Multiple operations in one transaction");
    let operations = [
        ("Alice", "Bob", 50.0),
        ("Bob", "Charlie", 100.0),
        ("Charlie", "Alice", 25.0),
    ];
    let outcome = operations.iter().try_for_each(|(from, to, amount)| {
        println!("   - Transferring ${:.2} from {} to {}", amount, from, to);
        let from_id = account_id(&mut db, from)?;
        let to_id = account_id(&mut db, to)?;
        transfer(&mut db, from_id, to_id, *amount)
    });
    settle(&mut db, outcome)?;
    print_balances(&mut db)?;

    // Example 4: Uncommitted work is lost on close
    println!("\n5. Example 4: Closing with uncommitted work");
    let path = std::env::temp_dir().join("rust_db_wrapper_transactions.db");
    let path = path.to_string_lossy().into_owned();
    let _ = std::fs::remove_file(&path);

    let mut file_db = DatabaseHandle::new(SqliteDriver);
    file_db.connect(Some(path.as_str()))?;
    file_db.query("CREATE TABLE audit (note TEXT)", &[])?;
    file_db.commit()?;
    file_db.insert("audit", None, fields! { "note" => "never committed" })?;
    file_db.close()?;
    println!("   Closed with one uncommitted audit row");

    // the next query reopens the connection
    let count = file_db
        .queryone("SELECT COUNT(*) FROM audit", &[])?
        .map(|row| row[0].clone());
    println!("   ✓ Audit rows after reopening: {:?}", count);
    file_db.close()?;
    let _ = std::fs::remove_file(&path);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}

/// Commit when `outcome` succeeded, roll back otherwise
fn settle(db: &mut Db, outcome: std::result::Result<(), TransferError>) -> Result<()> {
    match outcome {
        Ok(()) => {
            db.commit()?;
            println!("   ✓ Transaction committed");
        }
        Err(e) => {
            db.rollback()?;
            println!("   ✗ Transaction rolled back: {}", e);
        }
    }
    Ok(())
}

/// Transfer money between accounts
fn transfer(
    db: &mut Db,
    from_id: i32,
    to_id: i32,
    amount: f64,
) -> std::result::Result<(), TransferError> {
    let withdrawn = db
        .query(
            "UPDATE accounts SET balance = balance - ? WHERE id = ? AND balance >= ?",
            params![amount, from_id, amount],
        )?
        .row_count();

    if withdrawn != Some(1) {
        return Err(TransferError::InsufficientFunds(from_id));
    }

    db.query(
        "UPDATE accounts SET balance = balance + ? WHERE id = ?",
        params![amount, to_id],
    )?;
    Ok(())
}

/// Get account ID by name
fn account_id(db: &mut Db, name: &str) -> std::result::Result<i32, TransferError> {
    let row = db
        .queryone("SELECT id FROM accounts WHERE name = ?", params![name])?
        .ok_or_else(|| TransferError::AccountNotFound(name.to_string()))?;
    let id = row
        .get_by_name("id")?
        .as_long()
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| DatabaseError::type_mismatch("integer", row["id"].type_name()))?;
    Ok(id)
}

/// Print all account balances
fn print_balances(db: &mut Db) -> Result<()> {
    println!("   Current balances:");
    for row in db.query("SELECT name, balance FROM accounts ORDER BY id", &[])? {
        let row = row?;
        let balance = row
            .get_by_name("balance")?
            .as_double()
            .ok_or_else(|| DatabaseError::type_mismatch("double", row["balance"].type_name()))?;
        println!("   - {}: ${:.2}", row["name"], balance);
    }
    Ok(())
}
