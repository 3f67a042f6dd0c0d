//! Basic usage example
//!
//! This example demonstrates the everyday operations:
//! - Connecting a handle through a `ConnectionBuilder`
//! - Creating tables and inserting rows with `insert`
//! - Querying with bound parameters
//! - Reading single rows with `queryone`
//! - Committing explicitly
//!
//! Run with: cargo run --example basic_usage

use rust_db_wrapper::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust DB Wrapper - Basic Usage Example ===\n");

    // The builder supplies the connection string when none is passed
    let credentials = ConnectionBuilder::new(DatabaseType::Sqlite).database(":memory:");
    let mut db = DatabaseHandle::new(SqliteDriver).with_credentials(credentials);

    // Connect to database
    println!("1. Connecting to database...");
    db.connect(None)?;
    println!("   ✓ Connected ({:?})\n", db.state());

    // Create table
    println!("2. Creating table...");
    db.query(
        "CREATE TABLE users (
            uid INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            balance REAL DEFAULT 0.0
        )",
        &[],
    )?;
    println!("   ✓ Table created\n");

    // Insert rows; column order follows the mapping
    println!("3. Inserting users...");
    let users = vec![
        (10, "Al Bert", "al@example.com", 1500.50),
        (11, "Bea Trice", "bea@example.com", 2300.75),
        (12, "Cy Rus", "cy@example.com", 980.25),
    ];
    for (uid, name, email, balance) in users {
        db.insert(
            "users",
            None,
            fields! { "uid" => uid, "name" => name, "email" => email, "balance" => balance },
        )?;
    }

    // Defaults shared by several inserts
    let guest = fields! { "name" => "guest", "email" => "guest@example.com" };
    for uid in 20..23 {
        db.insert("users", Some(&guest), fields! { "uid" => uid })?;
    }
    db.commit()?;
    println!("   ✓ Inserted and committed\n");

    // Query all users
    println!("4. Querying all users...");
    let mut rows = db.query("SELECT * FROM users ORDER BY uid", &[])?;
    println!("   Found {} users:", rows.row_count().unwrap_or(0));
    for row in rows.iter() {
        let row = row?;
        let balance = row.get_by_name("balance")?.as_double().unwrap_or(0.0);
        println!(
            "   - #{} {} <{}> balance ${:.2}",
            row["uid"], row["name"], row["email"], balance
        );
    }
    println!();

    // Query with a bound parameter
    println!("5. Querying users with balance > $1000...");
    for row in db.query(
        "SELECT name, balance FROM users WHERE balance > ? ORDER BY balance DESC",
        params![1000.0],
    )? {
        let row = row?;
        println!("   - {}: {}", row[0], row[1]);
    }
    println!();

    // Single row lookups
    println!("6. Looking up single rows...");
    match db.queryone("SELECT * FROM users WHERE name = ?", params!["Al Bert"])? {
        Some(user) => println!("   ✓ Al Bert has uid {}", user.get_by_name("uid")?),
        None => println!("   ✗ Al Bert not found"),
    }
    match db.queryone("SELECT * FROM users WHERE uid = ?", params![1010])? {
        Some(_) => println!("   ✗ uid 1010 unexpectedly present"),
        None => println!("   ✓ uid 1010 not present"),
    }
    if let Some(count) = db.queryone("SELECT COUNT(*) AS count FROM users", &[])? {
        println!("   Total users: {}\n", count["count"]);
    }

    // Disconnect
    println!("7. Disconnecting...");
    db.close()?;
    println!("   ✓ Disconnected ({:?})", db.state());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
