//! Row and cursor access example
//!
//! This example demonstrates the ways a result can be read:
//! - Rows by position, by name and by attribute
//! - Shadowed columns reached through a trailing underscore
//! - Forward-only cursor indexing, including negative indices
//! - Serializing rows with serde
//! - The process-wide default handle
//!
//! Run with: cargo run --example row_access

use rust_db_wrapper::prelude::*;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Rust DB Wrapper - Row Access Example ===\n");

    let mut db = DatabaseHandle::new(SqliteDriver);
    db.connect(Some(":memory:"))?;

    // `keys` collides with a row accessor
    db.query(
        "CREATE TABLE tokens (name TEXT, keys INTEGER, value INTEGER)",
        &[],
    )?;
    for i in 0..10 {
        db.insert(
            "tokens",
            None,
            fields! { "name" => format!("token-{}", i), "keys" => i % 3, "value" => i * 10 },
        )?;
    }
    db.commit()?;

    // 1. One row, three ways
    println!("1. Reading one row...");
    let row = db
        .queryone("SELECT * FROM tokens WHERE value = ?", params![30])?
        .ok_or("token-3 missing")?;
    println!("   by position:  {}", row.get_by_position(0)?);
    println!("   last column:  {}", row.get_by_position(-1)?);
    println!("   by name:      {}", row.get_by_name("name")?);
    println!("   by index:     {}", row["value"]);
    if let Some(value) = row.get_by_attribute("value")?.as_column() {
        println!("   by attribute: {}", value);
    }
    println!();

    // 2. Accessors win over columns of the same name
    println!("2. Accessors and shadowed columns...");
    println!("   keys  -> {:?}", row.get_by_attribute("keys")?);
    println!("   keys_ -> {:?}", row.get_by_attribute("keys_")?);
    println!("   len   -> {:?}", row.get_by_attribute("len")?);
    for (name, value) in row.items() {
        println!("   {} = {}", name, value);
    }
    println!();

    // 3. Cursor indexing
    println!("3. Indexing a cursor...");
    let mut rows = db.query("SELECT name, value FROM tokens ORDER BY value", &[])?;
    println!("   rows reported: {:?}", rows.row_count());
    println!("   rows[0]  = {}", rows.get(0)?["name"]);
    println!("   rows[0]  = {} (cached)", rows.get(0)?["name"]);
    println!("   rows[2]  = {}", rows.get(2)?["name"]);
    match rows.get(1) {
        Err(e) => println!("   rows[1]  -> {}", e),
        Ok(row) => println!("   rows[1]  = {} (unexpected)", row["name"]),
    }
    println!("   rows[-3] = {}", rows.get(-3)?["name"]);
    let rest = rows.iter().collect::<Result<Vec<_>>>()?;
    println!("   remaining after iteration: {}", rest.len());
    rows.close()?;
    println!();

    // 4. Serialization
    println!("4. Serializing a row...");
    let json = serde_json::to_string(&row)?;
    println!("   {}\n", json);

    // 5. Default handle
    println!("5. Using the default handle...");
    {
        let mut shared = rust_db_wrapper::default_handle();
        shared.connect(Some(":memory:"))?;
        let answer = shared
            .queryone("SELECT 6 * 7 AS answer", &[])?
            .map(|row| row["answer"].clone());
        println!("   answer: {:?}", answer);
        shared.close()?;
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
