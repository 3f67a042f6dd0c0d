//! Handle lifecycle and statement shape, checked against a recording driver

mod common;

use common::{value_rows, RecordingDriver};
use rust_db_wrapper::prelude::*;
use rust_db_wrapper::{EnvCredentials, StaticCredentials};

fn connected(driver: &RecordingDriver) -> DatabaseHandle<RecordingDriver> {
    let mut db = DatabaseHandle::new(driver.clone());
    db.connect(Some("dbname=test")).expect("connect");
    db
}

#[test]
fn test_operations_without_connection_string_fail() {
    let driver = RecordingDriver::default();
    let mut db = DatabaseHandle::new(driver.clone());

    assert!(matches!(db.setup(), Err(DatabaseError::Configuration(_))));
    assert!(matches!(
        db.query("SELECT 1", &[]),
        Err(DatabaseError::Configuration(_))
    ));
    assert!(matches!(db.commit(), Err(DatabaseError::Configuration(_))));
    assert!(matches!(db.rollback(), Err(DatabaseError::Configuration(_))));
    assert_eq!(db.state(), HandleState::Uninitialized);
    assert_eq!(driver.script.lock().opened, 0);

    // closing a never-opened handle is fine
    assert!(db.close().is_ok());
}

#[test]
fn test_setup_is_idempotent() -> Result<()> {
    let driver = RecordingDriver::default();
    let mut db = connected(&driver);
    db.setup()?;
    db.setup()?;
    assert_eq!(db.state(), HandleState::Ready);

    let script = driver.script.lock();
    assert_eq!(script.opened, 1);
    assert_eq!(script.live, 1);
    Ok(())
}

#[test]
fn test_close_then_lazy_reconnect() -> Result<()> {
    let driver = RecordingDriver::default();
    let mut db = connected(&driver);

    db.close()?;
    db.close()?;
    assert_eq!(db.state(), HandleState::Closed);
    assert_eq!(driver.script.lock().live, 0);

    db.query("SELECT 1", &[])?;
    assert_eq!(db.state(), HandleState::Ready);
    let script = driver.script.lock();
    assert_eq!(script.opened, 2);
    assert_eq!(script.live, 1);
    Ok(())
}

#[test]
fn test_drop_closes_connection() {
    let driver = RecordingDriver::default();
    {
        let _db = connected(&driver);
        assert_eq!(driver.script.lock().live, 1);
    }
    assert_eq!(driver.script.lock().live, 0);
}

#[test]
fn test_connect_without_string_asks_credentials_provider() -> Result<()> {
    let driver = RecordingDriver::default();
    let mut db = DatabaseHandle::new(driver.clone())
        .with_credentials(StaticCredentials::from("dbname=from_provider"));
    db.connect(None)?;
    assert_eq!(db.connection_string(), Some("dbname=from_provider"));
    assert!(db.is_connected());
    Ok(())
}

#[test]
fn test_connect_without_string_or_env_fails() {
    let driver = RecordingDriver::default();
    let mut db = DatabaseHandle::new(driver.clone())
        .with_credentials(EnvCredentials::new("RUST_DB_WRAPPER_UNSET_CONNECTION_VAR"));

    assert!(matches!(
        db.connect(None),
        Err(DatabaseError::Configuration(_))
    ));
    assert_eq!(db.state(), HandleState::Uninitialized);
    assert_eq!(db.connection_string(), None);
    assert_eq!(driver.script.lock().opened, 0);
}

#[test]
fn test_query_binds_parameters_separately() -> Result<()> {
    let driver = RecordingDriver::default();
    let mut db = connected(&driver);
    let hostile = "x'); DROP TABLE users; --";
    db.query("SELECT * FROM users WHERE name = %s", params![hostile])?;

    let (sql, values) = driver.last_statement().expect("statement recorded");
    assert_eq!(sql, "SELECT * FROM users WHERE name = %s");
    assert_eq!(values, vec![DatabaseValue::from(hostile)]);
    Ok(())
}

#[test]
fn test_each_query_opens_its_own_cursor() -> Result<()> {
    let driver = RecordingDriver::with_rows(value_rows(3));
    let mut db = connected(&driver);

    let mut first = db.query("SELECT value FROM t", &[])?;
    let mut second = db.query("SELECT value FROM t", &[])?;
    first.get(2)?;
    assert_eq!(second.get(0)?, &[DatabaseValue::Long(0)]);
    Ok(())
}

#[test]
fn test_insert_builds_statement_from_merged_fields() -> Result<()> {
    let driver = RecordingDriver::default();
    let mut db = connected(&driver);

    db.insert("t", Some(&fields! { "a" => 1 }), fields! { "b" => 2 })?;
    let (sql, values) = driver.last_statement().expect("statement recorded");
    assert_eq!(sql, "INSERT INTO t (a,b) VALUES (%s,%s)");
    assert_eq!(values, vec![DatabaseValue::Int(1), DatabaseValue::Int(2)]);

    db.insert(
        "t",
        Some(&fields! { "a" => 1, "b" => 99 }),
        fields! { "b" => 2 },
    )?;
    let (sql, values) = driver.last_statement().expect("statement recorded");
    assert_eq!(sql, "INSERT INTO t (a,b) VALUES (%s,%s)");
    assert_eq!(values, vec![DatabaseValue::Int(1), DatabaseValue::Int(2)]);

    db.insert("users", None, fields! { "name" => "Al Bert" })?;
    let (sql, _) = driver.last_statement().expect("statement recorded");
    assert_eq!(sql, "INSERT INTO users (name) VALUES (%s)");
    Ok(())
}

#[test]
fn test_insert_and_queryone_release_their_cursors() -> Result<()> {
    let driver = RecordingDriver::with_rows(value_rows(2));
    let mut db = connected(&driver);

    db.insert("t", None, fields! { "value" => 1 })?;
    db.queryone("SELECT value FROM t", &[])?;
    assert_eq!(driver.script.lock().cursor_closes, 2);
    Ok(())
}

#[test]
fn test_queryone() -> Result<()> {
    let driver = RecordingDriver::with_rows(value_rows(3));
    let mut db = connected(&driver);
    let first = db.queryone("SELECT value FROM t", &[])?;
    assert_eq!(first, Some(RowView::new(value_rows(1).remove(0))));

    let empty = RecordingDriver::default();
    let mut db = connected(&empty);
    assert_eq!(db.queryone("SELECT value FROM t WHERE value = %s", params![1010])?, None);
    Ok(())
}

#[test]
fn test_commit_and_rollback_delegate() -> Result<()> {
    let driver = RecordingDriver::default();
    let mut db = DatabaseHandle::new(driver.clone());
    db.connect(Some("dbname=test"))?;
    db.close()?;

    // both reopen lazily
    db.commit()?;
    db.rollback()?;
    let script = driver.script.lock();
    assert_eq!((script.commits, script.rollbacks), (1, 1));
    assert_eq!(script.opened, 2);
    Ok(())
}

#[test]
fn test_double_release_never_errors() -> Result<()> {
    let driver = RecordingDriver::with_rows(value_rows(5));
    let mut db = connected(&driver);

    let mut cursor = db.query("SELECT value FROM t", &[])?;
    cursor.get(1)?;
    cursor.close()?;
    cursor.close()?;
    drop(cursor);

    let mut cursor = db.query("SELECT value FROM t", &[])?;
    cursor.close()?;
    drop(cursor);

    assert_eq!(driver.script.lock().cursor_closes, 2);
    Ok(())
}

#[test]
fn test_handle_debug_reports_state() {
    let db = DatabaseHandle::new(RecordingDriver::default());
    let debug = format!("{:?}", db);
    assert!(debug.contains("Uninitialized"));
    assert_eq!(db.param_style(), rust_db_wrapper::ParamStyle::Format);
}
