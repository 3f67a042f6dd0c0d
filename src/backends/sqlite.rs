//! SQLite driver implementation
//!
//! This module implements the driver traits on top of rusqlite. A statement
//! is run to completion when it is executed and its rows are buffered on the
//! cursor, so the total row count is known before the first fetch. A
//! transaction is opened before the first statement after every commit or
//! rollback, matching the no-autocommit contract of the driver traits.

use crate::core::{
    database::{Driver, DriverConnection, DriverCursor},
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    value::{DatabaseRow, DatabaseValue},
};
use parking_lot::Mutex;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Opens SQLite connections; the connection string is a file path or `:memory:`
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn open(&self, connection_string: &str) -> Result<SqliteConnection> {
        let conn = Connection::open(connection_string)?;

        // Enable foreign keys
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(SqliteConnection {
            connection: Arc::new(Mutex::new(Some(conn))),
        })
    }
}

/// An open SQLite connection
pub struct SqliteConnection {
    connection: SharedConnection,
}

impl SqliteConnection {
    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.connection.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| DatabaseError::connection("connection already closed"))?;
        f(conn)
    }

    /// Check if a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.connection
            .lock()
            .as_ref()
            .map(|conn| !conn.is_autocommit())
            .unwrap_or(false)
    }
}

impl DriverConnection for SqliteConnection {
    type Cursor = SqliteCursor;

    fn cursor(&mut self) -> Result<SqliteCursor> {
        self.with_connection(|_| Ok(()))?;
        Ok(SqliteCursor::new(Arc::clone(&self.connection)))
    }

    fn commit(&mut self) -> Result<()> {
        self.with_connection(|conn| {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
            Ok(())
        })
    }

    fn rollback(&mut self) -> Result<()> {
        self.with_connection(|conn| {
            if !conn.is_autocommit() {
                conn.execute_batch("ROLLBACK")?;
            }
            Ok(())
        })
    }

    fn close(&mut self) -> Result<()> {
        let conn = self.connection.lock().take();
        match conn {
            // Uncommitted work is rolled back by SQLite on close
            Some(conn) => conn.close().map_err(|(_, e)| DatabaseError::from(e)),
            None => Ok(()),
        }
    }
}

/// Cursor holding the buffered result of one statement
pub struct SqliteCursor {
    connection: SharedConnection,
    rows: VecDeque<DatabaseRow>,
    row_count: Option<usize>,
    row_number: usize,
    closed: bool,
}

impl SqliteCursor {
    fn new(connection: SharedConnection) -> Self {
        Self {
            connection,
            rows: VecDeque::new(),
            row_count: None,
            row_number: 0,
            closed: false,
        }
    }

    /// Convert a rusqlite value to a DatabaseValue
    fn to_database_value(value: ValueRef<'_>) -> DatabaseValue {
        match value {
            ValueRef::Null => DatabaseValue::Null,
            ValueRef::Integer(v) => DatabaseValue::Long(v),
            ValueRef::Real(v) => DatabaseValue::Double(v),
            ValueRef::Text(v) => DatabaseValue::String(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => DatabaseValue::Bytes(v.to_vec()),
        }
    }
}

impl DriverCursor for SqliteCursor {
    fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<()> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        let guard = self.connection.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| DatabaseError::connection("connection already closed"))?;

        if conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }

        let mut stmt = conn.prepare(sql)?;
        let mut rows = VecDeque::new();
        let row_count = if stmt.column_count() == 0 {
            stmt.execute(params_from_iter(params.iter()))?
        } else {
            let columns: Arc<[String]> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let mut result = stmt.query(params_from_iter(params.iter()))?;
            while let Some(row) = result.next()? {
                let values = (0..columns.len())
                    .map(|i| row.get_ref(i).map(Self::to_database_value))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows.push_back(DatabaseRow::new(Arc::clone(&columns), values));
            }
            rows.len()
        };

        debug!(rows = row_count, "sqlite statement executed");
        self.rows = rows;
        self.row_count = Some(row_count);
        self.row_number = 0;
        Ok(())
    }

    fn fetch_one(&mut self) -> Result<Option<DatabaseRow>> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        let row = self.rows.pop_front();
        if row.is_some() {
            self.row_number += 1;
        }
        Ok(row)
    }

    fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    fn row_number(&self) -> usize {
        self.row_number
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        self.closed = true;
        self.rows.clear();
        Ok(())
    }
}

/// Bind DatabaseValue directly as a rusqlite parameter
impl ToSql for DatabaseValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            DatabaseValue::Null => ToSqlOutput::Owned(Value::Null),
            DatabaseValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            DatabaseValue::Int(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            DatabaseValue::Long(v) | DatabaseValue::Timestamp(v) => {
                ToSqlOutput::Owned(Value::Integer(*v))
            }
            DatabaseValue::Float(v) => ToSqlOutput::Owned(Value::Real(f64::from(*v))),
            DatabaseValue::Double(v) => ToSqlOutput::Owned(Value::Real(*v)),
            DatabaseValue::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            DatabaseValue::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}
