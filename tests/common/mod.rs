//! Recording driver used by the handle and property tests
//!
//! Every statement is logged with its parameters; `SELECT` statements return
//! the scripted result rows, everything else returns no rows.

#![allow(dead_code)]

use parking_lot::Mutex;
use rust_db_wrapper::{
    DatabaseError, DatabaseRow, DatabaseType, DatabaseValue, Driver, DriverConnection,
    DriverCursor, ParamStyle, Result,
};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Script {
    pub opened: usize,
    pub live: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub cursor_closes: usize,
    pub statements: Vec<(String, Vec<DatabaseValue>)>,
    pub result: Vec<DatabaseRow>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    pub script: Arc<Mutex<Script>>,
}

impl RecordingDriver {
    pub fn with_rows(rows: Vec<DatabaseRow>) -> Self {
        let driver = Self::default();
        driver.script.lock().result = rows;
        driver
    }

    pub fn last_statement(&self) -> Option<(String, Vec<DatabaseValue>)> {
        self.script.lock().statements.last().cloned()
    }
}

impl Driver for RecordingDriver {
    type Connection = RecordingConnection;

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn param_style(&self) -> ParamStyle {
        ParamStyle::Format
    }

    fn open(&self, _connection_string: &str) -> Result<RecordingConnection> {
        let mut script = self.script.lock();
        script.opened += 1;
        script.live += 1;
        Ok(RecordingConnection {
            script: Arc::clone(&self.script),
            closed: false,
        })
    }
}

pub struct RecordingConnection {
    script: Arc<Mutex<Script>>,
    closed: bool,
}

impl DriverConnection for RecordingConnection {
    type Cursor = RecordingCursor;

    fn cursor(&mut self) -> Result<RecordingCursor> {
        if self.closed {
            return Err(DatabaseError::connection("connection already closed"));
        }
        Ok(RecordingCursor {
            script: Arc::clone(&self.script),
            rows: VecDeque::new(),
            row_count: None,
            fetched: 0,
            closed: false,
        })
    }

    fn commit(&mut self) -> Result<()> {
        self.script.lock().commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.script.lock().rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.script.lock().live -= 1;
        }
        Ok(())
    }
}

pub struct RecordingCursor {
    script: Arc<Mutex<Script>>,
    rows: VecDeque<DatabaseRow>,
    row_count: Option<usize>,
    fetched: usize,
    closed: bool,
}

impl DriverCursor for RecordingCursor {
    fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<()> {
        let mut script = self.script.lock();
        script.statements.push((sql.to_string(), params.to_vec()));
        self.rows = if sql.trim_start().to_uppercase().starts_with("SELECT") {
            script.result.iter().cloned().collect()
        } else {
            VecDeque::new()
        };
        self.row_count = Some(self.rows.len());
        Ok(())
    }

    fn fetch_one(&mut self) -> Result<Option<DatabaseRow>> {
        let row = self.rows.pop_front();
        if row.is_some() {
            self.fetched += 1;
        }
        Ok(row)
    }

    fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    fn row_number(&self) -> usize {
        self.fetched
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        self.closed = true;
        self.script.lock().cursor_closes += 1;
        Ok(())
    }
}

/// Rows `0..n` in a single `value` column
pub fn value_rows(n: i64) -> Vec<DatabaseRow> {
    let columns: Arc<[String]> = vec!["value".to_string()].into();
    (0..n)
        .map(|i| DatabaseRow::new(Arc::clone(&columns), vec![DatabaseValue::Long(i)]))
        .collect()
}
