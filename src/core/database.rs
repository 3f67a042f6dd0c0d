//! Driver traits
//!
//! This module defines the contract a database driver must fulfil so that
//! `DatabaseHandle`, `CursorView` and `RowView` can sit on top of it. The
//! traits are deliberately small: a driver opens connections, a connection
//! hands out cursors and controls the transaction, a cursor executes one
//! statement and yields its rows one at a time.

use super::database_types::{DatabaseType, ParamStyle};
use super::error::Result;
use super::value::{DatabaseRow, DatabaseValue};

/// Entry point of a database driver
pub trait Driver {
    /// Connection type produced by [`Driver::open`]
    type Connection: DriverConnection;

    /// Get the database type
    fn database_type(&self) -> DatabaseType;

    /// Placeholder syntax for bound parameters
    fn param_style(&self) -> ParamStyle {
        self.database_type().param_style()
    }

    /// Open a new connection whose cursors return name-addressable rows
    fn open(&self, connection_string: &str) -> Result<Self::Connection>;
}

/// One open connection to the database
///
/// Statements executed through the connection's cursors are not
/// auto-committed: the driver opens a transaction before the first statement
/// and keeps it open until `commit` or `rollback`.
pub trait DriverConnection {
    /// Cursor type produced by [`DriverConnection::cursor`]
    type Cursor: DriverCursor;

    /// Open a new, independent cursor
    fn cursor(&mut self) -> Result<Self::Cursor>;

    /// Commit the current transaction
    fn commit(&mut self) -> Result<()>;

    /// Roll back the current transaction
    fn rollback(&mut self) -> Result<()>;

    /// Close the connection, discarding any uncommitted work
    fn close(&mut self) -> Result<()>;
}

/// A cursor over the result set of one executed statement
pub trait DriverCursor {
    /// Execute `sql` with positionally bound parameters
    ///
    /// Parameters are always handed to the database separately from the
    /// statement text, never interpolated into it.
    fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<()>;

    /// Fetch the next row, or `None` once the result set is exhausted
    fn fetch_one(&mut self) -> Result<Option<DatabaseRow>>;

    /// Total number of rows produced (or affected) by the last statement
    ///
    /// `None` when the driver cannot know the count before the rows are
    /// consumed. Negative indexing on a `CursorView` requires a count.
    fn row_count(&self) -> Option<usize>;

    /// Number of rows fetched so far
    fn row_number(&self) -> usize;

    /// Release the cursor
    ///
    /// Closing an already closed cursor must fail with
    /// [`DatabaseError::CursorClosed`](super::error::DatabaseError::CursorClosed).
    fn close(&mut self) -> Result<()>;
}
