//! Database handle: the entry point for statements and transactions
//!
//! A [`DatabaseHandle`] owns at most one driver connection. It is created
//! empty, opens its connection lazily on first use, and hands out a fresh
//! [`CursorView`] for every query. Nothing is committed implicitly: the
//! caller decides when to [`commit`](DatabaseHandle::commit) or
//! [`rollback`](DatabaseHandle::rollback).

use super::credentials::{CredentialsProvider, EnvCredentials};
use super::cursor::CursorView;
use super::database::{Driver, DriverConnection};
use super::database_types::{DatabaseType, ParamStyle};
use super::error::{DatabaseError, Result};
use super::row::RowView;
use super::value::{DatabaseValue, Fields};
use tracing::{debug, warn};

/// Cursor type produced by a driver's connections
pub type CursorOf<D> = <<D as Driver>::Connection as DriverConnection>::Cursor;

/// Observable lifecycle of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No connection has been opened yet
    Uninitialized,
    /// A connection is open
    Ready,
    /// The connection was closed; the next operation reopens it
    Closed,
}

enum Connection<C> {
    Uninitialized,
    Ready(C),
    Closed,
}

/// Owns one connection and issues statements through it
pub struct DatabaseHandle<D: Driver> {
    driver: D,
    connection_string: Option<String>,
    connection: Connection<D::Connection>,
    credentials: Option<Box<dyn CredentialsProvider + Send + Sync>>,
}

impl<D: Driver> DatabaseHandle<D> {
    /// Create an empty handle; no connection is opened
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            connection_string: None,
            connection: Connection::Uninitialized,
            credentials: None,
        }
    }

    /// Use `provider` when [`connect`](Self::connect) is called without a
    /// connection string (defaults to [`EnvCredentials`])
    pub fn with_credentials<P>(mut self, provider: P) -> Self
    where
        P: CredentialsProvider + Send + Sync + 'static,
    {
        self.credentials = Some(Box::new(provider));
        self
    }

    /// Get the database type
    pub fn database_type(&self) -> DatabaseType {
        self.driver.database_type()
    }

    /// Placeholder syntax of the underlying driver
    pub fn param_style(&self) -> ParamStyle {
        self.driver.param_style()
    }

    /// Current lifecycle state
    pub fn state(&self) -> HandleState {
        match self.connection {
            Connection::Uninitialized => HandleState::Uninitialized,
            Connection::Ready(_) => HandleState::Ready,
            Connection::Closed => HandleState::Closed,
        }
    }

    /// Check if a connection is open
    pub fn is_connected(&self) -> bool {
        matches!(self.connection, Connection::Ready(_))
    }

    /// The stored connection string, if any
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    /// Store a connection string and open the connection
    ///
    /// Without a string, the credentials provider is asked for one. When the
    /// handle is already connected the new string is stored for the next
    /// reconnect but the open connection is kept.
    pub fn connect(&mut self, connection_string: Option<&str>) -> Result<()> {
        let connection_string = match connection_string {
            Some(s) => s.to_string(),
            None => match &self.credentials {
                Some(provider) => provider.connection_string()?,
                None => EnvCredentials::default().connection_string()?,
            },
        };
        self.connection_string = Some(connection_string);
        self.setup()
    }

    /// Open the connection unless one is already open
    pub fn setup(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let connection_string = self.connection_string.as_deref().ok_or_else(|| {
            DatabaseError::configuration(
                "No connection string set, call connect(connection_string) first",
            )
        })?;

        let connection = self.driver.open(connection_string)?;
        debug!(database = %self.driver.database_type(), "connection opened");
        self.connection = Connection::Ready(connection);
        Ok(())
    }

    /// Close the connection; a no-op when none is open
    pub fn close(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.connection, Connection::Closed);
        if let Connection::Ready(mut connection) = previous {
            connection.close()?;
            debug!(database = %self.driver.database_type(), "connection closed");
        }
        Ok(())
    }

    fn connection_mut(&mut self) -> Result<&mut D::Connection> {
        self.setup()?;
        match &mut self.connection {
            Connection::Ready(connection) => Ok(connection),
            _ => Err(DatabaseError::connection("connection is not open")),
        }
    }

    /// Execute `sql` on a new cursor and return a view over its results
    ///
    /// `params` are bound positionally by the driver using its placeholder
    /// syntax (see [`param_style`](Self::param_style)); they are never
    /// interpolated into the statement text.
    pub fn query(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<CursorView<CursorOf<D>>> {
        let connection = self.connection_mut()?;
        let mut cursor = CursorView::new(connection.cursor()?);
        cursor.execute(sql, params)?;
        Ok(cursor)
    }

    /// Like [`query`](Self::query) when at most one row is expected
    ///
    /// Returns `None` for an empty result set. The cursor is released before
    /// returning.
    pub fn queryone(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<Option<RowView>> {
        let mut cursor = self.query(sql, params)?;
        let first = match cursor.get(0) {
            Ok(row) => Some(row.clone()),
            Err(e) if e.is_index_error() => None,
            Err(e) => return Err(e),
        };
        cursor.close()?;
        Ok(first)
    }

    /// Insert one row into `table`
    ///
    /// `fields` are layered over the optional `base` mapping: on a key
    /// collision the value from `fields` wins and the column keeps its
    /// position from `base`. Table and column names are written into the
    /// statement as identifiers and must come from trusted code; the values
    /// are bound as parameters.
    pub fn insert(&mut self, table: &str, base: Option<&Fields>, fields: Fields) -> Result<()> {
        let merged = merge_fields(base, fields);
        let (sql, values) = insert_statement(table, &merged, self.param_style());
        let mut cursor = self.query(&sql, &values)?;
        cursor.close()
    }

    /// Commit the current transaction
    pub fn commit(&mut self) -> Result<()> {
        self.connection_mut()?.commit()
    }

    /// Roll back the current transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.connection_mut()?.rollback()
    }
}

impl<D: Driver> Drop for DatabaseHandle<D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close connection on drop");
        }
    }
}

impl<D: Driver + Default> Default for DatabaseHandle<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: Driver> std::fmt::Debug for DatabaseHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("database_type", &self.driver.database_type())
            .field("state", &self.state())
            .finish()
    }
}

/// Layer `fields` over `base`; `fields` wins on a key collision
pub fn merge_fields(base: Option<&Fields>, fields: Fields) -> Fields {
    let mut merged = base.cloned().unwrap_or_default();
    merged.extend(fields);
    merged
}

/// Build an INSERT statement and its positional parameters
///
/// Columns appear in the mapping's iteration order. An empty mapping
/// produces `INSERT INTO table DEFAULT VALUES`.
pub fn insert_statement(
    table: &str,
    fields: &Fields,
    style: ParamStyle,
) -> (String, Vec<DatabaseValue>) {
    if fields.is_empty() {
        return (format!("INSERT INTO {} DEFAULT VALUES", table), Vec::new());
    }
    let columns = fields
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns,
        style.placeholders(fields.len())
    );
    (sql, fields.values().cloned().collect())
}
