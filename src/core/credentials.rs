//! Connection string lookup for `DatabaseHandle::connect(None)`

use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use std::borrow::Cow;

/// Environment variable consulted by [`EnvCredentials::default`]
pub const DEFAULT_CONNECTION_VAR: &str = "DATABASE_URL";

/// Source of a driver-specific connection string
pub trait CredentialsProvider {
    /// Look up the connection string
    fn connection_string(&self) -> Result<String>;
}

/// Reads the connection string from an environment variable
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: Cow<'static, str>,
}

impl EnvCredentials {
    /// Read from the named variable instead of `DATABASE_URL`
    pub fn new(var: impl Into<Cow<'static, str>>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable consulted
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_VAR)
    }
}

impl CredentialsProvider for EnvCredentials {
    fn connection_string(&self) -> Result<String> {
        std::env::var(self.var.as_ref()).map_err(|_| {
            DatabaseError::configuration(format!(
                "No connection string given and ${} is not set",
                self.var
            ))
        })
    }
}

/// A fixed connection string
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub String);

impl CredentialsProvider for StaticCredentials {
    fn connection_string(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

impl<S: Into<String>> From<S> for StaticCredentials {
    fn from(s: S) -> Self {
        StaticCredentials(s.into())
    }
}

/// Assembles a connection string from its parts
///
/// SQLite takes the database path as is. PostgreSQL values are rendered as
/// libpq `key=value` pairs; a value that is empty or contains whitespace,
/// a quote or a backslash is single-quoted with `'` and `\` escaped.
#[derive(Debug, Clone)]
pub struct ConnectionBuilder {
    db_type: DatabaseType,
    database: Option<String>,
    params: Vec<(String, String)>,
}

impl ConnectionBuilder {
    /// Start an empty builder for `db_type`
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            database: None,
            params: Vec::new(),
        }
    }

    /// Database name, or the file path for SQLite
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn host<S: Into<String>>(self, host: S) -> Self {
        self.option("host", host)
    }

    pub fn port(self, port: u16) -> Self {
        self.option("port", port.to_string())
    }

    pub fn username<S: Into<String>>(self, username: S) -> Self {
        self.option("user", username)
    }

    pub fn password<S: Into<String>>(self, password: S) -> Self {
        self.option("password", password)
    }

    /// Any other libpq keyword, e.g. `connect_timeout` (ignored for SQLite)
    pub fn option<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Render the connection string
    pub fn build_connection_string(&self) -> String {
        match self.db_type {
            DatabaseType::Sqlite => self
                .database
                .clone()
                .unwrap_or_else(|| ":memory:".to_string()),
            DatabaseType::Postgres => self
                .params
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .chain(self.database.as_deref().map(|db| ("dbname", db)))
                .map(|(key, value)| format!("{}={}", key, quote_libpq(value)))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl CredentialsProvider for ConnectionBuilder {
    fn connection_string(&self) -> Result<String> {
        Ok(self.build_connection_string())
    }
}

fn quote_libpq(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}
