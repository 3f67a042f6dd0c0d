//! Database type definitions
//!
//! This module defines the database kinds a driver can speak for and the
//! placeholder syntax each of them expects in parameterized statements.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    /// PostgreSQL database
    Postgres,
    /// SQLite database
    Sqlite,
}

impl DatabaseType {
    /// Convert database type to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            DatabaseType::Postgres => "postgres",
            DatabaseType::Sqlite => "sqlite",
        }
    }

    /// Placeholder syntax understood by this database's native driver
    pub fn param_style(&self) -> ParamStyle {
        match self {
            DatabaseType::Postgres => ParamStyle::Numeric,
            DatabaseType::Sqlite => ParamStyle::Qmark,
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DatabaseType::Postgres),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            _ => Err(format!("Invalid database type: '{}'", s)),
        }
    }
}

/// Positional placeholder syntax for bound parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamStyle {
    /// `%s`
    Format,
    /// `?`
    Qmark,
    /// `$1`, `$2`, ...
    Numeric,
}

impl ParamStyle {
    /// Placeholder for the parameter at a one-based position
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            ParamStyle::Format => "%s".to_string(),
            ParamStyle::Qmark => "?".to_string(),
            ParamStyle::Numeric => format!("${}", position),
        }
    }

    /// Comma-separated placeholders for `count` parameters
    pub fn placeholders(&self, count: usize) -> String {
        (1..=count)
            .map(|position| self.placeholder(position))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_to_str() {
        assert_eq!(DatabaseType::Postgres.to_str(), "postgres");
        assert_eq!(DatabaseType::Sqlite.to_str(), "sqlite");
    }

    #[test]
    fn test_database_type_from_str() {
        assert_eq!(
            "postgresql".parse::<DatabaseType>().ok(),
            Some(DatabaseType::Postgres)
        );
        assert_eq!(
            "SQLite3".parse::<DatabaseType>().ok(),
            Some(DatabaseType::Sqlite)
        );
        assert_eq!("mysql".parse::<DatabaseType>().ok(), None);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(ParamStyle::Format.placeholders(2), "%s,%s");
        assert_eq!(ParamStyle::Qmark.placeholders(3), "?,?,?");
        assert_eq!(ParamStyle::Numeric.placeholders(3), "$1,$2,$3");
        assert_eq!(ParamStyle::Numeric.placeholders(0), "");
        assert_eq!(
            DatabaseType::Sqlite.param_style(),
            ParamStyle::Qmark
        );
    }
}
