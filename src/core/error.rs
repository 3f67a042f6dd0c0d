//! Error types for the database wrapper
//!
//! This module defines all error types that can occur while setting up a
//! handle, walking a cursor or reading a row. Driver errors are carried
//! through unchanged.

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Error types for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The handle has no connection string to open a connection with
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection error (generic)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Type conversion error
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Neither a row accessor nor a column carries this name
    #[error("Row has no attribute or column named '{0}'")]
    AttributeNotFound(String),

    /// Position past either end of a row or result set
    #[error("Index {index} out of range")]
    IndexOutOfRange { index: isize },

    /// A cursor can only move forward
    #[error("Cannot get records except sequentially: requested row {requested} after fetching {fetched}")]
    SequentialAccess { requested: usize, fetched: usize },

    /// The cursor was already released
    #[error("Cursor already closed")]
    CursorClosed,

    /// Unsupported operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// PostgreSQL error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    PostgresError(#[from] postgres::Error),
}

impl DatabaseError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Configuration(msg.into())
    }

    /// Create a new connection error (generic)
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        DatabaseError::ConnectionError(msg.into())
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        DatabaseError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an index error for the given (untranslated) position
    pub fn index_out_of_range(index: isize) -> Self {
        DatabaseError::IndexOutOfRange { index }
    }

    /// Create a new unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        DatabaseError::UnsupportedOperation(msg.into())
    }

    /// True for exhaustion and out-of-range positions
    pub fn is_index_error(&self) -> bool {
        matches!(self, DatabaseError::IndexOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DatabaseError::configuration("no connection string");
        assert!(matches!(err, DatabaseError::Configuration(_)));

        let err = DatabaseError::unsupported("negative index without a row count");
        assert!(matches!(err, DatabaseError::UnsupportedOperation(_)));


        let err = DatabaseError::index_out_of_range(-3);
        assert!(err.is_index_error());
        assert!(!DatabaseError::CursorClosed.is_index_error());
    }

    #[test]
    fn test_error_display() {
        let err = DatabaseError::connection("Connection refused");
        assert_eq!(err.to_string(), "Connection error: Connection refused");

        let err = DatabaseError::SequentialAccess {
            requested: 1,
            fetched: 3,
        };
        assert_eq!(
            err.to_string(),
            "Cannot get records except sequentially: requested row 1 after fetching 3"
        );

        let err = DatabaseError::type_mismatch("i64", "f64");
        assert_eq!(err.to_string(), "Type mismatch: expected i64, got f64");
    }
}
