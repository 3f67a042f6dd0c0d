//! Database driver implementations
//!
//! This module contains concrete implementations of the driver traits for
//! the supported database systems.

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteCursor, SqliteDriver};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresConnection, PostgresCursor, PostgresDriver};
