//! Core types and traits
//!
//! This module provides the row, cursor and handle abstractions together
//! with the driver traits they are built on, the value types that cross the
//! driver boundary, and the error type.

pub mod credentials;
pub mod cursor;
pub mod database;
pub mod database_types;
pub mod error;
pub mod handle;
pub mod row;
pub mod value;

// Re-export commonly used types
pub use credentials::{ConnectionBuilder, CredentialsProvider, EnvCredentials, StaticCredentials};
pub use cursor::{CursorView, IntoRows, Rows};
pub use database::{Driver, DriverConnection, DriverCursor};
pub use database_types::{DatabaseType, ParamStyle};
pub use error::{DatabaseError, Result};
pub use handle::{insert_statement, merge_fields, CursorOf, DatabaseHandle, HandleState};
pub use row::{Attribute, RowView, ROW_ACCESSORS};
pub use value::{DatabaseRow, DatabaseValue, Fields};
