//! # Rust DB Wrapper
//!
//! A thin ergonomic layer over relational database drivers. Query results
//! come back as rows that can be read by column position, column name or
//! attribute; cursors are released automatically; single-row queries and
//! simple inserts have shorthands.
//!
//! ## Features
//!
//! - **Flexible rows**: [`RowView`] is an ordered sequence, a name-keyed
//!   mapping and an attribute accessor at the same time
//! - **Managed cursors**: [`CursorView`] gives list-like, forward-only
//!   indexing (including negative indices) and releases its cursor on drop
//! - **Lazy connections**: [`DatabaseHandle`] opens its connection on first
//!   use and never commits implicitly
//! - **Safe parameters**: values are always bound by the driver, never
//!   interpolated into SQL text
//!
//! ## Supported Databases
//!
//! | Database | Feature | Placeholders |
//! |----------|---------|--------------|
//! | SQLite | `sqlite` (default) | `?` |
//! | PostgreSQL | `postgres` | `$1`, `$2`, ... |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_db_wrapper::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut db = DatabaseHandle::new(SqliteDriver);
//!     db.connect(Some("app.db"))?;
//!
//!     db.insert("users", None, fields! { "name" => "Al Bert", "uid" => 10 })?;
//!     db.commit()?;
//!
//!     match db.queryone("SELECT * FROM users WHERE name = ?", params!["Al Bert"])? {
//!         Some(user) => println!("uid: {:?}", user.get_by_attribute("uid")?.as_column()),
//!         None => println!("no such user"),
//!     }
//!
//!     let user_count = db.queryone("SELECT COUNT(*) FROM users", &[])?;
//!     println!("{:?}", user_count.map(|row| row[0].clone()));
//!
//!     for row in db.query("SELECT * FROM users", &[])? {
//!         let row = row?;
//!         println!("{} {}", row["name"], row.get_by_position(-1)?);
//!     }
//!
//!     if let Err(e) = db.commit() {
//!         db.rollback()?;
//!         return Err(e);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_db_wrapper/
//! ├── src/
//! │   ├── core/              # Row, cursor and handle abstractions
//! │   │   ├── credentials.rs # Connection string providers, ConnectionBuilder
//! │   │   ├── cursor.rs      # CursorView
//! │   │   ├── database.rs    # Driver traits
//! │   │   ├── database_types.rs  # Database type and placeholder style
//! │   │   ├── error.rs       # Error types
//! │   │   ├── handle.rs      # DatabaseHandle
//! │   │   ├── row.rs         # RowView
//! │   │   ├── value.rs       # Value and record types
//! │   │   └── mod.rs
//! │   ├── backends/          # Driver implementations
//! │   ├── default_handle.rs  # Process-wide SQLite handle
//! │   └── lib.rs
//! ├── demos/                 # Example programs
//! ├── tests/                 # Integration tests
//! └── Cargo.toml
//! ```

/// Core row, cursor and handle types and the driver traits
pub mod core;

/// Database driver implementations
pub mod backends;

#[cfg(feature = "sqlite")]
mod default_handle;

#[cfg(feature = "sqlite")]
pub use default_handle::default_handle;

/// Build a [`Fields`] mapping in the order the entries are written
///
/// ```rust
/// use rust_db_wrapper::{fields, DatabaseValue};
///
/// let f = fields! { "name" => "Al Bert", "uid" => 10 };
/// assert_eq!(f.keys().collect::<Vec<_>>(), ["name", "uid"]);
/// assert_eq!(f["uid"], DatabaseValue::Int(10));
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($name),
                $crate::DatabaseValue::from($value),
            );
        )+
        fields
    }};
}

/// Build a positional parameter slice
///
/// ```rust
/// use rust_db_wrapper::{params, DatabaseValue};
///
/// let p = params![500, "name"];
/// assert_eq!(p, &[DatabaseValue::Int(500), DatabaseValue::from("name")]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[] as &[$crate::DatabaseValue]
    };
    ($($value:expr),+ $(,)?) => {
        &[$($crate::DatabaseValue::from($value)),+] as &[$crate::DatabaseValue]
    };
}

/// Prelude for convenient imports
///
/// ```rust
/// use rust_db_wrapper::prelude::*;
///
/// fn main() -> Result<()> {
///     let mut db = DatabaseHandle::new(SqliteDriver);
///     db.connect(Some(":memory:"))?;
///     Ok(())
/// }
/// ```
pub mod prelude {
    pub use crate::core::{
        Attribute, ConnectionBuilder, CursorView, DatabaseError, DatabaseHandle, DatabaseRow,
        DatabaseType, DatabaseValue, Driver, Fields, HandleState, Result, RowView,
    };
    pub use crate::{fields, params};

    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteDriver;

    #[cfg(feature = "postgres")]
    pub use crate::backends::PostgresDriver;
}

// Re-export at root level for convenience
pub use crate::core::{
    Attribute, ConnectionBuilder, CredentialsProvider, CursorView, DatabaseError, DatabaseHandle,
    DatabaseRow, DatabaseType, DatabaseValue, Driver, DriverConnection, DriverCursor,
    EnvCredentials, Fields, HandleState, ParamStyle, Result, RowView, StaticCredentials,
};

#[cfg(feature = "sqlite")]
pub use crate::backends::SqliteDriver;

#[cfg(feature = "postgres")]
pub use crate::backends::PostgresDriver;
