//! Process-wide default handle
//!
//! Some programs only ever talk to one database and prefer not to thread a
//! handle through every call. [`default_handle`] gives them a single shared
//! SQLite handle. It is constructed empty: nothing is opened until the
//! caller runs `connect`, and nothing is closed until the caller runs
//! `close`. Code that can pass a [`DatabaseHandle`] explicitly should do so.

use crate::backends::SqliteDriver;
use crate::core::DatabaseHandle;
use parking_lot::{const_mutex, Mutex, MutexGuard};

static DEFAULT_HANDLE: Mutex<DatabaseHandle<SqliteDriver>> =
    const_mutex(DatabaseHandle::new(SqliteDriver));

/// Lock and return the process-wide SQLite handle
///
/// The lock is held for as long as the guard lives; do not hold it across
/// calls that lock it again.
pub fn default_handle() -> MutexGuard<'static, DatabaseHandle<SqliteDriver>> {
    DEFAULT_HANDLE.lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HandleState;

    #[test]
    fn test_default_handle_lifecycle_is_caller_driven() -> crate::Result<()> {
        let mut db = default_handle();
        db.connect(Some(":memory:"))?;
        assert_eq!(db.state(), HandleState::Ready);

        let one = db.queryone("SELECT 1 AS one", &[])?.expect("one row");
        assert_eq!(one.get_by_name("one")?.as_long(), Some(1));

        db.close()?;
        assert_eq!(db.state(), HandleState::Closed);
        Ok(())
    }
}
