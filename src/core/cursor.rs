//! Cursor view: forward-only, auto-releasing access to a result set
//!
//! The driver cursor only moves forward. [`CursorView`] offers list-like
//! indexing on top of it as long as requests never go back further than
//! the most recently fetched row, and releases the driver cursor exactly
//! once, either through [`CursorView::close`] or when the view is dropped.

use super::database::DriverCursor;
use super::error::{DatabaseError, Result};
use super::row::RowView;
use super::value::DatabaseValue;
use tracing::{debug, warn};

/// Forward-only view over a driver cursor
pub struct CursorView<C: DriverCursor> {
    cursor: Option<C>,
    current: Option<RowView>,
    exhausted: bool,
}

impl<C: DriverCursor> CursorView<C> {
    /// Take ownership of a driver cursor
    pub fn new(cursor: C) -> Self {
        Self {
            cursor: Some(cursor),
            current: None,
            exhausted: false,
        }
    }

    pub(crate) fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<()> {
        let cursor = self.cursor.as_mut().ok_or(DatabaseError::CursorClosed)?;
        debug!(sql, params = params.len(), "executing statement");
        cursor.execute(sql, params)
    }

    /// Total rows reported by the driver for the executed statement
    pub fn row_count(&self) -> Option<usize> {
        self.cursor.as_ref().and_then(|c| c.row_count())
    }

    /// Rows fetched from the driver so far
    pub fn rows_fetched(&self) -> usize {
        self.cursor.as_ref().map_or(0, |c| c.row_number())
    }

    /// True once a fetch ran past the end of the result set
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// True once the driver cursor has been released
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Row at `index`
    ///
    /// Negative indices count back from the driver-reported row count. The
    /// most recently fetched row can be requested again and is returned from
    /// cache; anything earlier fails with
    /// [`DatabaseError::SequentialAccess`]. Fetching past the last row fails
    /// with [`DatabaseError::IndexOutOfRange`].
    pub fn get(&mut self, index: isize) -> Result<&RowView> {
        let cursor = self.cursor.as_mut().ok_or(DatabaseError::CursorClosed)?;

        let resolved = if index < 0 {
            let total = cursor.row_count().ok_or_else(|| {
                DatabaseError::unsupported("negative index: driver did not report a row count")
            })?;
            total as isize + index
        } else {
            index
        };
        if resolved < 0 {
            return Err(DatabaseError::index_out_of_range(index));
        }
        let resolved = resolved as usize;

        let fetched = cursor.row_number();
        if resolved + 1 < fetched {
            return Err(DatabaseError::SequentialAccess {
                requested: resolved,
                fetched,
            });
        }

        while resolved >= cursor.row_number() {
            match cursor.fetch_one()? {
                Some(row) => self.current = Some(RowView::new(row)),
                None => {
                    self.current = None;
                    self.exhausted = true;
                    return Err(DatabaseError::index_out_of_range(index));
                }
            }
        }

        self.current
            .as_ref()
            .ok_or_else(|| DatabaseError::index_out_of_range(index))
    }

    /// Lazily iterate over the rows not fetched yet
    ///
    /// Iteration is single pass: once the result set is exhausted a new
    /// iterator yields nothing.
    pub fn iter(&mut self) -> Rows<'_, C> {
        Rows { view: self }
    }

    /// Release the driver cursor
    ///
    /// Safe to call any number of times; a driver report that the cursor is
    /// already closed is swallowed.
    pub fn close(&mut self) -> Result<()> {
        self.current = None;
        let Some(mut cursor) = self.cursor.take() else {
            return Ok(());
        };
        match cursor.close() {
            Ok(()) => Ok(()),
            Err(DatabaseError::CursorClosed) => {
                debug!("cursor was already closed by the driver");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn next_row(&mut self) -> Option<Result<RowView>> {
        if self.exhausted {
            return None;
        }
        let next = self.cursor.as_ref()?.row_number();
        match self.get(next as isize) {
            Ok(row) => Some(Ok(row.clone())),
            Err(DatabaseError::IndexOutOfRange { .. }) => None,
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

impl<C: DriverCursor> Drop for CursorView<C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to release cursor on drop");
        }
    }
}

impl<C: DriverCursor> std::fmt::Debug for CursorView<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorView")
            .field("row_count", &self.row_count())
            .field("rows_fetched", &self.rows_fetched())
            .field("exhausted", &self.exhausted)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Borrowing iterator returned by [`CursorView::iter`]
pub struct Rows<'a, C: DriverCursor> {
    view: &'a mut CursorView<C>,
}

impl<C: DriverCursor> Iterator for Rows<'_, C> {
    type Item = Result<RowView>;

    fn next(&mut self) -> Option<Self::Item> {
        self.view.next_row()
    }
}

/// Owning iterator; the cursor is released when the iterator is dropped
pub struct IntoRows<C: DriverCursor> {
    view: CursorView<C>,
}

impl<C: DriverCursor> Iterator for IntoRows<C> {
    type Item = Result<RowView>;

    fn next(&mut self) -> Option<Self::Item> {
        self.view.next_row()
    }
}

impl<C: DriverCursor> IntoIterator for CursorView<C> {
    type Item = Result<RowView>;
    type IntoIter = IntoRows<C>;

    fn into_iter(self) -> Self::IntoIter {
        IntoRows { view: self }
    }
}

impl<'a, C: DriverCursor> IntoIterator for &'a mut CursorView<C> {
    type Item = Result<RowView>;
    type IntoIter = Rows<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
