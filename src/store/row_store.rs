// ==========================================
// Poultry Ledger - Row store interface
// ==========================================
// The spreadsheet-backed persistence collaborator, reduced to the three
// calls the ledger needs. Stores do no schema or uniqueness validation:
// the ledger validates before every write.
// ==========================================

use crate::store::error::{StoreError, StoreResult};
use crate::store::record::Record;

pub trait RowStore {
    /// Every row of a log, in insertion order.
    ///
    /// # Returns
    /// - Ok(empty): the log is empty or absent
    /// - Err(StoreError::Unavailable): the backend cannot be reached
    fn fetch_all(&self, log: &str) -> StoreResult<Vec<Record>>;

    /// Append one row; `fields` are in the log's column order
    fn append_row(&self, log: &str, fields: &[String]) -> StoreResult<()>;

    /// Set column `field_index` (0-based) of the first row whose first column
    /// equals `match_key`.
    ///
    /// # Errors
    /// - StoreError::KeyNotFound: no row matches
    fn update_field(
        &self,
        log: &str,
        match_key: &str,
        field_index: usize,
        value: &str,
    ) -> StoreResult<()>;

    /// Append several rows.
    ///
    /// The default implementation appends one by one; a failure after some
    /// rows were written is reported as `StoreError::PartialAppend` so the
    /// caller can tell how many landed. Backends with transactions override
    /// this to make the whole batch atomic.
    fn append_rows(&self, log: &str, rows: &[Vec<String>]) -> StoreResult<usize> {
        for (appended, row) in rows.iter().enumerate() {
            if let Err(e) = self.append_row(log, row) {
                if appended == 0 {
                    return Err(e);
                }
                return Err(StoreError::PartialAppend {
                    log: log.to_string(),
                    appended,
                    source: Box::new(e),
                });
            }
        }
        Ok(rows.len())
    }
}

impl<S: RowStore + ?Sized> RowStore for std::sync::Arc<S> {
    fn fetch_all(&self, log: &str) -> StoreResult<Vec<Record>> {
        (**self).fetch_all(log)
    }

    fn append_row(&self, log: &str, fields: &[String]) -> StoreResult<()> {
        (**self).append_row(log, fields)
    }

    fn update_field(
        &self,
        log: &str,
        match_key: &str,
        field_index: usize,
        value: &str,
    ) -> StoreResult<()> {
        (**self).update_field(log, match_key, field_index, value)
    }

    fn append_rows(&self, log: &str, rows: &[Vec<String>]) -> StoreResult<usize> {
        (**self).append_rows(log, rows)
    }
}

impl<S: RowStore + ?Sized> RowStore for Box<S> {
    fn fetch_all(&self, log: &str) -> StoreResult<Vec<Record>> {
        (**self).fetch_all(log)
    }

    fn append_row(&self, log: &str, fields: &[String]) -> StoreResult<()> {
        (**self).append_row(log, fields)
    }

    fn update_field(
        &self,
        log: &str,
        match_key: &str,
        field_index: usize,
        value: &str,
    ) -> StoreResult<()> {
        (**self).update_field(log, match_key, field_index, value)
    }

    fn append_rows(&self, log: &str, rows: &[Vec<String>]) -> StoreResult<usize> {
        (**self).append_rows(log, rows)
    }
}
