// ==========================================
// Poultry Ledger - In-memory row store
// ==========================================
// Used by tests and dry runs. Supports fault injection so that degraded
// reads and partial sales-grid writes can be exercised deterministically.
// ==========================================

use crate::config::LedgerSchema;
use crate::store::error::{StoreError, StoreResult};
use crate::store::record::Record;
use crate::store::row_store::RowStore;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct Faults {
    /// Logs whose every call fails with Unavailable
    unavailable: HashSet<String>,
    /// Whole store offline
    offline: bool,
    /// Remaining appends before every further append fails
    appends_left: Option<usize>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Table>,
    faults: Faults,
    write_calls: usize,
}

// ==========================================
// MemoryRowStore
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    inner: Mutex<Inner>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with an empty log for every layout in `schema`
    pub fn with_schema(schema: &LedgerSchema) -> Self {
        let store = Self::new();
        for (name, headers) in schema.layouts() {
            store.register_log(&name, headers);
        }
        store
    }

    /// Create (or reset the headers of) a log
    pub fn register_log(&self, log: &str, headers: Vec<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            let table = inner.tables.entry(log.to_string()).or_default();
            table.headers = headers;
        }
    }

    pub fn has_log(&self, log: &str) -> bool {
        self.lock()
            .map(|inner| inner.tables.contains_key(log))
            .unwrap_or(false)
    }

    // ==========================================
    // Fault injection
    // ==========================================

    /// Make every call against `log` fail with `Unavailable`
    pub fn set_unavailable(&self, log: &str, unavailable: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            if unavailable {
                inner.faults.unavailable.insert(log.to_string());
            } else {
                inner.faults.unavailable.remove(log);
            }
        }
    }

    /// Take the whole store offline (or back online)
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.faults.offline = offline;
        }
    }

    /// Allow `n` more successful appends, then fail every append
    pub fn fail_appends_after(&self, n: usize) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.faults.appends_left = Some(n);
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.faults = Faults::default();
        }
    }

    /// Number of append/update calls received (successful or not)
    pub fn write_calls(&self) -> usize {
        self.lock().map(|inner| inner.write_calls).unwrap_or(0)
    }

    /// Raw rows of a log, for assertions
    pub fn raw_rows(&self, log: &str) -> Vec<Vec<String>> {
        self.lock()
            .ok()
            .and_then(|inner| inner.tables.get(log).map(|t| t.rows.clone()))
            .unwrap_or_default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    fn check_available(inner: &Inner, log: &str) -> StoreResult<()> {
        if inner.faults.offline {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        if inner.faults.unavailable.contains(log) {
            return Err(StoreError::Unavailable(format!("{} unreachable", log)));
        }
        Ok(())
    }
}

impl RowStore for MemoryRowStore {
    fn fetch_all(&self, log: &str) -> StoreResult<Vec<Record>> {
        let inner = self.lock()?;
        Self::check_available(&inner, log)?;

        let records = match inner.tables.get(log) {
            Some(table) => table
                .rows
                .iter()
                .map(|row| Record::from_row(&table.headers, row))
                .collect(),
            None => Vec::new(),
        };
        Ok(records)
    }

    fn append_row(&self, log: &str, fields: &[String]) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.write_calls += 1;
        Self::check_available(&inner, log)?;

        let appends_left = inner.faults.appends_left;
        match appends_left {
            Some(0) => {
                return Err(StoreError::Unavailable(format!(
                    "append to {} failed (injected)",
                    log
                )))
            }
            Some(n) => inner.faults.appends_left = Some(n - 1),
            None => {}
        }

        let table = inner
            .tables
            .get_mut(log)
            .ok_or_else(|| StoreError::LogMissing(log.to_string()))?;
        if fields.len() != table.headers.len() {
            return Err(StoreError::RowWidthMismatch {
                log: log.to_string(),
                expected: table.headers.len(),
                got: fields.len(),
            });
        }
        table.rows.push(fields.to_vec());
        Ok(())
    }

    fn update_field(
        &self,
        log: &str,
        match_key: &str,
        field_index: usize,
        value: &str,
    ) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.write_calls += 1;
        Self::check_available(&inner, log)?;

        let table = inner
            .tables
            .get_mut(log)
            .ok_or_else(|| StoreError::LogMissing(log.to_string()))?;
        let width = table.headers.len();
        if field_index >= width {
            return Err(StoreError::ColumnOutOfRange {
                log: log.to_string(),
                index: field_index,
                width,
            });
        }

        let row = table
            .rows
            .iter_mut()
            .find(|row| row.first().map(|k| k.trim()) == Some(match_key.trim()))
            .ok_or_else(|| StoreError::KeyNotFound {
                log: log.to_string(),
                key: match_key.to_string(),
            })?;
        row[field_index] = value.to_string();
        Ok(())
    }
}
