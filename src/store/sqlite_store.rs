// ==========================================
// Poultry Ledger - SQLite row store
// ==========================================
// One table per log, one TEXT column per header, insertion order = rowid.
// Cells are kept as text so the store behaves like the spreadsheet it
// replaces; typing happens in the engine's row codec.
// ==========================================

use crate::config::LedgerSchema;
use crate::db::{configure_sqlite_connection, open_sqlite_connection, quote_ident, write_schema_version};
use crate::store::error::{StoreError, StoreResult};
use crate::store::record::Record;
use crate::store::row_store::RowStore;
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteRowStore
// ==========================================
pub struct SqliteRowStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRowStore {
    /// Open (or create) a database file and make sure every log table exists
    pub fn open(db_path: &str, schema: &LedgerSchema) -> StoreResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let store = Self::from_connection(Arc::new(Mutex::new(conn)));
        store.ensure_schema(schema)?;
        tracing::debug!(db_path, "sqlite row store opened");
        Ok(store)
    }

    /// In-memory database, mainly for tests
    pub fn open_in_memory(schema: &LedgerSchema) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_sqlite_connection(&conn)?;
        let store = Self::from_connection(Arc::new(Mutex::new(conn)));
        store.ensure_schema(schema)?;
        Ok(store)
    }

    /// Wrap an existing connection (no tables are created)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    /// Create missing log tables (existing tables are left untouched)
    pub fn ensure_schema(&self, schema: &LedgerSchema) -> StoreResult<()> {
        let conn = self.get_conn()?;
        for (log, headers) in schema.layouts() {
            let columns = headers
                .iter()
                .map(|h| format!("{} TEXT NOT NULL DEFAULT ''", quote_ident(h)))
                .collect::<Vec<_>>()
                .join(", ");
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} ({});",
                quote_ident(&log),
                columns
            ))?;
        }
        write_schema_version(&conn)?;
        Ok(())
    }

    /// Column names of a log table, None if the table does not exist
    fn table_columns(conn: &Connection, log: &str) -> StoreResult<Option<Vec<String>>> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
                params![log],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Ok(None);
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(log)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(columns))
    }

    fn require_columns(conn: &Connection, log: &str) -> StoreResult<Vec<String>> {
        Self::table_columns(conn, log)?.ok_or_else(|| StoreError::LogMissing(log.to_string()))
    }

    fn insert_sql(log: &str, columns: &[String]) -> String {
        let names = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(log),
            names,
            placeholders
        )
    }

    fn check_width(log: &str, columns: &[String], fields: &[String]) -> StoreResult<()> {
        if fields.len() != columns.len() {
            return Err(StoreError::RowWidthMismatch {
                log: log.to_string(),
                expected: columns.len(),
                got: fields.len(),
            });
        }
        Ok(())
    }
}

/// Render any stored SQLite value as cell text
fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).to_string(),
    }
}

impl RowStore for SqliteRowStore {
    fn fetch_all(&self, log: &str) -> StoreResult<Vec<Record>> {
        let conn = self.get_conn()?;
        let columns = match Self::table_columns(&conn, log)? {
            Some(columns) => columns,
            None => return Ok(Vec::new()),
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} ORDER BY rowid ASC",
            quote_ident(log)
        ))?;
        let width = columns.len();
        let records = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(width);
                for i in 0..width {
                    cells.push(cell_text(row.get_ref(i)?));
                }
                Ok(cells)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|cells| Record::from_row(&columns, &cells))
            .collect();

        Ok(records)
    }

    fn append_row(&self, log: &str, fields: &[String]) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let columns = Self::require_columns(&conn, log)?;
        Self::check_width(log, &columns, fields)?;

        conn.execute(&Self::insert_sql(log, &columns), params_from_iter(fields.iter()))?;
        Ok(())
    }

    fn update_field(
        &self,
        log: &str,
        match_key: &str,
        field_index: usize,
        value: &str,
    ) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let columns = Self::require_columns(&conn, log)?;
        let target = columns
            .get(field_index)
            .ok_or_else(|| StoreError::ColumnOutOfRange {
                log: log.to_string(),
                index: field_index,
                width: columns.len(),
            })?;
        let key_column = columns.first().ok_or_else(|| StoreError::ColumnOutOfRange {
            log: log.to_string(),
            index: 0,
            width: 0,
        })?;

        let table = quote_ident(log);
        let changed = conn.execute(
            &format!(
                "UPDATE {table} SET {target} = ?1 WHERE rowid = (
                    SELECT rowid FROM {table}
                    WHERE trim({key}, ' ' || char(9) || char(10) || char(13)) = ?2
                    ORDER BY rowid ASC LIMIT 1
                )",
                table = table,
                target = quote_ident(target),
                key = quote_ident(key_column),
            ),
            params![value, match_key.trim()],
        )?;

        if changed == 0 {
            return Err(StoreError::KeyNotFound {
                log: log.to_string(),
                key: match_key.to_string(),
            });
        }
        Ok(())
    }

    /// All rows in one transaction: either every row lands or none does
    fn append_rows(&self, log: &str, rows: &[Vec<String>]) -> StoreResult<usize> {
        let mut conn = self.get_conn()?;
        let columns = Self::require_columns(&conn, log)?;
        for row in rows {
            Self::check_width(log, &columns, row)?;
        }

        let sql = Self::insert_sql(log, &columns);
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_fetch_preserves_insertion_order() {
        let store = SqliteRowStore::open_in_memory(&LedgerSchema::default()).unwrap();
        store
            .append_row("Mortality_Log", &row(&["01/02/2024", "3", "B-01", ""]))
            .unwrap();
        store
            .append_row("Mortality_Log", &row(&["02/02/2024", "1", "B-01", "heat"]))
            .unwrap();

        let records = store.fetch_all("Mortality_Log").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("Mortality_Count"), "3");
        assert_eq!(records[1].text("Reason"), "heat");
    }

    #[test]
    fn test_absent_table_reads_empty_but_rejects_writes() {
        let store = SqliteRowStore::open_in_memory(&LedgerSchema::default()).unwrap();
        assert!(store.fetch_all("Unknown_Log").unwrap().is_empty());
        assert!(matches!(
            store.append_row("Unknown_Log", &row(&["x"])),
            Err(StoreError::LogMissing(_))
        ));
    }

    #[test]
    fn test_update_field_first_match() {
        let store = SqliteRowStore::open_in_memory(&LedgerSchema::default()).unwrap();
        store
            .append_row("Dashboard", &row(&["B-01", "", "0", "0", "0", "Pre-Arrival"]))
            .unwrap();

        store.update_field("Dashboard", "B-01", 5, "Active").unwrap();
        let records = store.fetch_all("Dashboard").unwrap();
        assert_eq!(records[0].text("Status"), "Active");

        let err = store.update_field("Dashboard", "B-02", 5, "Active").unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound { .. }));

        let err = store.update_field("Dashboard", "B-01", 6, "x").unwrap_err();
        assert!(matches!(err, StoreError::ColumnOutOfRange { index: 6, .. }));
    }

    #[test]
    fn test_update_field_matches_padded_key() {
        let store = SqliteRowStore::open_in_memory(&LedgerSchema::default()).unwrap();
        store
            .append_row("Dashboard", &row(&["\tB-01 ", "", "0", "0", "0", "Pre-Arrival"]))
            .unwrap();

        store.update_field("Dashboard", "B-01", 5, "Active").unwrap();
        store.update_field("Dashboard", " B-01", 1, "10/01/2024").unwrap();

        let records = store.fetch_all("Dashboard").unwrap();
        assert_eq!(records[0].text("Status"), "Active");
        assert_eq!(records[0].text("Arrival_Date"), "10/01/2024");
    }

    #[test]
    fn test_append_rows_is_atomic_on_bad_row() {
        let store = SqliteRowStore::open_in_memory(&LedgerSchema::default()).unwrap();
        let rows = vec![
            row(&["01/02/2024", "3", "B-01", ""]),
            row(&["01/02/2024", "3"]),
        ];

        assert!(store.append_rows("Mortality_Log", &rows).is_err());
        assert!(store.fetch_all("Mortality_Log").unwrap().is_empty());
    }

    #[test]
    fn test_numeric_cells_written_by_other_tools_read_as_text() {
        let store = SqliteRowStore::open_in_memory(&LedgerSchema::default()).unwrap();
        {
            let conn = store.get_conn().unwrap();
            conn.execute(
                "INSERT INTO \"Mortality_Log\" (\"Date\", \"Mortality_Count\", \"Batch_ID\") VALUES ('01/02/2024', 4, 'B-01')",
                [],
            )
            .unwrap();
        }
        let records = store.fetch_all("Mortality_Log").unwrap();
        assert_eq!(records[0].text("Mortality_Count"), "4");
        assert_eq!(records[0].text("Reason"), "");
    }
}
