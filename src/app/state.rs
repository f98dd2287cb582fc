// ==========================================
// Poultry Ledger - Application state
// ==========================================
// Wires a BatchLedger from LedgerConfig by opening the configured row store.
// Locale and logging are process-wide and set by the binary.
// ==========================================

use std::path::Path;

use crate::api::{BatchLedger, LedgerResult};
use crate::config::{LedgerConfig, LedgerSchema, StoreConfig};
use crate::store::{
    import_workbook, CsvRowStore, RowStore, SqliteRowStore, WorkbookImportReport,
};

/// Row store chosen at runtime
pub type DynRowStore = Box<dyn RowStore + Send + Sync>;

pub struct AppState {
    pub config: LedgerConfig,
    pub ledger: BatchLedger<DynRowStore>,
}

impl AppState {
    /// Open the configured store and build the ledger
    ///
    /// # Errors
    /// - StoreUnavailable: the database or directory cannot be opened
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let store = open_store(&config.store, &config.schema)?;

        tracing::info!(
            backend = backend_name(&config.store),
            "ledger ready"
        );
        Ok(Self {
            ledger: BatchLedger::new(store, config.schema.clone()),
            config,
        })
    }

    /// Build state around an already-open store
    pub fn with_store(config: LedgerConfig, store: DynRowStore) -> Self {
        Self {
            ledger: BatchLedger::new(store, config.schema.clone()),
            config,
        }
    }

    /// Copy an exported spreadsheet workbook into the configured store
    pub fn import_workbook<P: AsRef<Path>>(&self, path: P) -> LedgerResult<WorkbookImportReport> {
        let report = import_workbook(path, self.ledger.schema(), self.ledger.store().as_ref())?;
        tracing::info!(rows = report.total_rows(), "workbook imported");
        Ok(report)
    }
}

/// Open the backend named by `store`, creating tables/files for `schema`
pub fn open_store(store: &StoreConfig, schema: &LedgerSchema) -> LedgerResult<DynRowStore> {
    let opened: DynRowStore = match store {
        StoreConfig::Sqlite { path } => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(crate::store::StoreError::from)?;
                }
            }
            Box::new(SqliteRowStore::open(path, schema)?)
        }
        StoreConfig::Csv { dir } => Box::new(CsvRowStore::open(dir, schema)?),
    };
    Ok(opened)
}

fn backend_name(store: &StoreConfig) -> &'static str {
    match store {
        StoreConfig::Sqlite { .. } => "sqlite",
        StoreConfig::Csv { .. } => "csv",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRowStore;
    use tempfile::TempDir;

    #[test]
    fn test_open_sqlite_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ledger.db");
        let config = LedgerConfig {
            store: StoreConfig::Sqlite {
                path: path.to_string_lossy().to_string(),
            },
            ..Default::default()
        };

        let state = AppState::new(config).unwrap();
        assert!(path.exists());
        assert!(state.ledger.list_batches().unwrap().is_empty());
    }

    #[test]
    fn test_open_csv_store() {
        let dir = TempDir::new().unwrap();
        let config = LedgerConfig {
            store: StoreConfig::Csv {
                dir: dir.path().to_string_lossy().to_string(),
            },
            ..Default::default()
        };

        let state = AppState::new(config).unwrap();
        state.ledger.create_batch("B-01").unwrap();
        assert!(dir.path().join("Dashboard.csv").exists());
    }

    #[test]
    fn test_with_store() {
        let config = LedgerConfig::default();
        let store = MemoryRowStore::with_schema(&config.schema);
        let state = AppState::with_store(config, Box::new(store));
        assert_eq!(state.ledger.create_batch("B-01").unwrap().batch_id, "B-01");
    }
}
