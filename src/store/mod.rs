// ==========================================
// Poultry Ledger - Row store layer
// ==========================================
// The external persistence collaborator: append-only logs of text rows.
// Stores hold no ledger rules; validation happens before any write.
// ==========================================

pub mod csv_store;
pub mod error;
pub mod memory_store;
pub mod record;
pub mod row_store;
pub mod sqlite_store;
pub mod workbook_import;

pub use csv_store::CsvRowStore;
pub use error::{StoreError, StoreResult};
pub use memory_store::MemoryRowStore;
pub use record::{format_date, parse_date_cell, Record, SHEET_DATE_FORMAT};
pub use row_store::RowStore;
pub use sqlite_store::SqliteRowStore;
pub use workbook_import::{import_workbook, WorkbookImportReport};
