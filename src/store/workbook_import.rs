// ==========================================
// Poultry Ledger - Spreadsheet workbook import
// ==========================================
// Migrates an exported .xlsx of the old spreadsheet dashboard into any
// RowStore: one worksheet per log, first row = headers.
// Columns are matched by header name, so reordered sheets still import.
// ==========================================

use crate::config::LedgerSchema;
use crate::domain::types::LogKind;
use crate::store::error::{StoreError, StoreResult};
use crate::store::row_store::RowStore;
use calamine::{open_workbook, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// WorkbookImportReport
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookImportReport {
    /// (log name, rows appended)
    pub imported: Vec<(String, usize)>,
    /// Logs with no matching worksheet
    pub missing_sheets: Vec<String>,
    /// Schema headers absent from a sheet (imported as empty cells)
    pub missing_columns: Vec<(String, String)>,
}

impl WorkbookImportReport {
    pub fn total_rows(&self) -> usize {
        self.imported.iter().map(|(_, n)| n).sum()
    }
}

/// Reorder one sheet row into schema column order
pub fn align_row(sheet_headers: &[String], row: &[String], columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|col| {
            sheet_headers
                .iter()
                .position(|h| h == *col)
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

/// Import every log sheet of `path` into `store`.
///
/// Rows are appended with `append_rows`, so transactional stores import
/// each sheet atomically.
pub fn import_workbook<P: AsRef<Path>>(
    path: P,
    schema: &LedgerSchema,
    store: &dyn RowStore,
) -> StoreResult<WorkbookImportReport> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(StoreError::Unavailable(format!(
            "workbook {} not found",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| StoreError::Workbook(e.to_string()))?;
    let sheet_names = workbook.sheet_names();

    let mut report = WorkbookImportReport::default();
    for log in [LogKind::Dashboard].into_iter().chain(LogKind::EVENT_LOGS) {
        let log_name = schema.log_name(log).to_string();
        if !sheet_names.iter().any(|s| s == &log_name) {
            report.missing_sheets.push(log_name);
            continue;
        }

        let range = workbook
            .worksheet_range(&log_name)
            .map_err(|e| StoreError::Workbook(e.to_string()))?;
        let mut rows = range.rows();
        let sheet_headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => {
                report.imported.push((log_name, 0));
                continue;
            }
        };

        let columns = schema.columns(log);
        for col in columns {
            if !sheet_headers.iter().any(|h| h == *col) {
                report
                    .missing_columns
                    .push((log_name.clone(), col.to_string()));
            }
        }

        let aligned: Vec<Vec<String>> = rows
            .map(|data_row| {
                data_row
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .map(|cells| align_row(&sheet_headers, &cells, columns))
            .collect();

        let count = if aligned.is_empty() {
            0
        } else {
            store.append_rows(&log_name, &aligned)?
        };
        tracing::info!(log = %log_name, rows = count, "workbook sheet imported");
        report.imported.push((log_name, count));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_store::MemoryRowStore;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_align_row_reorders_by_header() {
        let sheet_headers = strings(&["Batch_ID", "Mortality_Count", "Date"]);
        let row = strings(&["B-01", "3", "01/02/2024"]);

        let aligned = align_row(
            &sheet_headers,
            &row,
            &["Date", "Mortality_Count", "Batch_ID", "Reason"],
        );
        assert_eq!(aligned, strings(&["01/02/2024", "3", "B-01", ""]));
    }

    #[test]
    fn test_missing_workbook_is_unavailable() {
        let schema = LedgerSchema::default();
        let store = MemoryRowStore::with_schema(&schema);
        let result = import_workbook("/nonexistent/farm.xlsx", &schema, &store);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
