// ==========================================
// Poultry Ledger - CSV row store
// ==========================================
// A directory standing in for the spreadsheet: one `<log>.csv` per tab,
// first line = headers. A missing file is an empty log; a missing
// directory means the store is unavailable.
// ==========================================

use crate::config::LedgerSchema;
use crate::store::error::{StoreError, StoreResult};
use crate::store::record::Record;
use crate::store::row_store::RowStore;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct CsvRowStore {
    dir: PathBuf,
}

impl CsvRowStore {
    /// Open a store directory, creating it and any missing log files
    pub fn open<P: AsRef<Path>>(dir: P, schema: &LedgerSchema) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let store = Self { dir };
        for (log, headers) in schema.layouts() {
            let path = store.log_path(&log);
            if !path.exists() {
                let mut writer = WriterBuilder::new().from_path(&path)?;
                writer.write_record(&headers)?;
                writer.flush()?;
            }
        }
        tracing::debug!(dir = %store.dir.display(), "csv row store opened");
        Ok(store)
    }

    /// Attach to an existing directory without creating anything
    pub fn attach<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn log_path(&self, log: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", log))
    }

    fn check_dir(&self) -> StoreResult<()> {
        if !self.dir.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "store directory {} not found",
                self.dir.display()
            )));
        }
        Ok(())
    }

    /// Headers and raw rows of an existing log file
    fn read_table(&self, path: &Path) -> StoreResult<(Vec<String>, Vec<Vec<String>>)> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            // blank lines left by hand edits
            if row.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            rows.push(row);
        }
        Ok((headers, rows))
    }

    fn existing_log(&self, log: &str) -> StoreResult<PathBuf> {
        self.check_dir()?;
        let path = self.log_path(log);
        if !path.is_file() {
            return Err(StoreError::LogMissing(log.to_string()));
        }
        Ok(path)
    }

    fn header_width(&self, path: &Path) -> StoreResult<usize> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
        Ok(reader.headers()?.len())
    }
}

impl RowStore for CsvRowStore {
    fn fetch_all(&self, log: &str) -> StoreResult<Vec<Record>> {
        self.check_dir()?;
        let path = self.log_path(log);
        if !path.is_file() {
            return Ok(Vec::new());
        }

        let (headers, rows) = self.read_table(&path)?;
        Ok(rows
            .iter()
            .map(|row| Record::from_row(&headers, row))
            .collect())
    }

    fn append_row(&self, log: &str, fields: &[String]) -> StoreResult<()> {
        let path = self.existing_log(log)?;
        let width = self.header_width(&path)?;
        if fields.len() != width {
            return Err(StoreError::RowWidthMismatch {
                log: log.to_string(),
                expected: width,
                got: fields.len(),
            });
        }

        let file = OpenOptions::new().append(true).open(&path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(fields)?;
        writer.flush()?;
        Ok(())
    }

    fn update_field(
        &self,
        log: &str,
        match_key: &str,
        field_index: usize,
        value: &str,
    ) -> StoreResult<()> {
        let path = self.existing_log(log)?;
        let (headers, mut rows) = self.read_table(&path)?;
        if field_index >= headers.len() {
            return Err(StoreError::ColumnOutOfRange {
                log: log.to_string(),
                index: field_index,
                width: headers.len(),
            });
        }

        let row = rows
            .iter_mut()
            .find(|row| row.first().map(|k| k.trim()) == Some(match_key.trim()))
            .ok_or_else(|| StoreError::KeyNotFound {
                log: log.to_string(),
                key: match_key.to_string(),
            })?;
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }
        row[field_index] = value.to_string();

        replace_table(&path, &headers, &rows)
    }
}

/// Write-then-rename so a crash never leaves a truncated tab. The temp
/// file is removed when the write or the rename fails.
fn replace_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> StoreResult<()> {
    let tmp = path.with_extension(format!("csv.{}.tmp", Uuid::new_v4().simple()));
    let written = write_table(&tmp, headers, rows)
        .and_then(|()| fs::rename(&tmp, path).map_err(StoreError::from));
    if written.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::debug!(path = %tmp.display(), error = %e, "temp file not removed");
        }
    }
    written
}

fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> StoreResult<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_open_creates_header_files() {
        let dir = TempDir::new().unwrap();
        let _store = CsvRowStore::open(dir.path(), &LedgerSchema::default()).unwrap();

        let raw = fs::read_to_string(dir.path().join("Sales_Log.csv")).unwrap();
        assert!(raw.starts_with("Date,Trip_No,Container_No,Bird_Count"));
    }

    #[test]
    fn test_append_and_update() {
        let dir = TempDir::new().unwrap();
        let store = CsvRowStore::open(dir.path(), &LedgerSchema::default()).unwrap();

        store
            .append_row("Dashboard", &row(&["B-01", "", "0", "0", "0", "Pre-Arrival"]))
            .unwrap();
        store
            .append_row("Dashboard", &row(&["B-02", "", "0", "0", "0", "Pre-Arrival"]))
            .unwrap();
        store.update_field("Dashboard", "B-02", 5, "Active").unwrap();

        let records = store.fetch_all("Dashboard").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("Status"), "Pre-Arrival");
        assert_eq!(records[1].text("Status"), "Active");
    }

    fn temp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }

    #[test]
    fn test_update_matches_padded_key() {
        let dir = TempDir::new().unwrap();
        let store = CsvRowStore::open(dir.path(), &LedgerSchema::default()).unwrap();
        store
            .append_row("Dashboard", &row(&["B-01 ", "", "0", "0", "0", "Pre-Arrival"]))
            .unwrap();

        store.update_field("Dashboard", " B-01", 5, "Active").unwrap();

        let records = store.fetch_all("Dashboard").unwrap();
        assert_eq!(records[0].text("Status"), "Active");
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_replace_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // a non-empty directory where the tab should be makes the rename fail
        let target = dir.path().join("Dashboard.csv");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let headers = row(&["Batch_ID", "Status"]);
        let rows = vec![row(&["B-01", "Active"])];
        assert!(replace_table(&target, &headers, &rows).is_err());

        assert!(temp_files(dir.path()).is_empty());
        assert!(target.join("keep").is_file());
    }

    #[test]
    fn test_cells_with_commas_survive() {
        let dir = TempDir::new().unwrap();
        let store = CsvRowStore::open(dir.path(), &LedgerSchema::default()).unwrap();
        store
            .append_row(
                "Mortality_Log",
                &row(&["01/02/2024", "2", "B-01", "heat, low water"]),
            )
            .unwrap();

        let records = store.fetch_all("Mortality_Log").unwrap();
        assert_eq!(records[0].text("Reason"), "heat, low water");
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = CsvRowStore::attach(dir.path().join("gone"));
        assert!(matches!(
            store.fetch_all("Dashboard"),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvRowStore::attach(dir.path());
        assert!(store.fetch_all("Feed_Log").unwrap().is_empty());
        assert!(matches!(
            store.append_row("Feed_Log", &row(&["x"])),
            Err(StoreError::LogMissing(_))
        ));
    }
}
