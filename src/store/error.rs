// ==========================================
// Poultry Ledger - Row store error type
// ==========================================
// Tool: thiserror
// ==========================================

use thiserror::Error;

/// Row store error
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== Availability =====
    #[error("row store unavailable: {0}")]
    Unavailable(String),

    #[error("log not found in store: {0}")]
    LogMissing(String),

    #[error("row store is read-only: {0}")]
    ReadOnly(String),

    // ===== Lookup =====
    #[error("no row in {log} with key={key}")]
    KeyNotFound { log: String, key: String },

    #[error("column index {index} out of range for {log} ({width} columns)")]
    ColumnOutOfRange {
        log: String,
        index: usize,
        width: usize,
    },

    // ===== Writes =====
    #[error("append to {log} stopped after {appended} row(s): {source}")]
    PartialAppend {
        log: String,
        appended: usize,
        #[source]
        source: Box<StoreError>,
    },

    #[error("row width {got} does not match {log} layout ({expected} columns)")]
    RowWidthMismatch {
        log: String,
        expected: usize,
        got: usize,
    },

    // ===== Backend =====
    #[error("database error: {0}")]
    Database(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lock poisoned: {0}")]
    LockError(String),
}

impl StoreError {
    /// Connection-level failures, as opposed to a bad request against a
    /// reachable store
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_)
            | StoreError::LogMissing(_)
            | StoreError::Io(_)
            | StoreError::LockError(_)
            | StoreError::Database(_) => true,
            StoreError::PartialAppend { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::CannotOpen
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                    || code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Unavailable(msg.unwrap_or_else(|| code.to_string()))
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => StoreError::Io(io),
                other => StoreError::Csv(format!("{:?}", other)),
            }
        } else {
            StoreError::Csv(err.to_string())
        }
    }
}

/// Result alias
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_append_reports_inner_availability() {
        let err = StoreError::PartialAppend {
            log: "Sales_Log".to_string(),
            appended: 2,
            source: Box::new(StoreError::Unavailable("network".to_string())),
        };
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("2 row(s)"));
    }

    #[test]
    fn test_key_not_found_is_not_unavailable() {
        let err = StoreError::KeyNotFound {
            log: "Dashboard".to_string(),
            key: "B-9".to_string(),
        };
        assert!(!err.is_unavailable());
    }
}
