// ==========================================
// Poultry Ledger - API layer error type
// ==========================================
// Converts store and rule failures into the error kinds callers act on.
// Every message names the batch, log or row involved.
// ==========================================

use crate::domain::types::{BatchStatus, LogKind, SessionStatus};
use crate::engine::rules::RuleViolation;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    // ==========================================
    // Rejected before any write
    // ==========================================
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid transition: from={from} to={to}")]
    InvalidTransition {
        from: SessionStatus,
        to: BatchStatus,
    },

    #[error("{log} log is not writable while batch is {status}")]
    PermissionDenied { status: BatchStatus, log: LogKind },

    #[error("batch not found: {0}")]
    NotFound(String),

    // ==========================================
    // Store access
    // ==========================================
    #[error("row store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("row store rejected request: {0}")]
    Store(String),

    #[error("malformed row {row} in {log}: {message}")]
    MalformedRecord {
        log: String,
        row: usize,
        message: String,
    },

    // ==========================================
    // Sales grid
    // ==========================================
    #[error("sales submission for {batch_id} partially written: {appended} of {requested} rows")]
    PartialSalesWrite {
        batch_id: String,
        appended: usize,
        requested: usize,
    },

    #[error("batch {batch_id} has an unreviewed partial sales submission ({appended} of {requested} rows)")]
    IncompleteSalesSubmission {
        batch_id: String,
        appended: usize,
        requested: usize,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Errors raised before the store was written to
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::Validation(_)
                | LedgerError::InvalidTransition { .. }
                | LedgerError::PermissionDenied { .. }
                | LedgerError::NotFound(_)
                | LedgerError::IncompleteSalesSubmission { .. }
        )
    }
}

// ==========================================
// From StoreError
// ==========================================
impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::KeyNotFound { log, key } => {
                LedgerError::NotFound(format!("{} (in {})", key, log))
            }
            StoreError::LogMissing(log) => {
                LedgerError::StoreUnavailable(format!("log {} is missing", log))
            }
            StoreError::LockError(msg) => {
                LedgerError::StoreUnavailable(format!("store lock failed: {}", msg))
            }
            err if err.is_unavailable() => LedgerError::StoreUnavailable(err.to_string()),
            err => LedgerError::Store(err.to_string()),
        }
    }
}

// ==========================================
// From RuleViolation
// ==========================================
impl From<RuleViolation> for LedgerError {
    fn from(violation: RuleViolation) -> Self {
        match violation {
            RuleViolation::Validation(msg) => LedgerError::Validation(msg),
            RuleViolation::InvalidTransition { from, to } => {
                LedgerError::InvalidTransition { from, to }
            }
            RuleViolation::PermissionDenied { status, log } => {
                LedgerError::PermissionDenied { status, log }
            }
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
