// ==========================================
// Poultry Ledger - Rule violations
// ==========================================
// Engines are pure: they report what is wrong and never touch the store.
// The api layer converts these into LedgerError.
// ==========================================

use crate::domain::types::{BatchStatus, LogKind, SessionStatus};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid transition: from={from} to={to}")]
    InvalidTransition {
        from: SessionStatus,
        to: BatchStatus,
    },

    #[error("{log} log is not writable while batch is {status}")]
    PermissionDenied { status: BatchStatus, log: LogKind },
}

pub type RuleResult<T> = Result<T, RuleViolation>;

/// Shorthand for a validation failure
pub fn invalid<T>(message: impl Into<String>) -> RuleResult<T> {
    Err(RuleViolation::Validation(message.into()))
}
