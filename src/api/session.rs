// ==========================================
// Poultry Ledger - Session context
// ==========================================
// The selected batch travels with every call instead of living in
// ambient UI state. Status is always re-derived from a fresh read.
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::types::{BatchStatus, SessionStatus};
use serde::{Deserialize, Serialize};

/// What the front end has selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub selected_batch: Option<String>,
}

impl SessionContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_batch(batch_id: impl Into<String>) -> Self {
        Self {
            selected_batch: Some(batch_id.into()),
        }
    }

    /// Selected id, trimmed; blank counts as nothing selected
    pub fn batch_id(&self) -> Option<&str> {
        self.selected_batch
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A resolved session: `New` when nothing is selected yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSession {
    pub status: SessionStatus,
    pub batch: Option<Batch>,
}

impl BatchSession {
    pub fn new_batch() -> Self {
        Self {
            status: SessionStatus::New,
            batch: None,
        }
    }

    pub fn from_batch(batch: Batch) -> Self {
        Self {
            status: SessionStatus::Batch(batch.status),
            batch: Some(batch),
        }
    }

    pub fn batch_status(&self) -> Option<BatchStatus> {
        match self.status {
            SessionStatus::New => None,
            SessionStatus::Batch(status) => Some(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_selection_is_none() {
        assert_eq!(SessionContext::for_batch("  ").batch_id(), None);
        assert_eq!(SessionContext::for_batch(" B-01 ").batch_id(), Some("B-01"));
        assert_eq!(SessionContext::none().batch_id(), None);
    }

    #[test]
    fn test_session_status() {
        assert_eq!(BatchSession::new_batch().batch_status(), None);
        let session = BatchSession::from_batch(Batch::pre_arrival("B-01"));
        assert_eq!(session.status, SessionStatus::Batch(BatchStatus::PreArrival));
    }
}
