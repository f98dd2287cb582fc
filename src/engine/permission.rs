// ==========================================
// Poultry Ledger - Write permission gate
// ==========================================
// Reads are always allowed. Writes consult the configured matrix with the
// status read fresh for this call.
// ==========================================

use crate::config::PermissionMatrix;
use crate::domain::types::{BatchStatus, LogKind};
use crate::engine::rules::{RuleResult, RuleViolation};
use serde::{Deserialize, Serialize};

/// Which logs a batch may write to right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPermissions {
    pub batch_id: String,
    pub status: BatchStatus,
    pub writable: Vec<LogKind>,
    /// i18n key of the banner a front end shows over locked tabs
    pub notice_key: Option<String>,
}

impl LogPermissions {
    pub fn can_write(&self, log: LogKind) -> bool {
        self.writable.contains(&log)
    }
}

pub struct PermissionGate<'a> {
    matrix: &'a PermissionMatrix,
}

impl<'a> PermissionGate<'a> {
    pub fn new(matrix: &'a PermissionMatrix) -> Self {
        Self { matrix }
    }

    /// Reject a write to `log` for a batch in `status`
    pub fn check_write(&self, status: BatchStatus, log: LogKind) -> RuleResult<()> {
        if self.matrix.allows_write(status, log) {
            Ok(())
        } else {
            Err(RuleViolation::PermissionDenied { status, log })
        }
    }

    pub fn permissions(&self, batch_id: &str, status: BatchStatus) -> LogPermissions {
        LogPermissions {
            batch_id: batch_id.to_string(),
            status,
            writable: self.matrix.writable_logs(status),
            notice_key: lock_notice_key(status).map(str::to_string),
        }
    }
}

/// Banner for gating states; Active has none
pub fn lock_notice_key(status: BatchStatus) -> Option<&'static str> {
    match status {
        BatchStatus::PreArrival => Some("notice.locked_pre_arrival"),
        BatchStatus::Active => None,
        BatchStatus::Finalized => Some("notice.read_only"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matrix() {
        let matrix = PermissionMatrix::default();
        let gate = PermissionGate::new(&matrix);

        let expected = [
            (BatchStatus::PreArrival, [false, false, false, true]),
            (BatchStatus::Active, [true, true, true, true]),
            (BatchStatus::Finalized, [false, false, false, false]),
        ];
        for (status, row) in expected {
            for (log, allowed) in LogKind::EVENT_LOGS.into_iter().zip(row) {
                assert_eq!(
                    gate.check_write(status, log).is_ok(),
                    allowed,
                    "{status} / {log}"
                );
            }
        }
    }

    #[test]
    fn test_denial_names_status_and_log() {
        let matrix = PermissionMatrix::default();
        let err = PermissionGate::new(&matrix)
            .check_write(BatchStatus::Finalized, LogKind::Expense)
            .unwrap_err();
        assert_eq!(
            err,
            RuleViolation::PermissionDenied {
                status: BatchStatus::Finalized,
                log: LogKind::Expense,
            }
        );
    }

    #[test]
    fn test_permissions_view() {
        let matrix = PermissionMatrix::default();
        let gate = PermissionGate::new(&matrix);

        let view = gate.permissions("B-01", BatchStatus::PreArrival);
        assert_eq!(view.writable, vec![LogKind::Expense]);
        assert!(view.can_write(LogKind::Expense));
        assert!(!view.can_write(LogKind::Feed));
        assert_eq!(view.notice_key.as_deref(), Some("notice.locked_pre_arrival"));

        let view = gate.permissions("B-01", BatchStatus::Active);
        assert!(view.notice_key.is_none());
        assert_eq!(view.writable.len(), 4);
    }
}
