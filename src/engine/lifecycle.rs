// ==========================================
// Poultry Ledger - Batch lifecycle engine
// ==========================================
// New -> PreArrival -> Active -> Finalized
// - New is a session pseudostate and is never persisted
// - transitions are one-way; nothing leaves Finalized
// Every function takes the freshly read status as input and returns the
// next batch value; nothing here writes.
// ==========================================

use crate::domain::batch::{ArrivalDetails, Batch};
use crate::domain::types::{BatchStatus, SessionStatus};
use crate::engine::rules::{invalid, RuleResult, RuleViolation};
use rust_decimal::Decimal;

pub struct LifecycleEngine;

impl LifecycleEngine {
    /// The only legal edges of the state machine
    pub fn can_transition(from: SessionStatus, to: BatchStatus) -> bool {
        matches!(
            (from, to),
            (SessionStatus::New, BatchStatus::PreArrival)
                | (SessionStatus::Batch(BatchStatus::PreArrival), BatchStatus::Active)
                | (SessionStatus::Batch(BatchStatus::Active), BatchStatus::Finalized)
        )
    }

    fn require_transition(from: SessionStatus, to: BatchStatus) -> RuleResult<()> {
        if Self::can_transition(from, to) {
            Ok(())
        } else {
            Err(RuleViolation::InvalidTransition { from, to })
        }
    }

    /// New -> PreArrival
    ///
    /// # Arguments
    /// - batch_id: operator-supplied identifier (trimmed)
    /// - existing_ids: identifiers already in the Dashboard log
    ///
    /// # Errors
    /// - Validation: empty identifier, or identifier already in use
    pub fn create(batch_id: &str, existing_ids: &[String]) -> RuleResult<Batch> {
        let batch_id = batch_id.trim();
        if batch_id.is_empty() {
            return invalid("batch id must not be empty");
        }
        if existing_ids.iter().any(|id| id == batch_id) {
            return invalid(format!("batch id {} is already in use", batch_id));
        }
        Self::require_transition(SessionStatus::New, BatchStatus::PreArrival)?;
        Ok(Batch::pre_arrival(batch_id))
    }

    /// PreArrival -> Active: arrival details become fixed
    ///
    /// # Errors
    /// - InvalidTransition: batch is not PreArrival
    /// - Validation: chick count < 1, negative price, or an investment too
    ///   large to represent
    pub fn record_arrival(batch: &Batch, details: &ArrivalDetails) -> RuleResult<Batch> {
        Self::require_transition(batch.status.into(), BatchStatus::Active)?;
        if details.chick_count < 1 {
            return invalid(format!(
                "chick count must be at least 1 (got {})",
                details.chick_count
            ));
        }
        if details.price_per_chick < Decimal::ZERO {
            return invalid("price per chick must not be negative");
        }
        let Some(initial_investment) = details.initial_investment() else {
            return invalid("initial investment (chick count x price) is too large");
        };

        Ok(Batch {
            batch_id: batch.batch_id.clone(),
            arrival_date: Some(details.arrival_date),
            chick_count: details.chick_count,
            price_per_chick: details.price_per_chick,
            initial_investment,
            status: BatchStatus::Active,
        })
    }

    /// Active -> Finalized (irreversible)
    ///
    /// # Errors
    /// - InvalidTransition: batch is not Active
    pub fn finalize(batch: &Batch) -> RuleResult<Batch> {
        Self::require_transition(batch.status.into(), BatchStatus::Finalized)?;
        Ok(Batch {
            status: BatchStatus::Finalized,
            ..batch.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn arrival(count: i64, price: i64) -> ArrivalDetails {
        ArrivalDetails::new(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            count,
            Decimal::from(price),
        )
    }

    #[test]
    fn test_only_forward_edges_are_legal() {
        use BatchStatus::*;
        let all = [PreArrival, Active, Finalized];

        for from in all {
            for to in all {
                let legal = matches!((from, to), (PreArrival, Active) | (Active, Finalized));
                assert_eq!(
                    LifecycleEngine::can_transition(SessionStatus::Batch(from), to),
                    legal,
                    "{from} -> {to}"
                );
            }
        }
        assert!(LifecycleEngine::can_transition(SessionStatus::New, PreArrival));
        assert!(!LifecycleEngine::can_transition(SessionStatus::New, Active));
    }

    #[test]
    fn test_create_trims_and_rejects_duplicates() {
        let batch = LifecycleEngine::create("  B-01 ", &[]).unwrap();
        assert_eq!(batch.batch_id, "B-01");
        assert_eq!(batch.status, BatchStatus::PreArrival);

        let err = LifecycleEngine::create("B-01", &["B-01".to_string()]).unwrap_err();
        assert!(matches!(err, RuleViolation::Validation(_)));

        let err = LifecycleEngine::create("   ", &[]).unwrap_err();
        assert!(matches!(err, RuleViolation::Validation(_)));
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        assert!(LifecycleEngine::create("b-01", &["B-01".to_string()]).is_ok());
    }

    #[test]
    fn test_record_arrival_fixes_details() {
        let batch = Batch::pre_arrival("B-01");
        let active = LifecycleEngine::record_arrival(&batch, &arrival(100, 50)).unwrap();

        assert_eq!(active.status, BatchStatus::Active);
        assert_eq!(active.chick_count, 100);
        assert_eq!(active.initial_investment, Decimal::from(5000));
        assert_eq!(
            active.arrival_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        );
    }

    #[test]
    fn test_record_arrival_validation() {
        let batch = Batch::pre_arrival("B-01");
        assert!(matches!(
            LifecycleEngine::record_arrival(&batch, &arrival(0, 50)),
            Err(RuleViolation::Validation(_))
        ));
        assert!(matches!(
            LifecycleEngine::record_arrival(&batch, &arrival(10, -1)),
            Err(RuleViolation::Validation(_))
        ));
        assert!(LifecycleEngine::record_arrival(&batch, &arrival(10, 0)).is_ok());
    }

    #[test]
    fn test_record_arrival_rejects_unrepresentable_investment() {
        let batch = Batch::pre_arrival("B-01");
        let details = ArrivalDetails::new(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            i64::MAX,
            Decimal::MAX,
        );
        assert!(matches!(
            LifecycleEngine::record_arrival(&batch, &details),
            Err(RuleViolation::Validation(_))
        ));
    }

    #[test]
    fn test_arrival_cannot_be_recorded_twice() {
        let batch = Batch::pre_arrival("B-01");
        let active = LifecycleEngine::record_arrival(&batch, &arrival(100, 50)).unwrap();

        let err = LifecycleEngine::record_arrival(&active, &arrival(200, 50)).unwrap_err();
        assert_eq!(
            err,
            RuleViolation::InvalidTransition {
                from: SessionStatus::Batch(BatchStatus::Active),
                to: BatchStatus::Active,
            }
        );
    }

    #[test]
    fn test_finalize_requires_active() {
        let batch = Batch::pre_arrival("B-01");
        assert!(matches!(
            LifecycleEngine::finalize(&batch),
            Err(RuleViolation::InvalidTransition { .. })
        ));

        let active = LifecycleEngine::record_arrival(&batch, &arrival(100, 50)).unwrap();
        let finalized = LifecycleEngine::finalize(&active).unwrap();
        assert_eq!(finalized.status, BatchStatus::Finalized);
        assert_eq!(finalized.chick_count, 100);

        assert!(matches!(
            LifecycleEngine::finalize(&finalized),
            Err(RuleViolation::InvalidTransition { .. })
        ));
    }
}
