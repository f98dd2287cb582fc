// ==========================================
// Batch lifecycle tests
// ==========================================
// 1. Pre-Arrival -> Active -> Finalized is the only path
// 2. rejected transitions leave the stored status unchanged
// 3. status is re-read from the store on every call
// ==========================================


use poultry_ledger::api::{LedgerError, SessionContext};
use poultry_ledger::config::ledger_schema::dashboard_col;
use poultry_ledger::domain::{BatchStatus, SessionStatus};
use poultry_ledger::store::RowStore;
use test_helpers::*;

#[test]
fn test_create_batch_writes_pre_arrival_row() {
    let (store, ledger) = memory_ledger();

    let batch = ledger.create_batch("B-01").unwrap();
    assert_eq!(batch.status, BatchStatus::PreArrival);

    let rows = store.raw_rows("Dashboard");
    assert_eq!(rows, vec![vec!["B-01", "", "0", "0", "0", "Pre-Arrival"]]);
}

#[test]
fn test_create_batch_rejects_empty_and_duplicate_ids() {
    let (store, ledger) = memory_ledger();
    ledger.create_batch("B-01").unwrap();
    let writes = store.write_calls();

    assert!(matches!(ledger.create_batch(""), Err(LedgerError::Validation(_))));
    assert!(matches!(ledger.create_batch("B-01"), Err(LedgerError::Validation(_))));
    assert!(matches!(ledger.create_batch(" B-01 "), Err(LedgerError::Validation(_))));
    assert_eq!(store.write_calls(), writes);

    // ids are case-sensitive
    assert!(ledger.create_batch("b-01").is_ok());
}

#[test]
fn test_record_arrival_activates_batch() {
    let (store, ledger) = memory_ledger();
    ledger.create_batch("B-01").unwrap();

    let batch = ledger.record_arrival("B-01", &arrival(100, 50)).unwrap();
    assert_eq!(batch.status, BatchStatus::Active);
    assert_eq!(batch.initial_investment, dec(5000));

    let row = &store.raw_rows("Dashboard")[0];
    assert_eq!(row, &vec!["B-01", "10/01/2024", "100", "50", "5000", "Active"]);

    let reread = ledger.get_batch("B-01").unwrap();
    assert_eq!(reread, batch);
}

#[test]
fn test_record_arrival_requires_positive_count() {
    let (store, ledger) = memory_ledger();
    ledger.create_batch("B-01").unwrap();
    let writes = store.write_calls();

    let err = ledger.record_arrival("B-01", &arrival(0, 50)).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(store.write_calls(), writes);
    assert_eq!(ledger.get_batch("B-01").unwrap().status, BatchStatus::PreArrival);
}

#[test]
fn test_arrival_for_unknown_batch_is_not_found() {
    let (_store, ledger) = memory_ledger();
    assert!(matches!(
        ledger.record_arrival("B-404", &arrival(10, 5)),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn test_only_forward_transitions_succeed() {
    let (store, ledger) = memory_ledger();

    // Pre-Arrival: finalize is illegal
    ledger.create_batch("B-01").unwrap();
    let view = ledger.closing_audit("B-01").unwrap();
    let err = ledger.finalize_batch("B-01", &view).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidTransition {
            from: SessionStatus::Batch(BatchStatus::PreArrival),
            to: BatchStatus::Finalized
        }
    ));
    assert_eq!(ledger.get_batch("B-01").unwrap().status, BatchStatus::PreArrival);

    // Active: arrival again is illegal
    ledger.record_arrival("B-01", &arrival(100, 50)).unwrap();
    let writes = store.write_calls();
    assert!(matches!(
        ledger.record_arrival("B-01", &arrival(200, 60)),
        Err(LedgerError::InvalidTransition { .. })
    ));
    assert_eq!(store.write_calls(), writes);
    let batch = ledger.get_batch("B-01").unwrap();
    assert_eq!((batch.status, batch.chick_count), (BatchStatus::Active, 100));

    // Active -> Finalized
    let view = ledger.closing_audit("B-01").unwrap();
    let finalized = ledger.finalize_batch("B-01", &view).unwrap();
    assert_eq!(finalized.status, BatchStatus::Finalized);

    // Finalized: nothing moves
    assert!(matches!(
        ledger.record_arrival("B-01", &arrival(100, 50)),
        Err(LedgerError::InvalidTransition { .. })
    ));
    assert!(matches!(
        ledger.finalize_batch("B-01", &view),
        Err(LedgerError::InvalidTransition { .. })
    ));
    assert_eq!(ledger.get_batch("B-01").unwrap().status, BatchStatus::Finalized);
}

#[test]
fn test_finalize_rejects_audit_of_other_batch() {
    let (_store, ledger) = memory_ledger();
    active_batch(&ledger, "B-01", 100, 50);
    active_batch(&ledger, "B-02", 80, 50);

    let other = ledger.closing_audit("B-02").unwrap();
    assert!(matches!(
        ledger.finalize_batch("B-01", &other),
        Err(LedgerError::Validation(_))
    ));
    assert_eq!(ledger.get_batch("B-01").unwrap().status, BatchStatus::Active);
}

#[test]
fn test_finalize_rejects_stale_audit() {
    let (_store, ledger) = memory_ledger();
    active_batch(&ledger, "B-01", 100, 50);

    let reviewed = ledger.closing_audit("B-01").unwrap();
    ledger.append_mortality("B-01", &mortality(2)).unwrap();

    assert!(matches!(
        ledger.finalize_batch("B-01", &reviewed),
        Err(LedgerError::Validation(_))
    ));
    let fresh = ledger.closing_audit("B-01").unwrap();
    assert!(ledger.finalize_batch("B-01", &fresh).is_ok());
}

#[test]
fn test_status_is_reread_after_external_change() {
    let (store, ledger) = memory_ledger();
    active_batch(&ledger, "B-01", 100, 50);
    assert!(ledger.append_feed("B-01", &feed(1, 400)).is_ok());

    // another operator finalizes the batch directly in the sheet
    store
        .update_field("Dashboard", "B-01", dashboard_col::STATUS, "Finalized")
        .unwrap();

    assert!(matches!(
        ledger.append_feed("B-01", &feed(1, 400)),
        Err(LedgerError::PermissionDenied { .. })
    ));
}

#[test]
fn test_open_session() {
    let (_store, ledger) = memory_ledger();

    let session = ledger.open_session(&SessionContext::none()).unwrap();
    assert_eq!(session.status, SessionStatus::New);
    assert!(session.batch.is_none());

    ledger.create_batch("B-01").unwrap();
    let session = ledger.open_session(&SessionContext::for_batch("B-01")).unwrap();
    assert_eq!(session.status, SessionStatus::Batch(BatchStatus::PreArrival));

    assert!(matches!(
        ledger.open_session(&SessionContext::for_batch("B-02")),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn test_list_batches_in_log_order() {
    let (_store, ledger) = memory_ledger();
    ledger.create_batch("B-02").unwrap();
    active_batch(&ledger, "B-01", 100, 50);

    let batches = ledger.list_batches().unwrap();
    let ids: Vec<&str> = batches.iter().map(|b| b.batch_id.as_str()).collect();
    assert_eq!(ids, vec!["B-02", "B-01"]);
    assert_eq!(batches[1].status, BatchStatus::Active);
}

#[test]
fn test_malformed_status_is_reported() {
    let (store, ledger) = memory_ledger();
    ledger.create_batch("B-01").unwrap();
    store
        .update_field("Dashboard", "B-01", dashboard_col::STATUS, "Closed")
        .unwrap();

    assert!(matches!(
        ledger.get_batch("B-01"),
        Err(LedgerError::MalformedRecord { row: 0, .. })
    ));
}
