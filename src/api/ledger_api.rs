// ==========================================
// Poultry Ledger - Batch ledger API
// ==========================================
// Every operation:
// 1. re-reads the batch row from the Dashboard log (status is never cached)
// 2. gates and validates with the pure engines
// 3. only then calls the row store
// Reads are allowed in every status.
// ==========================================

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::error::{LedgerError, LedgerResult};
use crate::api::session::{BatchSession, SessionContext};
use crate::config::ledger_schema::{dashboard_col, BATCH_ID_COLUMN};
use crate::config::LedgerSchema;
use crate::domain::audit::{ClosingAudit, ClosingAuditView, LogReadFailure};
use crate::domain::batch::{ArrivalDetails, Batch};
use crate::domain::entries::{
    ExpenseEntry, ExpenseInput, FeedEntry, FeedInput, MortalityEntry, MortalityInput,
    SalesEntry, SalesGrid,
};
use crate::domain::types::LogKind;
use crate::engine::aggregation::{BatchLogs, ClosingAuditEngine};
use crate::engine::entry_rules::EntryRules;
use crate::engine::lifecycle::LifecycleEngine;
use crate::engine::permission::{LogPermissions, PermissionGate};
use crate::engine::row_codec;
use crate::engine::sales_grid::SalesGridExpander;
use crate::store::error::StoreError;
use crate::store::record::Record;
use crate::store::row_store::RowStore;

/// A sales submission that stopped part way through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSalesWrite {
    pub appended: usize,
    pub requested: usize,
}

// ==========================================
// BatchLedger
// ==========================================
pub struct BatchLedger<S: RowStore> {
    store: S,
    schema: LedgerSchema,
    /// Batches whose last sales grid was only partly written, until the
    /// operator acknowledges it
    partial_sales: Mutex<HashMap<String, PartialSalesWrite>>,
}

impl<S: RowStore> BatchLedger<S> {
    pub fn new(store: S, schema: LedgerSchema) -> Self {
        Self {
            store,
            schema,
            partial_sales: Mutex::new(HashMap::new()),
        }
    }

    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ==========================================
    // Batches and lifecycle
    // ==========================================

    /// Every batch in the Dashboard log, in log order
    ///
    /// # Errors
    /// - MalformedRecord: a Dashboard row cannot be decoded
    pub fn list_batches(&self) -> LedgerResult<Vec<Batch>> {
        let log = self.schema.log_name(LogKind::Dashboard);
        let records = self.fetch(LogKind::Dashboard)?;

        records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.text(BATCH_ID_COLUMN).is_empty())
            .map(|(row, record)| {
                row_codec::decode_batch(record).map_err(|message| LedgerError::MalformedRecord {
                    log: log.to_string(),
                    row,
                    message,
                })
            })
            .collect()
    }

    /// Fresh read of one batch row
    ///
    /// # Errors
    /// - NotFound: no Dashboard row carries this id
    pub fn get_batch(&self, batch_id: &str) -> LedgerResult<Batch> {
        let batch_id = batch_id.trim();
        let records = self.fetch(LogKind::Dashboard)?;

        let (row, record) = records
            .iter()
            .enumerate()
            .find(|(_, record)| record.text(BATCH_ID_COLUMN) == batch_id)
            .ok_or_else(|| LedgerError::NotFound(batch_id.to_string()))?;

        row_codec::decode_batch(record).map_err(|message| LedgerError::MalformedRecord {
            log: self.schema.log_name(LogKind::Dashboard).to_string(),
            row,
            message,
        })
    }

    /// Resolve the selected batch into a session (`New` when none)
    pub fn open_session(&self, context: &SessionContext) -> LedgerResult<BatchSession> {
        match context.batch_id() {
            None => Ok(BatchSession::new_batch()),
            Some(batch_id) => Ok(BatchSession::from_batch(self.get_batch(batch_id)?)),
        }
    }

    /// New -> PreArrival
    ///
    /// # Errors
    /// - Validation: empty or duplicate id (nothing written)
    pub fn create_batch(&self, batch_id: &str) -> LedgerResult<Batch> {
        let existing: Vec<String> = self
            .fetch(LogKind::Dashboard)?
            .iter()
            .map(|record| record.text(BATCH_ID_COLUMN).to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let batch = LifecycleEngine::create(batch_id, &existing)?;
        self.store.append_row(
            self.schema.log_name(LogKind::Dashboard),
            &row_codec::encode_batch(&batch),
        )?;

        info!(batch_id = %batch.batch_id, status = %batch.status, "batch created");
        Ok(batch)
    }

    /// PreArrival -> Active
    ///
    /// Arrival cells are written before the status cell, so an interrupted
    /// call leaves the batch PreArrival and the call can be repeated.
    pub fn record_arrival(&self, batch_id: &str, details: &ArrivalDetails) -> LedgerResult<Batch> {
        let current = self.get_batch(batch_id)?;
        let updated = LifecycleEngine::record_arrival(&current, details)?;

        let row = row_codec::encode_batch(&updated);
        for col in [
            dashboard_col::ARRIVAL_DATE,
            dashboard_col::CHICK_COUNT,
            dashboard_col::PRICE_PER_CHICK,
            dashboard_col::INITIAL_INVESTMENT,
            dashboard_col::STATUS,
        ] {
            self.update_dashboard(&updated.batch_id, col, &row[col])?;
        }

        info!(
            batch_id = %updated.batch_id,
            chick_count = updated.chick_count,
            initial_investment = %updated.initial_investment,
            "arrival recorded"
        );
        Ok(updated)
    }

    /// Active -> Finalized, after the operator reviewed `reviewed`.
    ///
    /// # Errors
    /// - InvalidTransition: batch is not Active
    /// - Validation: the view is for another batch, is incomplete, or no
    ///   longer matches the logs
    /// - IncompleteSalesSubmission: a partial sales write is unacknowledged
    pub fn finalize_batch(
        &self,
        batch_id: &str,
        reviewed: &ClosingAuditView,
    ) -> LedgerResult<Batch> {
        let current = self.get_batch(batch_id)?;
        let finalized = LifecycleEngine::finalize(&current)?;

        let batch_id = current.batch_id.as_str();
        if reviewed.audit.batch_id != batch_id {
            return Err(LedgerError::Validation(format!(
                "closing audit is for {}, not {}",
                reviewed.audit.batch_id, batch_id
            )));
        }
        if !reviewed.is_complete() {
            return Err(LedgerError::Validation(format!(
                "closing audit for {} is incomplete ({} log(s) unreadable)",
                batch_id,
                reviewed.read_failures.len()
            )));
        }

        let fresh = self.closing_audit(batch_id)?;
        if !fresh.is_complete() || fresh.audit != reviewed.audit {
            return Err(LedgerError::Validation(format!(
                "logs for {} changed since the closing audit was reviewed",
                batch_id
            )));
        }

        self.update_dashboard(
            &finalized.batch_id,
            dashboard_col::STATUS,
            finalized.status.to_db_str(),
        )?;

        info!(
            batch_id = %finalized.batch_id,
            remaining_inventory = fresh.audit.remaining_inventory,
            net_total = %fresh.audit.net_total,
            "batch finalized"
        );
        Ok(finalized)
    }

    // ==========================================
    // Event log writes
    // ==========================================

    /// Which logs the batch may write to now, with the lock notice key
    pub fn permissions(&self, batch_id: &str) -> LedgerResult<LogPermissions> {
        let batch = self.get_batch(batch_id)?;
        Ok(self.gate().permissions(&batch.batch_id, batch.status))
    }

    pub fn append_feed(&self, batch_id: &str, input: &FeedInput) -> LedgerResult<FeedEntry> {
        let batch = self.writable_batch(batch_id, LogKind::Feed)?;
        let entry = EntryRules::feed(input, &batch.batch_id)?;

        self.append(LogKind::Feed, &row_codec::encode_feed(&entry))?;
        info!(
            batch_id = %entry.batch_id,
            action = ?entry.action(),
            bags = entry.bags,
            line_total = %entry.line_total,
            "feed entry appended"
        );
        Ok(entry)
    }

    pub fn append_mortality(
        &self,
        batch_id: &str,
        input: &MortalityInput,
    ) -> LedgerResult<MortalityEntry> {
        let batch = self.writable_batch(batch_id, LogKind::Mortality)?;
        let entry = EntryRules::mortality(input, &batch.batch_id)?;

        self.append(LogKind::Mortality, &row_codec::encode_mortality(&entry))?;
        info!(batch_id = %entry.batch_id, count = entry.count, "mortality entry appended");
        Ok(entry)
    }

    pub fn append_expense(
        &self,
        batch_id: &str,
        input: &ExpenseInput,
    ) -> LedgerResult<ExpenseEntry> {
        let batch = self.writable_batch(batch_id, LogKind::Expense)?;
        let entry = EntryRules::expense(input, &batch.batch_id, &self.schema)?;

        self.append(LogKind::Expense, &row_codec::encode_expense(&entry))?;
        info!(
            batch_id = %entry.batch_id,
            category = %entry.category,
            amount = %entry.amount,
            "expense entry appended"
        );
        Ok(entry)
    }

    /// Append a whole sales grid.
    ///
    /// Every container is validated first; then all rows go to the store in
    /// one `append_rows` call.
    ///
    /// # Errors
    /// - PartialSalesWrite: the store stopped part way; the batch is marked
    ///   and its closing audit is refused until `acknowledge_partial_sales`
    pub fn append_sales_grid(
        &self,
        batch_id: &str,
        grid: &SalesGrid,
    ) -> LedgerResult<Vec<SalesEntry>> {
        let batch = self.writable_batch(batch_id, LogKind::Sales)?;
        let entries = SalesGridExpander::expand(grid, &batch.batch_id)?;
        let rows: Vec<Vec<String>> = entries.iter().map(row_codec::encode_sales).collect();
        let requested = rows.len();

        let log = self.schema.log_name(LogKind::Sales);
        debug!(log = %log, rows = requested, "appending sales grid");
        let appended = match self.store.append_rows(log, &rows) {
            Ok(appended) => appended,
            Err(StoreError::PartialAppend {
                appended, source, ..
            }) => {
                warn!(
                    batch_id = %batch.batch_id,
                    appended,
                    requested,
                    error = %source,
                    "sales grid partially written"
                );
                return Err(self.mark_partial_sales(&batch.batch_id, appended, requested));
            }
            Err(e) => return Err(e.into()),
        };
        if appended != requested {
            warn!(batch_id = %batch.batch_id, appended, requested, "sales grid short write");
            return Err(self.mark_partial_sales(&batch.batch_id, appended, requested));
        }

        info!(
            batch_id = %batch.batch_id,
            trips = grid.trips.len(),
            rows = appended,
            "sales grid appended"
        );
        Ok(entries)
    }

    /// The partial sales write awaiting review, if any
    pub fn pending_partial_sales(&self, batch_id: &str) -> LedgerResult<Option<PartialSalesWrite>> {
        Ok(self.partial_sales()?.get(batch_id.trim()).copied())
    }

    /// Clear the partial-write marker once the operator has reviewed or
    /// compensated the Sales log
    pub fn acknowledge_partial_sales(
        &self,
        batch_id: &str,
    ) -> LedgerResult<Option<PartialSalesWrite>> {
        let cleared = self.partial_sales()?.remove(batch_id.trim());
        if let Some(partial) = cleared {
            info!(
                batch_id = %batch_id.trim(),
                appended = partial.appended,
                requested = partial.requested,
                "partial sales write acknowledged"
            );
        }
        Ok(cleared)
    }

    // ==========================================
    // Reads
    // ==========================================

    pub fn list_feed(&self, batch_id: &str) -> LedgerResult<Vec<FeedEntry>> {
        self.read_entries(LogKind::Feed, batch_id, row_codec::decode_feed)
    }

    pub fn list_mortality(&self, batch_id: &str) -> LedgerResult<Vec<MortalityEntry>> {
        self.read_entries(LogKind::Mortality, batch_id, row_codec::decode_mortality)
    }

    pub fn list_sales(&self, batch_id: &str) -> LedgerResult<Vec<SalesEntry>> {
        self.read_entries(LogKind::Sales, batch_id, row_codec::decode_sales)
    }

    pub fn list_expenses(&self, batch_id: &str) -> LedgerResult<Vec<ExpenseEntry>> {
        self.read_entries(LogKind::Expense, batch_id, row_codec::decode_expense)
    }

    /// Closing audit of a batch.
    ///
    /// The Dashboard row must be readable. An event log that fails to read,
    /// fails to decode, or sums out of range counts as empty and is listed in
    /// `read_failures`.
    ///
    /// # Errors
    /// - IncompleteSalesSubmission: an unacknowledged partial sales write
    pub fn closing_audit(&self, batch_id: &str) -> LedgerResult<ClosingAuditView> {
        if let Some(partial) = self.pending_partial_sales(batch_id)? {
            return Err(LedgerError::IncompleteSalesSubmission {
                batch_id: batch_id.trim().to_string(),
                appended: partial.appended,
                requested: partial.requested,
            });
        }

        let batch = self.get_batch(batch_id)?;
        let id = batch.batch_id.as_str();
        let mut read_failures = Vec::new();

        let mut logs = BatchLogs {
            feed: degrade(
                self.read_entries(LogKind::Feed, id, row_codec::decode_feed),
                LogKind::Feed,
                &mut read_failures,
            ),
            mortality: degrade(
                self.read_entries(LogKind::Mortality, id, row_codec::decode_mortality),
                LogKind::Mortality,
                &mut read_failures,
            ),
            sales: degrade(
                self.read_entries(LogKind::Sales, id, row_codec::decode_sales),
                LogKind::Sales,
                &mut read_failures,
            ),
            expenses: degrade(
                self.read_entries(LogKind::Expense, id, row_codec::decode_expense),
                LogKind::Expense,
                &mut read_failures,
            ),
        };

        // a log whose totals overflow is degraded like an unreadable one
        let audit: ClosingAudit = loop {
            match ClosingAuditEngine::compute(&batch, &logs, &self.schema.expense_categories) {
                Ok(audit) => break audit,
                Err(overflow) => {
                    warn!(
                        batch_id = %id,
                        log = %overflow.log,
                        error = %overflow,
                        "log totals out of range, counted as empty"
                    );
                    logs.clear(overflow.log);
                    read_failures.push(LogReadFailure {
                        log: overflow.log,
                        message: overflow.to_string(),
                    });
                }
            }
        };
        if audit.has_inventory_deficit() {
            warn!(
                batch_id = %id,
                remaining_inventory = audit.remaining_inventory,
                "logged deaths and sales exceed initial chick count"
            );
        }
        debug!(batch_id = %id, failures = read_failures.len(), "closing audit computed");

        Ok(ClosingAuditView {
            audit,
            read_failures,
        })
    }

    // ==========================================
    // Internals
    // ==========================================

    fn gate(&self) -> PermissionGate<'_> {
        PermissionGate::new(&self.schema.permissions)
    }

    /// Fresh batch row, gated for a write to `log`
    fn writable_batch(&self, batch_id: &str, log: LogKind) -> LedgerResult<Batch> {
        let batch = self.get_batch(batch_id)?;
        if let Err(violation) = self.gate().check_write(batch.status, log) {
            warn!(batch_id = %batch.batch_id, status = %batch.status, log = %log, "write rejected");
            return Err(violation.into());
        }
        Ok(batch)
    }

    fn fetch(&self, log: LogKind) -> LedgerResult<Vec<Record>> {
        let name = self.schema.log_name(log);
        debug!(log = %name, "fetch_all");
        Ok(self.store.fetch_all(name)?)
    }

    fn append(&self, log: LogKind, fields: &[String]) -> LedgerResult<()> {
        let name = self.schema.log_name(log);
        debug!(log = %name, "append_row");
        Ok(self.store.append_row(name, fields)?)
    }

    fn update_dashboard(&self, batch_id: &str, col: usize, value: &str) -> LedgerResult<()> {
        let name = self.schema.log_name(LogKind::Dashboard);
        debug!(log = %name, batch_id = %batch_id, col, "update_field");
        Ok(self.store.update_field(name, batch_id, col, value)?)
    }

    fn read_entries<T>(
        &self,
        log: LogKind,
        batch_id: &str,
        decode: fn(&Record) -> Result<T, String>,
    ) -> LedgerResult<Vec<T>> {
        let records = self.fetch(log)?;
        row_codec::decode_for_batch(&records, batch_id.trim(), decode).map_err(|(row, message)| {
            LedgerError::MalformedRecord {
                log: self.schema.log_name(log).to_string(),
                row,
                message,
            }
        })
    }

    fn partial_sales(&self) -> LedgerResult<MutexGuard<'_, HashMap<String, PartialSalesWrite>>> {
        self.partial_sales
            .lock()
            .map_err(|e| LedgerError::Internal(format!("partial sales lock: {}", e)))
    }

    fn mark_partial_sales(&self, batch_id: &str, appended: usize, requested: usize) -> LedgerError {
        if let Ok(mut pending) = self.partial_sales.lock() {
            pending.insert(
                batch_id.to_string(),
                PartialSalesWrite {
                    appended,
                    requested,
                },
            );
        }
        LedgerError::PartialSalesWrite {
            batch_id: batch_id.to_string(),
            appended,
            requested,
        }
    }
}

/// Unreadable log -> empty, with the failure recorded
fn degrade<T>(
    result: LedgerResult<Vec<T>>,
    log: LogKind,
    failures: &mut Vec<LogReadFailure>,
) -> Vec<T> {
    match result {
        Ok(entries) => entries,
        Err(e) => {
            warn!(log = %log, error = %e, "log unreadable, counted as empty");
            failures.push(LogReadFailure {
                log,
                message: e.to_string(),
            });
            Vec::new()
        }
    }
}
