// ==========================================
// Poultry Ledger - Closing audit fold
// ==========================================
// Pure read-side fold over the four event logs for one batch.
// - remaining inventory is never clamped; a negative value is shown as-is
// - net total = revenue - feed cost; expense-log costs stay un-netted
// - expense categories match by exact label
// ==========================================

use crate::domain::audit::{CategoryTotal, ClosingAudit};
use crate::domain::batch::Batch;
use crate::domain::entries::{ExpenseEntry, FeedEntry, MortalityEntry, SalesEntry};
use crate::domain::types::LogKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded log contents handed to the fold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchLogs {
    pub feed: Vec<FeedEntry>,
    pub mortality: Vec<MortalityEntry>,
    pub sales: Vec<SalesEntry>,
    pub expenses: Vec<ExpenseEntry>,
}

impl BatchLogs {
    /// Drop every entry of one log
    pub fn clear(&mut self, log: LogKind) {
        match log {
            LogKind::Feed => self.feed.clear(),
            LogKind::Mortality => self.mortality.clear(),
            LogKind::Sales => self.sales.clear(),
            LogKind::Expense => self.expenses.clear(),
            LogKind::Dashboard => {}
        }
    }
}

/// A total that does not fit its numeric type; `log` is the log whose
/// values pushed it out of range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{log} {total} out of range")]
pub struct AuditOverflow {
    pub log: LogKind,
    pub total: &'static str,
}

fn overflow(log: LogKind, total: &'static str) -> AuditOverflow {
    AuditOverflow { log, total }
}

pub struct ClosingAuditEngine;

impl ClosingAuditEngine {
    /// Compute the closing audit of `batch`.
    ///
    /// Entries tagged with any other batch id are ignored, so callers may
    /// pass whole logs.
    ///
    /// # Arguments
    /// - batch: the Dashboard row (initial count and investment)
    /// - logs: event log entries
    /// - categories: expense categories reported individually, in order
    ///
    /// # Errors
    /// - AuditOverflow: a sum or difference does not fit; clearing the
    ///   named log and computing again always makes progress
    pub fn compute(
        batch: &Batch,
        logs: &BatchLogs,
        categories: &[String],
    ) -> Result<ClosingAudit, AuditOverflow> {
        let id = batch.batch_id.as_str();

        let (total_feed_bags, total_feed_cost) = logs
            .feed
            .iter()
            .filter(|e| e.batch_id == id)
            .try_fold((0i64, Decimal::ZERO), |(bags, cost), e| {
                Some((bags.checked_add(e.bags)?, cost.checked_add(e.line_total)?))
            })
            .ok_or(overflow(LogKind::Feed, "feed totals"))?;

        let total_mortality = logs
            .mortality
            .iter()
            .filter(|e| e.batch_id == id)
            .try_fold(0i64, |total, e| total.checked_add(e.count))
            .ok_or(overflow(LogKind::Mortality, "total mortality"))?;

        let (total_birds_sold, total_revenue) = logs
            .sales
            .iter()
            .filter(|e| e.batch_id == id)
            .try_fold((0i64, Decimal::ZERO), |(birds, revenue), e| {
                Some((
                    birds.checked_add(e.bird_count)?,
                    revenue.checked_add(e.line_revenue)?,
                ))
            })
            .ok_or(overflow(LogKind::Sales, "sales totals"))?;

        let mut expense_totals: Vec<CategoryTotal> = categories
            .iter()
            .map(|category| CategoryTotal {
                category: category.clone(),
                total: Decimal::ZERO,
            })
            .collect();
        let mut other_expenses_total = Decimal::ZERO;
        for entry in logs.expenses.iter().filter(|e| e.batch_id == id) {
            let bucket = match expense_totals.iter_mut().find(|c| c.category == entry.category) {
                Some(bucket) => &mut bucket.total,
                None => &mut other_expenses_total,
            };
            *bucket = bucket
                .checked_add(entry.amount)
                .ok_or(overflow(LogKind::Expense, "expense totals"))?;
        }
        // same order as ClosingAudit::total_expenses
        expense_totals
            .iter()
            .map(|c| c.total)
            .chain(std::iter::once(other_expenses_total))
            .try_fold(Decimal::ZERO, |sum, total| sum.checked_add(total))
            .ok_or(overflow(LogKind::Expense, "total expenses"))?;

        let remaining_inventory = batch
            .chick_count
            .checked_sub(total_mortality)
            .ok_or(overflow(LogKind::Mortality, "remaining inventory"))?
            .checked_sub(total_birds_sold)
            .ok_or(overflow(LogKind::Sales, "remaining inventory"))?;
        let net_total = total_revenue
            .checked_sub(total_feed_cost)
            .ok_or(overflow(LogKind::Feed, "net total"))?;

        Ok(ClosingAudit {
            batch_id: batch.batch_id.clone(),
            initial_chick_count: batch.chick_count,
            initial_investment: batch.initial_investment,
            total_feed_bags,
            total_mortality,
            total_birds_sold,
            remaining_inventory,
            total_revenue,
            total_feed_cost,
            net_total,
            expense_totals,
            other_expenses_total,
        })
    }
}
