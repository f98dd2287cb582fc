// ==========================================
// Poultry Ledger - Closing audit model
// ==========================================
// Read-only summary computed before a batch is finalized.
// net_total deliberately excludes Expenses_Log rows.
// ==========================================

use crate::domain::types::LogKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// ClosingAudit
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingAudit {
    pub batch_id: String,

    // ===== Flock =====
    pub initial_chick_count: i64,
    pub initial_investment: Decimal,
    pub total_feed_bags: i64,
    pub total_mortality: i64,
    pub total_birds_sold: i64,
    /// initial - mortality - sold; may be negative, never clamped
    pub remaining_inventory: i64,

    // ===== Money =====
    pub total_revenue: Decimal,
    pub total_feed_cost: Decimal,
    /// total_revenue - total_feed_cost
    pub net_total: Decimal,

    // ===== Overheads (reported, not netted) =====
    pub expense_totals: Vec<CategoryTotal>,
    pub other_expenses_total: Decimal,
}

impl ClosingAudit {
    /// Total for one configured expense category (exact label match)
    pub fn expense_total(&self, category: &str) -> Option<Decimal> {
        self.expense_totals
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }

    /// Sum of every expense row of the batch, configured or not
    pub fn total_expenses(&self) -> Decimal {
        self.expense_totals.iter().map(|c| c.total).sum::<Decimal>() + self.other_expenses_total
    }

    /// True when logged deaths and sales exceed the recorded chick count
    pub fn has_inventory_deficit(&self) -> bool {
        self.remaining_inventory < 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

// ==========================================
// ClosingAuditView
// ==========================================
// Logs that could not be read are folded as empty and listed here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingAuditView {
    pub audit: ClosingAudit,
    pub read_failures: Vec<LogReadFailure>,
}

impl ClosingAuditView {
    pub fn is_complete(&self) -> bool {
        self.read_failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReadFailure {
    pub log: LogKind,
    pub message: String,
}
