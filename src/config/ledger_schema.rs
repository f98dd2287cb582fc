// ==========================================
// Poultry Ledger - Declarative ledger schema
// ==========================================
// One schema replaces per-variant copies of the same control flow:
// - log (sheet) names
// - column order per log (significant for store compatibility)
// - permission matrix per batch status
// - expense categories reported by the closing audit
// ==========================================

use crate::domain::types::{BatchStatus, LogKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// Column layouts
// ==========================================

pub const DASHBOARD_COLUMNS: [&str; 6] = [
    "Batch_ID",
    "Arrival_Date",
    "Chick_Count",
    "Price_Per_Chick",
    "Initial_Investment",
    "Status",
];

pub const FEED_COLUMNS: [&str; 6] = [
    "Date",
    "Feed_Type",
    "Bags",
    "Price_Per_Bag",
    "Daily_Total",
    "Batch_ID",
];

pub const MORTALITY_COLUMNS: [&str; 4] = ["Date", "Mortality_Count", "Batch_ID", "Reason"];

pub const SALES_COLUMNS: [&str; 8] = [
    "Date",
    "Trip_No",
    "Container_No",
    "Bird_Count",
    "Weight_Kg",
    "Price_Per_Kg",
    "Total_Revenue",
    "Batch_ID",
];

pub const EXPENSE_COLUMNS: [&str; 6] = [
    "Date",
    "Category",
    "Item_Name",
    "Description",
    "Price",
    "Batch_ID",
];

/// 0-based Dashboard column indices used with `RowStore::update_field`
pub mod dashboard_col {
    pub const BATCH_ID: usize = 0;
    pub const ARRIVAL_DATE: usize = 1;
    pub const CHICK_COUNT: usize = 2;
    pub const PRICE_PER_CHICK: usize = 3;
    pub const INITIAL_INVESTMENT: usize = 4;
    pub const STATUS: usize = 5;
}

/// Column shared by every event log to tag the owning batch
pub const BATCH_ID_COLUMN: &str = "Batch_ID";

// ==========================================
// Log names
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogNames {
    pub dashboard: String,
    pub feed: String,
    pub mortality: String,
    pub sales: String,
    pub expense: String,
}

impl Default for LogNames {
    fn default() -> Self {
        Self {
            dashboard: "Dashboard".to_string(),
            feed: "Feed_Log".to_string(),
            mortality: "Mortality_Log".to_string(),
            sales: "Sales_Log".to_string(),
            expense: "Expenses_Log".to_string(),
        }
    }
}

// ==========================================
// Permission matrix
// ==========================================
// Reads are always allowed; only event-log writes are listed here.
// Dashboard writes are governed by lifecycle transitions, not this matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    pub status: BatchStatus,
    pub writable: Vec<LogKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMatrix {
    pub rules: Vec<PermissionRule>,
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self {
            rules: vec![
                PermissionRule {
                    status: BatchStatus::PreArrival,
                    writable: vec![LogKind::Expense],
                },
                PermissionRule {
                    status: BatchStatus::Active,
                    writable: LogKind::EVENT_LOGS.to_vec(),
                },
                PermissionRule {
                    status: BatchStatus::Finalized,
                    writable: Vec::new(),
                },
            ],
        }
    }
}

impl PermissionMatrix {
    /// Whether `log` may be appended to while a batch is in `status`.
    /// A status without a rule allows nothing.
    pub fn allows_write(&self, status: BatchStatus, log: LogKind) -> bool {
        self.rules
            .iter()
            .find(|r| r.status == status)
            .map(|r| r.writable.contains(&log))
            .unwrap_or(false)
    }

    /// Event logs writable in `status`, in canonical order
    pub fn writable_logs(&self, status: BatchStatus) -> Vec<LogKind> {
        LogKind::EVENT_LOGS
            .into_iter()
            .filter(|log| self.allows_write(status, *log))
            .collect()
    }
}

// ==========================================
// LedgerSchema
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSchema {
    pub log_names: LogNames,
    pub permissions: PermissionMatrix,
    /// Categories reported individually by the closing audit.
    /// Default: medicine plus two labour payees.
    pub expense_categories: Vec<String>,
}

impl Default for LedgerSchema {
    fn default() -> Self {
        Self {
            log_names: LogNames::default(),
            permissions: PermissionMatrix::default(),
            expense_categories: vec![
                "Medicine".to_string(),
                "Person A".to_string(),
                "Person B".to_string(),
            ],
        }
    }
}

impl LedgerSchema {
    /// Store-level name of a log
    pub fn log_name(&self, log: LogKind) -> &str {
        match log {
            LogKind::Dashboard => &self.log_names.dashboard,
            LogKind::Feed => &self.log_names.feed,
            LogKind::Mortality => &self.log_names.mortality,
            LogKind::Sales => &self.log_names.sales,
            LogKind::Expense => &self.log_names.expense,
        }
    }

    /// Column headers of a log, in persisted order
    pub fn columns(&self, log: LogKind) -> &'static [&'static str] {
        match log {
            LogKind::Dashboard => &DASHBOARD_COLUMNS,
            LogKind::Feed => &FEED_COLUMNS,
            LogKind::Mortality => &MORTALITY_COLUMNS,
            LogKind::Sales => &SALES_COLUMNS,
            LogKind::Expense => &EXPENSE_COLUMNS,
        }
    }

    /// (log name, headers) for every log, used by stores to create tables/files
    pub fn layouts(&self) -> Vec<(String, Vec<String>)> {
        [LogKind::Dashboard]
            .into_iter()
            .chain(LogKind::EVENT_LOGS)
            .map(|log| {
                (
                    self.log_name(log).to_string(),
                    self.columns(log).iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect()
    }

    pub fn is_expense_category(&self, category: &str) -> bool {
        self.expense_categories.iter().any(|c| c == category)
    }

    /// Check that the schema is usable
    ///
    /// # Rules
    /// - log names are non-empty and distinct
    /// - expense categories are non-empty and distinct
    /// - a Finalized batch is read-only
    pub fn validate(&self) -> Result<(), String> {
        let names: Vec<&str> = [LogKind::Dashboard]
            .into_iter()
            .chain(LogKind::EVENT_LOGS)
            .map(|log| self.log_name(log))
            .collect();
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err("log names must not be empty".to_string());
        }
        let distinct: HashSet<&str> = names.iter().copied().collect();
        if distinct.len() != names.len() {
            return Err("log names must be distinct".to_string());
        }

        if self.expense_categories.is_empty() {
            return Err("at least one expense category is required".to_string());
        }
        if self.expense_categories.iter().any(|c| c.trim().is_empty()) {
            return Err("expense categories must not be empty".to_string());
        }
        let categories: HashSet<&str> = self.expense_categories.iter().map(String::as_str).collect();
        if categories.len() != self.expense_categories.len() {
            return Err("expense categories must be distinct".to_string());
        }

        if !self.permissions.writable_logs(BatchStatus::Finalized).is_empty() {
            return Err("a Finalized batch must not accept writes".to_string());
        }

        Ok(())
    }
}
