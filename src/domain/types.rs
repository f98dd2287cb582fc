// ==========================================
// Poultry Ledger - Domain type definitions
// ==========================================
// Batch lifecycle: Pre-Arrival -> Active -> Finalized
// Status strings are persisted verbatim in the Dashboard log
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Batch status (persisted)
// ==========================================
// Order: PreArrival < Active < Finalized, transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    PreArrival, // created, chicks not yet arrived
    Active,     // arrival recorded, logging open
    Finalized,  // closing audit confirmed, read-only
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl BatchStatus {
    /// Parse the status cell of a Dashboard row.
    ///
    /// Matching is exact; unknown labels yield `None` so callers can report
    /// the row as malformed instead of guessing a state.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Pre-Arrival" => Some(BatchStatus::PreArrival),
            "Active" => Some(BatchStatus::Active),
            "Finalized" => Some(BatchStatus::Finalized),
            _ => None,
        }
    }

    /// Label stored in the Dashboard `Status` column
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BatchStatus::PreArrival => "Pre-Arrival",
            BatchStatus::Active => "Active",
            BatchStatus::Finalized => "Finalized",
        }
    }

    /// i18n key for display labels
    pub fn label_key(&self) -> &'static str {
        match self {
            BatchStatus::PreArrival => "status.pre_arrival",
            BatchStatus::Active => "status.active",
            BatchStatus::Finalized => "status.finalized",
        }
    }
}

// ==========================================
// Session status (UI-facing)
// ==========================================
// `New` means no batch is selected yet; it is never written to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    New,
    Batch(BatchStatus),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::New => f.write_str("New"),
            SessionStatus::Batch(status) => status.fmt(f),
        }
    }
}

impl From<BatchStatus> for SessionStatus {
    fn from(status: BatchStatus) -> Self {
        SessionStatus::Batch(status)
    }
}

// ==========================================
// Log kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Dashboard,
    Feed,
    Mortality,
    Sales,
    Expense,
}

impl LogKind {
    /// The four append-only event logs (everything except Dashboard)
    pub const EVENT_LOGS: [LogKind; 4] = [
        LogKind::Feed,
        LogKind::Mortality,
        LogKind::Sales,
        LogKind::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Dashboard => "dashboard",
            LogKind::Feed => "feed",
            LogKind::Mortality => "mortality",
            LogKind::Sales => "sales",
            LogKind::Expense => "expense",
        }
    }

    /// Parse a log kind from its CLI / config name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "batch" | "batches" => Some(LogKind::Dashboard),
            "feed" => Some(LogKind::Feed),
            "mortality" => Some(LogKind::Mortality),
            "sales" => Some(LogKind::Sales),
            "expense" | "expenses" => Some(LogKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Feed action
// ==========================================
// Returns are persisted as negative bag counts so the fold sums them directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedAction {
    Purchase,
    Return,
}

impl FeedAction {
    /// Sign applied to the bag count before it is written
    pub fn sign(&self) -> i64 {
        match self {
            FeedAction::Purchase => 1,
            FeedAction::Return => -1,
        }
    }

    /// Recover the action from a persisted (signed) bag count
    pub fn from_signed_bags(bags: i64) -> Self {
        if bags < 0 {
            FeedAction::Return
        } else {
            FeedAction::Purchase
        }
    }
}
