// ==========================================
// Poultry Ledger - Core library
// ==========================================
// Batch lifecycle (Pre-Arrival -> Active -> Finalized) and closing audit
// over the Feed, Mortality, Sales and Expense logs of a row store.
// Stack: Rust + SQLite / CSV / xlsx import
// ==========================================

// Localisation
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// Modules
// ==========================================

// Domain layer - entities and value types
pub mod domain;

// Configuration - ledger schema and process config
pub mod config;

// Row store layer - persistence collaborator and backends
pub mod store;

// Engine layer - pure ledger rules
pub mod engine;

// SQLite connection setup
pub mod db;

// Logging
pub mod logging;

// Localisation helpers
pub mod i18n;

// API layer - ledger operations
pub mod api;

// Application layer - wiring
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    ArrivalDetails, Batch, BatchStatus, ClosingAudit, ClosingAuditView, ContainerInput,
    ExpenseEntry, ExpenseInput, FeedAction, FeedEntry, FeedInput, LogKind, MortalityEntry,
    MortalityInput, SalesEntry, SalesGrid, SessionStatus, TripInput,
};

pub use engine::{ClosingAuditEngine, LifecycleEngine, PermissionGate, SalesGridExpander};

pub use store::{CsvRowStore, MemoryRowStore, RowStore, SqliteRowStore, StoreError};

pub use api::{BatchLedger, BatchSession, LedgerError, LedgerResult, SessionContext};

pub use config::{LedgerConfig, LedgerSchema};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Poultry Ledger";
