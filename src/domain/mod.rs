// ==========================================
// Poultry Ledger - Domain layer
// ==========================================
// Entities and value types only: no store access, no engine logic
// ==========================================

pub mod audit;
pub mod batch;
pub mod entries;
pub mod types;

pub use audit::{CategoryTotal, ClosingAudit, ClosingAuditView, LogReadFailure};
pub use batch::{ArrivalDetails, Batch};
pub use entries::{
    ContainerInput, ExpenseEntry, ExpenseInput, FeedEntry, FeedInput, MortalityEntry,
    MortalityInput, SalesEntry, SalesGrid, TripInput,
};
pub use types::{BatchStatus, FeedAction, LogKind, SessionStatus};
