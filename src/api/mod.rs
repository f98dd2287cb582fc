// ==========================================
// Poultry Ledger - API layer
// ==========================================
// In-process entry points for front ends (CLI, UI shells)
// ==========================================

pub mod error;
pub mod ledger_api;
pub mod session;

pub use error::{LedgerError, LedgerResult};
pub use ledger_api::{BatchLedger, PartialSalesWrite};
pub use session::{BatchSession, SessionContext};
