// ==========================================
// Poultry Ledger - Application layer
// ==========================================
// Connects a front end to the ledger: config -> store -> BatchLedger
// ==========================================

pub mod state;

pub use state::{open_store, AppState, DynRowStore};
