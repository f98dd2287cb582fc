// ==========================================
// Poultry Ledger - Engine layer
// ==========================================
// Pure ledger rules: no store access, no I/O.
// Every rejection is a RuleViolation carrying its reason.
// ==========================================

pub mod aggregation;
pub mod entry_rules;
pub mod lifecycle;
pub mod permission;
pub mod row_codec;
pub mod rules;
pub mod sales_grid;

pub use aggregation::{AuditOverflow, BatchLogs, ClosingAuditEngine};
pub use entry_rules::EntryRules;
pub use lifecycle::LifecycleEngine;
pub use permission::{lock_notice_key, LogPermissions, PermissionGate};
pub use rules::{RuleResult, RuleViolation};
pub use sales_grid::SalesGridExpander;
