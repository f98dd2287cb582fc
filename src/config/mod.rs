// ==========================================
// Poultry Ledger - Configuration layer
// ==========================================
// Declarative ledger schema + process configuration
// ==========================================

pub mod config_manager;
pub mod ledger_schema;

pub use config_manager::{
    default_db_path, ConfigManager, LedgerConfig, LogFormat, StoreConfig, CONFIG_PATH_ENV,
    DB_PATH_ENV,
};
pub use ledger_schema::{LedgerSchema, LogNames, PermissionMatrix, PermissionRule};
