// ==========================================
// Poultry Ledger - Configuration manager
// ==========================================
// Resolution order:
// 1. explicit file path
// 2. POULTRY_LEDGER_CONFIG environment variable
// 3. built-in defaults
// Storage: JSON file (serde)
// ==========================================

use crate::config::ledger_schema::LedgerSchema;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at a JSON config file
pub const CONFIG_PATH_ENV: &str = "POULTRY_LEDGER_CONFIG";

/// Environment variable overriding the default SQLite path
pub const DB_PATH_ENV: &str = "POULTRY_LEDGER_DB_PATH";

// ==========================================
// StoreConfig - row store backend
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// One SQLite table per log
    Sqlite { path: String },
    /// One CSV file per log inside `dir`
    Csv { dir: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            path: default_db_path(),
        }
    }
}

// ==========================================
// LogFormat
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// ==========================================
// LedgerConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub store: StoreConfig,
    pub schema: LedgerSchema,
    /// "en" or "hi"
    pub locale: String,
    pub log_format: LogFormat,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            schema: LedgerSchema::default(),
            locale: "en".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration
    ///
    /// # Arguments
    /// - explicit_path: path given on the command line, if any
    ///
    /// # Returns
    /// - Ok(LedgerConfig): validated configuration
    /// - Err: unreadable file, bad JSON, or invalid schema
    pub fn load(explicit_path: Option<&Path>) -> Result<LedgerConfig, Box<dyn Error>> {
        let path = explicit_path.map(Path::to_path_buf).or_else(|| {
            std::env::var(CONFIG_PATH_ENV)
                .ok()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
        });

        let config = match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading ledger config");
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("no config file given, using defaults");
                LedgerConfig::default()
            }
        };

        config.schema.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<LedgerConfig, Box<dyn Error>> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<LedgerConfig, Box<dyn Error>> {
        let config: LedgerConfig = serde_json::from_str(raw)?;
        Ok(config)
    }

    /// Serialize a config, e.g. to write a starter file
    pub fn to_json(config: &LedgerConfig) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string_pretty(config)?)
    }
}

/// Default SQLite path
///
/// `POULTRY_LEDGER_DB_PATH` wins; otherwise the user data directory is used,
/// falling back to the working directory.
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./poultry_ledger.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("poultry-ledger");
        // best-effort: an unwritable data dir surfaces later when the store opens
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("poultry_ledger.db");
        }
    }

    path.to_string_lossy().to_string()
}
