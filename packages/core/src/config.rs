use std::time::Duration;

use common::config::{BarcodeConfig, StorageConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool size. Ignored for SQLite, which always runs on one connection.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Fresh codes drawn before creation gives up with `IdentityExhausted`.
    #[serde(default = "default_code_attempts")]
    pub code_attempts: u8,
    /// Most products a search returns.
    #[serde(default = "default_search_limit")]
    pub search_limit: u64,
    /// Threshold used when a product is created without one.
    #[serde(default = "default_threshold")]
    pub default_threshold: i64,
}

fn default_code_attempts() -> u8 {
    5
}
fn default_search_limit() -> u64 {
    50
}
fn default_threshold() -> i64 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            code_attempts: default_code_attempts(),
            search_limit: default_search_limit(),
            default_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Upper bound on any single storage-touching operation.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_op_timeout_ms() -> u64 {
    8000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl ServiceConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub barcode: BarcodeConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

impl InventoryConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("INVENTORY_CONFIG").unwrap_or_else(|_| "config/config".into());

        let s = Config::builder()
            .set_default("database.url", "sqlite://inventory.db?mode=rwc")?
            .set_default("database.max_connections", default_max_connections())?
            .set_default("storage.root", "./static")?
            // Load from config/config.toml unless INVENTORY_CONFIG points elsewhere
            .add_source(File::with_name(&path).required(false))
            // Override from environment (e.g., INVENTORY__DATABASE__URL)
            .add_source(Environment::with_prefix("INVENTORY").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Configuration for a database URL and asset root, everything else at defaults.
    pub fn with_paths(database_url: impl Into<String>, storage_root: std::path::PathBuf) -> Self {
        Self {
            database: DatabaseConfig::new(database_url),
            storage: StorageConfig {
                root: storage_root,
                ..StorageConfig::default()
            },
            barcode: BarcodeConfig::default(),
            catalog: CatalogConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}
