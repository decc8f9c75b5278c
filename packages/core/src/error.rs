use common::barcode::CodeError;
use common::storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors surfaced by every catalog, ledger and stock operation.
///
/// Mutating operations are all-or-nothing: whatever the variant, no partial
/// write is left visible in the catalog or ledger.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Bad input; rejected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Every candidate code drawn collided with an existing product.
    #[error("No unique product code after {attempts} attempts")]
    IdentityExhausted { attempts: u8 },

    /// Database error or timeout.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The asset could not be written; previously stored assets are untouched.
    #[error("Asset write failed: {0}")]
    AssetWriteFailed(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InventoryError {
    pub fn product_not_found(id: i32) -> Self {
        InventoryError::NotFound(format!("Product {id} not found"))
    }
}

impl From<DbErr> for InventoryError {
    fn from(err: DbErr) -> Self {
        InventoryError::StorageUnavailable(err.to_string())
    }
}

impl From<StorageError> for InventoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => {
                InventoryError::NotFound(format!("Asset '{name}' not found"))
            }
            StorageError::InvalidName(msg) => InventoryError::Validation(msg),
            StorageError::SizeLimitExceeded { .. } => InventoryError::Validation(err.to_string()),
            StorageError::Io(_) => InventoryError::AssetWriteFailed(err.to_string()),
        }
    }
}

impl From<CodeError> for InventoryError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::WrongLength { .. } | CodeError::NotNumeric(_) => {
                InventoryError::Validation(err.to_string())
            }
            CodeError::Symbol(_) | CodeError::Image(_) => InventoryError::Internal(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
