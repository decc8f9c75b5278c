pub mod catalog;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod low_stock;
pub mod maintenance;
pub mod models;
pub mod mutator;
pub mod service;

#[cfg(test)]
mod test_support;

pub use common::{Direction, TransactionKind};
pub use config::InventoryConfig;
pub use error::{InventoryError, Result};
pub use service::InventoryService;
