use std::sync::Arc;

use chrono::Utc;
use common::Direction;
use common::barcode::{BarcodeCode, IdentityCodec};
use common::storage::FilesystemAssetStore;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tempfile::TempDir;

use crate::catalog::ProductCatalog;
use crate::config::{CatalogConfig, DatabaseConfig};
use crate::database::init_db;
use crate::entity::product;
use crate::ledger::TransactionLedger;
use crate::locks::ProductLocks;

/// Fresh SQLite database in a temp directory, schema applied.
pub async fn temp_db() -> (DatabaseConnection, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let db = init_db(&DatabaseConfig::new(url)).await.unwrap();
    (db, dir)
}

/// Insert a product row directly, with a matching opening ledger entry.
pub async fn insert_product(db: &DatabaseConnection, name: &str, quantity: i64) -> i32 {
    let model = product::ActiveModel {
        name: Set(name.to_string()),
        barcode: Set(BarcodeCode::generate().into_string()),
        quantity: Set(quantity),
        low_stock_threshold: Set(5),
        image_path: Set(None),
        category_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    if quantity > 0 {
        TransactionLedger::new(db)
            .append(model.id, quantity, Direction::In)
            .await
            .unwrap();
    }
    model.id
}

pub struct TestCatalog {
    pub catalog: ProductCatalog,
    pub db: DatabaseConnection,
    pub assets: Arc<FilesystemAssetStore>,
    pub _dir: TempDir,
}

pub async fn temp_catalog() -> TestCatalog {
    temp_catalog_with(CatalogConfig::default(), 1024 * 1024).await
}

pub async fn temp_catalog_with(config: CatalogConfig, max_asset_size: u64) -> TestCatalog {
    let (db, dir) = temp_db().await;
    let assets = Arc::new(
        FilesystemAssetStore::new(dir.path().join("static"), max_asset_size)
            .await
            .unwrap(),
    );
    let catalog = ProductCatalog::new(
        db.clone(),
        assets.clone(),
        IdentityCodec::default(),
        ProductLocks::new(),
        config,
    );
    TestCatalog {
        catalog,
        db,
        assets,
        _dir: dir,
    }
}
