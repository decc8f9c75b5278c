use std::sync::Arc;

use ::common::storage::{AssetKind, AssetRef, AssetStore, FilesystemAssetStore};
use inventory_core::config::InventoryConfig;
use inventory_core::database::init_db;
use inventory_core::models::{NewProduct, Product};
use inventory_core::InventoryService;
use tempfile::TempDir;

/// A service over a fresh SQLite file and asset directory.
pub struct TestApp {
    pub service: InventoryService,
    pub assets: Arc<FilesystemAssetStore>,
    pub config: InventoryConfig,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a tweaked configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut InventoryConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("inventory.db").display()
        );
        let mut config = InventoryConfig::with_paths(url, dir.path().join("static"));
        configure(&mut config);

        let db = init_db(&config.database)
            .await
            .expect("Failed to initialize database");
        let assets = Arc::new(
            FilesystemAssetStore::new(config.storage.root.clone(), config.storage.max_asset_size)
                .await
                .expect("Failed to open asset store"),
        );
        let service = InventoryService::new(db, assets.clone(), &config);

        Self {
            service,
            assets,
            config,
            _dir: dir,
        }
    }

    /// Spawn over a caller-supplied asset store.
    pub async fn spawn_with_store(store: Arc<dyn AssetStore>) -> (InventoryService, TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("inventory.db").display()
        );
        let config = InventoryConfig::with_paths(url, dir.path().join("static"));
        let db = init_db(&config.database)
            .await
            .expect("Failed to initialize database");
        (InventoryService::new(db, store, &config), dir)
    }

    pub async fn create(&self, name: &str, quantity: i64, threshold: i64) -> Product {
        self.service
            .create_product(NewProduct::new(name, quantity).threshold(threshold))
            .await
            .expect("Failed to create product")
    }

    pub async fn barcode_stored(&self, product: &Product) -> bool {
        self.assets
            .exists(&AssetRef::barcode(&product.barcode).unwrap())
            .await
            .unwrap()
    }

    pub async fn stored(&self, kind: AssetKind) -> Vec<AssetRef> {
        self.assets.list(kind).await.unwrap()
    }

    /// Cached quantity must always equal the ledger sum.
    pub async fn assert_ledger_matches(&self, product_id: i32) {
        let product = self.service.get_product(product_id).await.unwrap();
        let ledger = self.service.ledger_sum(product_id).await.unwrap();
        assert_eq!(
            product.quantity, ledger,
            "product {product_id}: cached quantity disagrees with ledger"
        );
    }
}
