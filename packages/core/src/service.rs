use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use common::Direction;
use common::barcode::{BarcodeCode, IdentityCodec, RenderOptions};
use common::storage::{AssetStore, FilesystemAssetStore};
use sea_orm::DatabaseConnection;
use tracing::{instrument, warn};

use crate::catalog::ProductCatalog;
use crate::config::InventoryConfig;
use crate::database::init_db;
use crate::error::{InventoryError, Result};
use crate::ledger::TransactionLedger;
use crate::locks::ProductLocks;
use crate::low_stock::LowStockMonitor;
use crate::maintenance::Maintenance;
use crate::models::{
    Category, GcReport, HistoryWindow, NewProduct, PhotoUpload, Product, ProductSnapshot,
    ProductUpdate, ReconcileReport, StockSummary, TransactionEntry,
};
use crate::mutator::StockMutator;

/// Command and query surface of the inventory core.
///
/// Every call that touches the database or the asset store is bounded by the
/// configured operation timeout; running out of time is reported as
/// [`InventoryError::StorageUnavailable`].
#[derive(Clone)]
pub struct InventoryService {
    db: DatabaseConnection,
    catalog: ProductCatalog,
    mutator: StockMutator,
    maintenance: Maintenance,
    codec: IdentityCodec,
    op_timeout: Duration,
}

impl InventoryService {
    /// Connect to the database, apply the schema and open the asset store.
    pub async fn from_config(config: &InventoryConfig) -> Result<Self> {
        let db = init_db(&config.database).await?;
        let assets = FilesystemAssetStore::new(
            config.storage.root.clone(),
            config.storage.max_asset_size,
        )
        .await?;
        Ok(Self::new(db, Arc::new(assets), config))
    }

    pub fn new(db: DatabaseConnection, assets: Arc<dyn AssetStore>, config: &InventoryConfig) -> Self {
        let codec = IdentityCodec::new(RenderOptions::from(&config.barcode));
        let locks = ProductLocks::new();
        let catalog = ProductCatalog::new(
            db.clone(),
            assets,
            codec,
            locks.clone(),
            config.catalog.clone(),
        );

        Self {
            mutator: StockMutator::new(db.clone(), locks),
            maintenance: Maintenance::new(db.clone(), catalog.clone()),
            catalog,
            db,
            codec,
            op_timeout: config.service.op_timeout(),
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    async fn bounded<T>(&self, op: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.op_timeout.as_millis() as u64;
                warn!(op, timeout_ms, "Operation timed out");
                Err(InventoryError::StorageUnavailable(format!(
                    "{op} timed out after {timeout_ms}ms"
                )))
            }
        }
    }

    #[instrument(skip(self, new), fields(name = %new.name, quantity = new.quantity))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        self.bounded("create_product", self.catalog.create(new))
            .await
    }

    #[instrument(skip(self, update, photo))]
    pub async fn edit_product(
        &self,
        product_id: i32,
        update: ProductUpdate,
        photo: Option<PhotoUpload>,
    ) -> Result<Product> {
        self.bounded("edit_product", self.catalog.edit(product_id, update, photo))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i32) -> Result<()> {
        self.bounded("delete_product", self.catalog.delete(product_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        product_id: i32,
        amount: i64,
        direction: Direction,
    ) -> Result<ProductSnapshot> {
        self.bounded(
            "adjust_quantity",
            self.mutator.apply(product_id, amount, direction),
        )
        .await
    }

    pub async fn get_product(&self, product_id: i32) -> Result<Product> {
        self.bounded("get_product", self.catalog.get(product_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Product> {
        self.bounded("find_by_code", self.catalog.find_by_code(code))
            .await
    }

    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        self.bounded("search_products", self.catalog.search(term))
            .await
    }

    pub async fn list_products(&self, category_id: Option<i32>) -> Result<Vec<Product>> {
        self.bounded("list_products", self.catalog.list(category_id))
            .await
    }

    pub async fn list_low_stock(&self) -> Result<Vec<Product>> {
        self.bounded("list_low_stock", async {
            Ok::<_, InventoryError>(LowStockMonitor::new(&self.db).list_low().await?)
        })
        .await
    }

    /// Newest-first ledger entries of a product. A product without entries,
    /// or one that no longer exists, has an empty history.
    #[instrument(skip(self, window))]
    pub async fn get_history(
        &self,
        product_id: i32,
        window: HistoryWindow,
    ) -> Result<Vec<TransactionEntry>> {
        self.bounded("get_history", async {
            let mut cursor = TransactionLedger::new(&self.db)
                .history(product_id, window)
                .await?;
            Ok::<_, InventoryError>(cursor.collect_all().await?)
        })
        .await
    }

    /// Signed sum of a product's ledger entries.
    pub async fn ledger_sum(&self, product_id: i32) -> Result<i64> {
        self.bounded("ledger_sum", async {
            Ok::<_, InventoryError>(TransactionLedger::new(&self.db).sum_for(product_id).await?)
        })
        .await
    }

    /// PNG image of a product code. Pure; touches no storage.
    pub fn render_barcode_image(&self, code: &str) -> Result<Vec<u8>> {
        let code = BarcodeCode::parse(code)?;
        Ok(self.codec.render_image(&code)?)
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.bounded("create_category", self.catalog.create_category(name))
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.bounded("list_categories", self.catalog.list_categories())
            .await
    }

    pub async fn stock_summary(&self, days: u32) -> Result<StockSummary> {
        self.bounded("stock_summary", self.maintenance.stock_summary(days))
            .await
    }

    /// Whole-catalog scans are not bounded by the per-operation timeout.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, repair: bool) -> Result<ReconcileReport> {
        self.maintenance.reconcile(repair).await
    }

    #[instrument(skip(self))]
    pub async fn collect_orphan_assets(&self) -> Result<GcReport> {
        self.maintenance.collect_orphan_assets().await
    }
}
