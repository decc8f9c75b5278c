use std::sync::Arc;

use chrono::Utc;
use common::Direction;
use common::barcode::{BarcodeCode, CodeError, IdentityCodec};
use common::retry::{RetryBudget, RetryDecision};
use common::storage::{AssetKind, AssetRef, AssetStore, StorageError};
use dashmap::DashSet;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{error, info, warn};

use crate::config::CatalogConfig;
use crate::entity::{category, product};
use crate::error::{InventoryError, Result};
use crate::ledger::TransactionLedger;
use crate::locks::ProductLocks;
use crate::models::shared::{escape_like, validate_name, validate_threshold};
use crate::models::{Category, NewProduct, PhotoUpload, Product, ProductUpdate};

/// Why a creation attempt with one candidate code did not go through.
enum AttemptError {
    /// The code already belongs to another product.
    Collision,
    Failed(InventoryError),
}

impl From<InventoryError> for AttemptError {
    fn from(err: InventoryError) -> Self {
        AttemptError::Failed(err)
    }
}

impl From<DbErr> for AttemptError {
    fn from(err: DbErr) -> Self {
        AttemptError::Failed(err.into())
    }
}

impl From<StorageError> for AttemptError {
    fn from(err: StorageError) -> Self {
        AttemptError::Failed(err.into())
    }
}

impl From<CodeError> for AttemptError {
    fn from(err: CodeError) -> Self {
        AttemptError::Failed(err.into())
    }
}

/// Releases a claimed candidate code when creation finishes either way.
struct ClaimedCode<'a> {
    pending: &'a DashSet<String>,
    code: String,
}

impl Drop for ClaimedCode<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.code);
    }
}

type CodeSource = Arc<dyn Fn() -> BarcodeCode + Send + Sync>;

/// Owns product and category records together with the assets tied to them.
#[derive(Clone)]
pub struct ProductCatalog {
    db: DatabaseConnection,
    assets: Arc<dyn AssetStore>,
    codec: IdentityCodec,
    next_code: CodeSource,
    locks: ProductLocks,
    /// Codes being created right now, so two creations never race for one code.
    pending: Arc<DashSet<String>>,
    config: CatalogConfig,
}

impl ProductCatalog {
    pub fn new(
        db: DatabaseConnection,
        assets: Arc<dyn AssetStore>,
        codec: IdentityCodec,
        locks: ProductLocks,
        config: CatalogConfig,
    ) -> Self {
        Self {
            db,
            assets,
            codec,
            next_code: Arc::new(move || codec.generate_code()),
            locks,
            pending: Arc::new(DashSet::new()),
            config,
        }
    }

    /// Draw candidate codes from `source` instead of the codec.
    #[cfg(test)]
    pub(crate) fn with_code_source(
        mut self,
        source: impl Fn() -> BarcodeCode + Send + Sync + 'static,
    ) -> Self {
        self.next_code = Arc::new(source);
        self
    }

    /// Create a product under a fresh code.
    ///
    /// The barcode image (and photo, if any) is written before the row, so a
    /// crash in between leaves at most an unreferenced asset. The row and its
    /// opening ledger entry are committed together.
    pub async fn create(&self, new: NewProduct) -> Result<Product> {
        let name = validate_name("Name", &new.name)?;
        if new.quantity < 0 {
            return Err(InventoryError::Validation(
                "Initial quantity must be >= 0".into(),
            ));
        }
        let threshold = new
            .low_stock_threshold
            .unwrap_or(self.config.default_threshold);
        validate_threshold(threshold)?;
        if let Some(category_id) = new.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut budget = RetryBudget::new(self.config.code_attempts);
        loop {
            let code = (self.next_code)();
            let failure = match self.try_create(&name, threshold, &new, &code).await {
                Ok(product) => {
                    info!(product_id = product.id, barcode = %product.barcode, "Created product");
                    return Ok(product);
                }
                Err(AttemptError::Failed(e)) => return Err(e),
                Err(AttemptError::Collision) => format!("code {code} already in use"),
            };

            match budget.record_failure(&failure) {
                RetryDecision::Retry { attempt } => {
                    warn!(attempt, barcode = %code, "Product code collision, drawing another");
                }
                RetryDecision::Exhausted { history } => {
                    error!(
                        attempts = history.len(),
                        "Could not find an unused product code"
                    );
                    return Err(InventoryError::IdentityExhausted {
                        attempts: budget.max_attempts(),
                    });
                }
            }
        }
    }

    async fn try_create(
        &self,
        name: &str,
        threshold: i64,
        new: &NewProduct,
        code: &BarcodeCode,
    ) -> std::result::Result<Product, AttemptError> {
        if !self.pending.insert(code.as_str().to_string()) {
            return Err(AttemptError::Collision);
        }
        let _claim = ClaimedCode {
            pending: &self.pending,
            code: code.as_str().to_string(),
        };

        let taken = product::Entity::find()
            .filter(product::Column::Barcode.eq(code.as_str()))
            .one(&self.db)
            .await?
            .is_some();
        if taken {
            return Err(AttemptError::Collision);
        }

        let barcode_asset = AssetRef::barcode(code.as_str())?;
        let image = self.codec.render_image(code)?;
        self.assets.put(&barcode_asset, &image).await?;
        let mut written = vec![barcode_asset];

        let photo_asset = match &new.photo {
            Some(photo) => match self.write_photo(code.as_str(), photo).await {
                Ok(asset) => {
                    written.push(asset.clone());
                    Some(asset)
                }
                Err(e) => {
                    self.remove_assets(&written).await;
                    return Err(e.into());
                }
            },
            None => None,
        };

        match self
            .insert_row(name, threshold, new, code, photo_asset.as_ref())
            .await
        {
            Ok(model) => Ok(model.into()),
            Err(e) => {
                self.remove_assets(&written).await;
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(AttemptError::Collision)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn insert_row(
        &self,
        name: &str,
        threshold: i64,
        new: &NewProduct,
        code: &BarcodeCode,
        photo: Option<&AssetRef>,
    ) -> std::result::Result<product::Model, DbErr> {
        let txn = self.db.begin().await?;

        let model = product::ActiveModel {
            name: Set(name.to_string()),
            barcode: Set(code.as_str().to_string()),
            quantity: Set(new.quantity),
            low_stock_threshold: Set(threshold),
            image_path: Set(photo.map(|asset| asset.name().to_string())),
            category_id: Set(new.category_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Zero-quantity products start with an empty ledger.
        if new.quantity > 0 {
            TransactionLedger::new(&txn)
                .append(model.id, new.quantity, Direction::In)
                .await?;
        }

        txn.commit().await?;
        Ok(model)
    }

    /// Update name, threshold, category and optionally the photo.
    ///
    /// A new photo is staged under a name distinct from the stored one before
    /// the row changes; the old one is removed only once the row points at
    /// the new one. A failed row update leaves the old photo untouched.
    pub async fn edit(
        &self,
        product_id: i32,
        update: ProductUpdate,
        photo: Option<PhotoUpload>,
    ) -> Result<Product> {
        let name = update
            .name
            .as_deref()
            .map(|name| validate_name("Name", name))
            .transpose()?;
        if let Some(threshold) = update.low_stock_threshold {
            validate_threshold(threshold)?;
        }

        let _guard = self.locks.acquire(product_id).await;
        let existing = self.find_model(product_id).await?;

        if let Some(Some(category_id)) = update.category_id {
            self.ensure_category(category_id).await?;
        }
        if update.is_empty() && photo.is_none() {
            return Ok(existing.into());
        }

        let old_photo = stored_photo(&existing);
        let new_photo = match &photo {
            Some(photo) => {
                let asset = AssetRef::photo_replacing(
                    &existing.barcode,
                    &photo.filename,
                    old_photo.as_ref(),
                )?;
                self.assets.put(&asset, &photo.bytes).await?;
                Some(asset)
            }
            None => None,
        };

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(threshold) = update.low_stock_threshold {
            active.low_stock_threshold = Set(threshold);
        }
        if let Some(category_id) = update.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(asset) = &new_photo {
            active.image_path = Set(Some(asset.name().to_string()));
        }

        let updated = match active.update(&self.db).await {
            Ok(model) => model,
            Err(e) => {
                if let Some(asset) = new_photo {
                    self.remove_assets(&[asset]).await;
                }
                return Err(e.into());
            }
        };

        if let (Some(old), Some(new)) = (&old_photo, &new_photo)
            && old != new
            && let Err(e) = self.assets.delete(old).await
        {
            warn!(product_id, asset = %old, error = %e, "Failed to remove replaced photo");
        }

        info!(product_id, "Updated product");
        Ok(updated.into())
    }

    /// Remove a product: barcode image, photo, ledger, then the row.
    ///
    /// Every step tolerates an earlier, partially completed delete, so a
    /// failed call can simply be repeated.
    pub async fn delete(&self, product_id: i32) -> Result<()> {
        let guard = self.locks.acquire(product_id).await;
        let existing = self.find_model(product_id).await?;

        self.assets
            .delete(&AssetRef::barcode(&existing.barcode)?)
            .await?;
        if let Some(photo) = stored_photo(&existing) {
            self.assets.delete(&photo).await?;
        }

        let txn = self.db.begin().await?;
        let purged = TransactionLedger::new(&txn).purge(product_id).await?;
        product::Entity::delete_by_id(product_id).exec(&txn).await?;
        txn.commit().await?;

        drop(guard);
        self.locks.forget(product_id);

        info!(product_id, barcode = %existing.barcode, purged, "Deleted product");
        Ok(())
    }

    pub async fn get(&self, product_id: i32) -> Result<Product> {
        Ok(self.find_model(product_id).await?.into())
    }

    /// Look a product up by its scanned code.
    pub async fn find_by_code(&self, code: &str) -> Result<Product> {
        let code = BarcodeCode::parse(code)?;
        product::Entity::find()
            .filter(product::Column::Barcode.eq(code.as_str()))
            .one(&self.db)
            .await?
            .map(Product::from)
            .ok_or_else(|| InventoryError::NotFound(format!("No product with code {code}")))
    }

    /// Case-insensitive name or code substring match, capped at `search_limit`.
    ///
    /// An empty term returns the first products by id.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>> {
        let term = term.trim();
        let mut select = product::Entity::find();

        if !term.is_empty() {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::col(product::Column::Barcode)
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }

        let products = select
            .order_by_asc(product::Column::Id)
            .limit(self.config.search_limit)
            .all(&self.db)
            .await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    /// Products newest first, optionally restricted to one category.
    pub async fn list(&self, category_id: Option<i32>) -> Result<Vec<Product>> {
        let mut select = product::Entity::find();
        if let Some(category_id) = category_id {
            select = select.filter(product::Column::CategoryId.eq(category_id));
        }
        let products = select
            .order_by_desc(product::Column::Id)
            .all(&self.db)
            .await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    /// Create a category, or return the existing one with the same name.
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let name = validate_name("Category name", name)?;

        if let Some(existing) = self.find_category_by_name(&name).await? {
            return Ok(existing.into());
        }

        let model = category::ActiveModel {
            name: Set(name.clone()),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(inserted) => {
                info!(category_id = inserted.id, name = %inserted.name, "Created category");
                Ok(inserted.into())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_category_by_name(&name)
                .await?
                .map(Category::from)
                .ok_or_else(|| {
                    InventoryError::Internal(
                        "Category name taken but no row found".into(),
                    )
                }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(categories.into_iter().map(Category::from).collect())
    }

    /// Whether a creation with this code is in flight.
    pub fn is_pending(&self, code: &str) -> bool {
        self.pending.contains(code)
    }

    pub fn assets(&self) -> &Arc<dyn AssetStore> {
        &self.assets
    }

    pub fn locks(&self) -> &ProductLocks {
        &self.locks
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<category::Model>> {
        Ok(category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    async fn ensure_category(&self, category_id: i32) -> Result<()> {
        let exists = category::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(InventoryError::Validation(format!(
                "Category {category_id} does not exist"
            )));
        }
        Ok(())
    }

    async fn find_model(&self, product_id: i32) -> Result<product::Model> {
        product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| InventoryError::product_not_found(product_id))
    }

    async fn write_photo(&self, owner: &str, photo: &PhotoUpload) -> Result<AssetRef> {
        let asset = AssetRef::photo(owner, &photo.filename)?;
        self.assets.put(&asset, &photo.bytes).await?;
        Ok(asset)
    }

    /// Best-effort cleanup of assets written by an operation that then failed.
    async fn remove_assets(&self, assets: &[AssetRef]) {
        for asset in assets {
            if let Err(e) = self.assets.delete(asset).await {
                warn!(asset = %asset, error = %e, "Failed to clean up asset");
            }
        }
    }
}

/// The photo a product row points at, if it names a valid asset.
fn stored_photo(model: &product::Model) -> Option<AssetRef> {
    let name = model.image_path.as_deref()?;
    match AssetRef::new(AssetKind::Photo, name) {
        Ok(asset) => Some(asset),
        Err(e) => {
            warn!(product_id = model.id, image_path = name, error = %e, "Ignoring invalid photo reference");
            None
        }
    }
}
