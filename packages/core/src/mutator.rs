use common::Direction;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{debug, warn};

use crate::entity::product;
use crate::error::{InventoryError, Result};
use crate::ledger::TransactionLedger;
use crate::locks::ProductLocks;
use crate::models::{Product, ProductSnapshot, StockWarning};

/// Applies quantity changes: one ledger entry and the matching quantity update,
/// committed together.
#[derive(Clone)]
pub struct StockMutator {
    db: DatabaseConnection,
    locks: ProductLocks,
}

impl StockMutator {
    pub fn new(db: DatabaseConnection, locks: ProductLocks) -> Self {
        Self { db, locks }
    }

    /// Move `amount` units in or out of stock.
    ///
    /// Removing more than is on hand is allowed; the quantity goes negative
    /// and the snapshot carries [`StockWarning::NegativeQuantity`].
    pub async fn apply(
        &self,
        product_id: i32,
        amount: i64,
        direction: Direction,
    ) -> Result<ProductSnapshot> {
        self.apply_inner(product_id, amount, direction, || Ok(()))
            .await
    }

    async fn apply_inner<F>(
        &self,
        product_id: i32,
        amount: i64,
        direction: Direction,
        after_append: F,
    ) -> Result<ProductSnapshot>
    where
        F: FnOnce() -> Result<()>,
    {
        if amount <= 0 {
            return Err(InventoryError::Validation(
                "Amount must be greater than 0".into(),
            ));
        }

        let _guard = self.locks.acquire(product_id).await;
        let txn = self.db.begin().await?;

        if product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(InventoryError::product_not_found(product_id));
        }

        let entry = TransactionLedger::new(&txn)
            .append(product_id, amount, direction)
            .await?;

        after_append()?;

        product::Entity::update_many()
            .col_expr(
                product::Column::Quantity,
                Expr::col(product::Column::Quantity).add(entry.change_amount),
            )
            .filter(product::Column::Id.eq(product_id))
            .exec(&txn)
            .await?;

        let updated = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| InventoryError::product_not_found(product_id))?;

        txn.commit().await?;

        let product = Product::from(updated);
        let warning = if product.quantity < 0 {
            warn!(
                product_id,
                barcode = %product.barcode,
                change_amount = entry.change_amount,
                quantity = product.quantity,
                "Stock removal left negative quantity"
            );
            Some(StockWarning::NegativeQuantity)
        } else {
            None
        };

        debug!(
            product_id,
            change_amount = entry.change_amount,
            quantity = product.quantity,
            "Applied stock change"
        );

        Ok(ProductSnapshot {
            product,
            entry,
            warning,
        })
    }
}
