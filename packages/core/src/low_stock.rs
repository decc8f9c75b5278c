use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::product;
use crate::models::Product;

/// Read-side view of products at or below their threshold.
pub struct LowStockMonitor<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LowStockMonitor<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn low() -> Select<product::Entity> {
        product::Entity::find().filter(
            Expr::col(product::Column::Quantity).lte(Expr::col(product::Column::LowStockThreshold)),
        )
    }

    /// Products with `quantity <= low_stock_threshold`, emptiest first.
    pub async fn list_low(&self) -> Result<Vec<Product>, DbErr> {
        let products = Self::low()
            .order_by_asc(product::Column::Quantity)
            .order_by_asc(product::Column::Id)
            .all(self.conn)
            .await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    pub async fn count_low(&self) -> Result<u64, DbErr> {
        Self::low().count(self.conn).await
    }
}
