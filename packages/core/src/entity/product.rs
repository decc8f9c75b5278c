use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// 12-digit product code. Assigned once, never changed.
    #[sea_orm(unique)]
    pub barcode: String,

    /// Cached on-hand quantity; always equals the sum of this product's ledger entries.
    pub quantity: i64,
    pub low_stock_threshold: i64,

    /// Stored photo name within the `photos` namespace.
    pub image_path: Option<String>,

    /// NULL for uncategorised products.
    pub category_id: Option<i32>,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: Option<super::category::Entity>,

    #[sea_orm(has_many)]
    pub transactions: HasMany<super::stock_transaction::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
