use common::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ledger entry. Rows are only ever inserted, or purged together with their product.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: i32,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: HasOne<super::product::Entity>,

    /// Positive for ADD, negative for REMOVE.
    pub change_amount: i64,
    pub transaction_type: TransactionKind,

    pub timestamp: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
