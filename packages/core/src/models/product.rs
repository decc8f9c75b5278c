use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::TransactionEntry;
use super::shared::double_option;
use crate::entity::{category, product};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl From<category::Model> for Category {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub barcode: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    /// Photo name within the `photos` namespace.
    pub image_path: Option<String>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

impl From<product::Model> for Product {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            barcode: m.barcode,
            quantity: m.quantity,
            low_stock_threshold: m.low_stock_threshold,
            image_path: m.image_path,
            category_id: m.category_id,
            created_at: m.created_at,
        }
    }
}

/// An uploaded photo: the client's filename and the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i64,
    /// Falls back to `catalog.default_threshold` when absent.
    pub low_stock_threshold: Option<i64>,
    pub category_id: Option<i32>,
    pub photo: Option<PhotoUpload>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            ..Default::default()
        }
    }

    pub fn threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }

    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn photo(mut self, photo: PhotoUpload) -> Self {
        self.photo = Some(photo);
        self
    }
}

/// Editable product fields. Quantity only changes through stock adjustments
/// and the barcode never changes.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub low_stock_threshold: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i32>>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockWarning {
    /// More was removed than was on hand.
    NegativeQuantity,
}

/// Product state right after a stock adjustment, with the entry that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSnapshot {
    pub product: Product,
    pub entry: TransactionEntry,
    pub warning: Option<StockWarning>,
}
