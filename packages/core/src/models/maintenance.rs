use chrono::NaiveDate;
use common::storage::AssetRef;
use serde::Serialize;

use super::product::Product;

/// Headline numbers behind a stock overview.
#[derive(Debug, Clone, Serialize)]
pub struct StockSummary {
    pub total_products: u64,
    pub low_stock_count: u64,
    /// Lowest quantities first.
    pub lowest: Vec<Product>,
    /// Units removed per day, most recent day first. Days without removals are omitted.
    pub daily_outflow: Vec<DailyOutflow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyOutflow {
    pub date: NaiveDate,
    /// Positive number of units removed.
    pub units: i64,
}

/// A product whose cached quantity disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub product_id: i32,
    pub barcode: String,
    pub cached: i64,
    pub ledger: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub checked: u64,
    pub drifted: Vec<Drift>,
    /// Number of products whose cached quantity was rewritten.
    pub repaired: u64,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.drifted.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GcReport {
    pub scanned: u64,
    pub removed: Vec<AssetRef>,
    /// Orphans found but not removed, with the failure reason.
    pub failed: Vec<(AssetRef, String)>,
}
