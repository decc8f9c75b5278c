use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::TransactionKind;
use common::barcode::CODE_LEN;
use common::storage::{AssetKind, AssetRef, AssetStore};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, warn};

use crate::catalog::ProductCatalog;
use crate::entity::{product, stock_transaction};
use crate::error::Result;
use crate::ledger::TransactionLedger;
use crate::low_stock::LowStockMonitor;
use crate::models::{DailyOutflow, Drift, GcReport, Product, ReconcileReport, StockSummary};

/// How many of the emptiest products a summary lists.
const SUMMARY_LOWEST: u64 = 8;

/// Verification and cleanup jobs that look across the whole catalog.
#[derive(Clone)]
pub struct Maintenance {
    db: DatabaseConnection,
    catalog: ProductCatalog,
}

impl Maintenance {
    pub fn new(db: DatabaseConnection, catalog: ProductCatalog) -> Self {
        Self { db, catalog }
    }

    /// Product counts, the emptiest products and recent daily removals.
    pub async fn stock_summary(&self, days: u32) -> Result<StockSummary> {
        let total_products = product::Entity::find().count(&self.db).await?;
        let low_stock_count = LowStockMonitor::new(&self.db).count_low().await?;

        let lowest = product::Entity::find()
            .order_by_asc(product::Column::Quantity)
            .order_by_asc(product::Column::Id)
            .limit(SUMMARY_LOWEST)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();

        let since = Utc::now() - chrono::Duration::days(i64::from(days));
        let removals: Vec<(DateTime<Utc>, i64)> = stock_transaction::Entity::find()
            .select_only()
            .column(stock_transaction::Column::Timestamp)
            .column(stock_transaction::Column::ChangeAmount)
            .filter(stock_transaction::Column::TransactionType.eq(TransactionKind::Remove))
            .filter(stock_transaction::Column::Timestamp.gte(since))
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut by_day: BTreeMap<_, i64> = BTreeMap::new();
        for (timestamp, change) in removals {
            *by_day.entry(timestamp.date_naive()).or_default() += change.saturating_abs();
        }
        let daily_outflow = by_day
            .into_iter()
            .rev()
            .take(days as usize)
            .map(|(date, units)| DailyOutflow { date, units })
            .collect();

        Ok(StockSummary {
            total_products,
            low_stock_count,
            lowest,
            daily_outflow,
        })
    }

    /// Compare every cached quantity with its ledger sum.
    ///
    /// With `repair`, drifted quantities are overwritten with the ledger sum.
    /// Each product is checked under its mutation lock so in-flight
    /// adjustments are never reported as drift.
    pub async fn reconcile(&self, repair: bool) -> Result<ReconcileReport> {
        let ids: Vec<i32> = product::Entity::find()
            .select_only()
            .column(product::Column::Id)
            .order_by_asc(product::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut report = ReconcileReport::default();
        for product_id in ids {
            let _guard = self.catalog.locks().acquire(product_id).await;
            let txn = self.db.begin().await?;

            // Deleted since the id scan.
            let Some(model) = product::Entity::find_by_id(product_id).one(&txn).await? else {
                continue;
            };
            report.checked += 1;

            let ledger = TransactionLedger::new(&txn).sum_for(product_id).await?;
            if ledger == model.quantity {
                continue;
            }

            warn!(
                product_id,
                barcode = %model.barcode,
                cached = model.quantity,
                ledger,
                "Quantity drift detected"
            );

            if repair {
                product::Entity::update_many()
                    .col_expr(product::Column::Quantity, Expr::value(ledger))
                    .filter(product::Column::Id.eq(product_id))
                    .exec(&txn)
                    .await?;
                txn.commit().await?;
                report.repaired += 1;
                info!(product_id, quantity = ledger, "Repaired cached quantity");
            }

            report.drifted.push(Drift {
                product_id,
                barcode: model.barcode,
                cached: model.quantity,
                ledger,
            });
        }

        Ok(report)
    }

    /// Delete stored assets that no product references.
    ///
    /// Assets of a creation still in flight are left alone; an asset whose
    /// owner exists is re-checked under that product's lock before removal.
    pub async fn collect_orphan_assets(&self) -> Result<GcReport> {
        let assets = self.catalog.assets();
        let mut report = GcReport::default();

        for kind in AssetKind::ALL {
            for asset in assets.list(*kind).await? {
                report.scanned += 1;

                let owner = owner_code(&asset);
                if owner.is_some_and(|code| self.catalog.is_pending(code)) {
                    continue;
                }

                let owner_id = match owner {
                    Some(code) => self.product_id_for(code).await?,
                    None => None,
                };
                let _guard = match owner_id {
                    Some(id) => Some(self.catalog.locks().acquire(id).await),
                    None => None,
                };

                if self.is_referenced(&asset).await? {
                    continue;
                }

                match assets.delete(&asset).await {
                    Ok(_) => {
                        info!(asset = %asset, "Removed orphaned asset");
                        report.removed.push(asset);
                    }
                    Err(e) => {
                        warn!(asset = %asset, error = %e, "Failed to remove orphaned asset");
                        report.failed.push((asset, e.to_string()));
                    }
                }
            }
        }

        Ok(report)
    }

    async fn product_id_for(&self, code: &str) -> Result<Option<i32>> {
        Ok(product::Entity::find()
            .select_only()
            .column(product::Column::Id)
            .filter(product::Column::Barcode.eq(code))
            .into_tuple()
            .one(&self.db)
            .await?)
    }

    async fn is_referenced(&self, asset: &AssetRef) -> Result<bool> {
        let filter = match asset.kind() {
            AssetKind::Barcode => {
                let Some(code) = asset.name().strip_suffix(".png") else {
                    return Ok(false);
                };
                product::Column::Barcode.eq(code)
            }
            AssetKind::Photo => product::Column::ImagePath.eq(asset.name()),
        };

        let count = product::Entity::find()
            .filter(filter)
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

/// The product code an asset name starts with, if any.
fn owner_code(asset: &AssetRef) -> Option<&str> {
    let code = asset.name().get(..CODE_LEN)?;
    code.bytes().all(|b| b.is_ascii_digit()).then_some(code)
}
