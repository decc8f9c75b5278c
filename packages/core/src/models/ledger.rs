use chrono::{DateTime, Utc};
use common::TransactionKind;
use serde::{Deserialize, Serialize};

use crate::entity::stock_transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: i32,
    pub product_id: i32,
    pub change_amount: i64,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl From<stock_transaction::Model> for TransactionEntry {
    fn from(m: stock_transaction::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            change_amount: m.change_amount,
            kind: m.transaction_type,
            timestamp: m.timestamp,
        }
    }
}

/// Which part of a product's history to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HistoryWindow {
    /// Inclusive lower bound on the entry timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the entry timestamp.
    pub until: Option<DateTime<Utc>>,
    /// Most entries yielded overall; `None` reads the whole window.
    pub limit: Option<u64>,
    /// Rows fetched per round trip.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page_size() -> u64 {
    100
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            since: None,
            until: None,
            limit: None,
            page_size: default_page_size(),
        }
    }
}

impl HistoryWindow {
    pub fn latest(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }
}
