pub mod ledger;
pub mod maintenance;
pub mod product;
pub mod shared;

pub use ledger::{HistoryWindow, TransactionEntry};
pub use maintenance::{DailyOutflow, Drift, GcReport, ReconcileReport, StockSummary};
pub use product::{
    Category, NewProduct, PhotoUpload, Product, ProductSnapshot, ProductUpdate, StockWarning,
};
