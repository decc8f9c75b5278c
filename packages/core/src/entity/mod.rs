pub mod category;
pub mod product;
pub mod stock_transaction;
