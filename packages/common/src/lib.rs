pub mod barcode;
pub mod config;
pub mod retry;
pub mod storage;
pub mod transaction_kind;

pub use transaction_kind::{Direction, ParseKindError, TransactionKind};
