mod asset;
mod error;
mod traits;

pub mod filesystem;

pub use asset::{AssetKind, AssetRef, sanitize_filename};
pub use error::StorageError;
pub use filesystem::FilesystemAssetStore;
pub use traits::AssetStore;
