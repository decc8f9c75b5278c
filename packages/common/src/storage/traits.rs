use async_trait::async_trait;

use super::asset::{AssetKind, AssetRef};
use super::error::StorageError;

/// Name-addressed storage for product photos and barcode images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store bytes under the asset's name, replacing any previous content.
    ///
    /// The write is atomic: readers see either the old content or the new
    /// content, never a partial file.
    async fn put(&self, asset: &AssetRef, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve all bytes of an asset.
    async fn get(&self, asset: &AssetRef) -> Result<Vec<u8>, StorageError>;

    /// Check whether an asset exists.
    async fn exists(&self, asset: &AssetRef) -> Result<bool, StorageError>;

    /// Delete an asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    /// A missing asset is not an error.
    async fn delete(&self, asset: &AssetRef) -> Result<bool, StorageError>;

    /// List every asset of one kind.
    async fn list(&self, kind: AssetKind) -> Result<Vec<AssetRef>, StorageError>;

    /// Store-level swap: write `new`, then remove `old` once the write has
    /// succeeded.
    ///
    /// If the write fails, `old` is left untouched and the error is returned.
    /// Failing to remove `old` afterwards leaves an orphan but still reports
    /// success. Callers that must repoint a database row between the two
    /// steps (product photo edits) stage `new` with
    /// [`AssetRef::photo_replacing`] and delete `old` themselves.
    async fn replace(
        &self,
        old: Option<&AssetRef>,
        new: &AssetRef,
        data: &[u8],
    ) -> Result<(), StorageError> {
        self.put(new, data).await?;

        if let Some(old) = old.filter(|old| *old != new)
            && let Err(e) = self.delete(old).await
        {
            tracing::warn!(asset = %old, error = %e, "Failed to remove replaced asset");
        }

        Ok(())
    }
}
