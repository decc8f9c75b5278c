use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::asset::{AssetKind, AssetRef};
use super::error::StorageError;
use super::traits::AssetStore;

/// Filesystem-backed asset store.
///
/// Assets are stored as `{base_path}/{namespace}/{name}`, one directory per
/// [`AssetKind`]. Writes go to `{base_path}/.tmp` first and are renamed into
/// place.
pub struct FilesystemAssetStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemAssetStore {
    /// Create a new filesystem asset store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path.join(".tmp")).await?;
        for kind in AssetKind::ALL {
            fs::create_dir_all(base_path.join(kind.namespace())).await?;
        }
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute the filesystem path for an asset.
    pub fn asset_path(&self, asset: &AssetRef) -> PathBuf {
        self.base_path
            .join(asset.kind().namespace())
            .join(asset.name())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn put(&self, asset: &AssetRef, data: &[u8]) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let temp_path = self.temp_path();
        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let final_path = self.asset_path(asset);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(asset = %asset, size = data.len(), "Stored asset");
        Ok(())
    }

    async fn get(&self, asset: &AssetRef) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.asset_path(asset)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(asset.key()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, asset: &AssetRef) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.asset_path(asset)).await?)
    }

    async fn delete(&self, asset: &AssetRef) -> Result<bool, StorageError> {
        match fs::remove_file(self.asset_path(asset)).await {
            Ok(()) => {
                tracing::debug!(asset = %asset, "Deleted asset");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, kind: AssetKind) -> Result<Vec<AssetRef>, StorageError> {
        let dir = self.base_path.join(kind.namespace());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut assets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            // Skip anything we would not have written ourselves.
            if let Ok(asset) = AssetRef::new(kind, name) {
                assets.push(asset);
            }
        }
        assets.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(assets)
    }
}
