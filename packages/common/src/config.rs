use std::path::PathBuf;

use serde::Deserialize;

use crate::barcode::RenderOptions;

/// Asset storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory holding the `photos/` and `barcodes/` namespaces. Default: "./static".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Largest accepted asset, in bytes. Default: 16 MiB.
    #[serde(default = "default_max_asset_size")]
    pub max_asset_size: u64,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./static")
}
fn default_max_asset_size() -> u64 {
    16 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_asset_size: default_max_asset_size(),
        }
    }
}

/// Barcode raster layout.
#[derive(Debug, Deserialize, Clone)]
pub struct BarcodeConfig {
    /// Pixel width of one module. Default: 2.
    #[serde(default = "default_module_px")]
    pub module_px: u32,
    /// Bar height in pixels. Default: 80.
    #[serde(default = "default_height_px")]
    pub height_px: u32,
    /// Quiet zone on each side, in modules. Default: 10.
    #[serde(default = "default_quiet_modules")]
    pub quiet_modules: u32,
}

fn default_module_px() -> u32 {
    2
}
fn default_height_px() -> u32 {
    80
}
fn default_quiet_modules() -> u32 {
    10
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            module_px: default_module_px(),
            height_px: default_height_px(),
            quiet_modules: default_quiet_modules(),
        }
    }
}

impl From<&BarcodeConfig> for RenderOptions {
    fn from(config: &BarcodeConfig) -> Self {
        Self {
            module_px: config.module_px.max(1),
            height_px: config.height_px.max(1),
            quiet_modules: config.quiet_modules,
        }
    }
}
