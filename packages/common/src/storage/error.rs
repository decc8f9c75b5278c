use std::fmt;

/// Failures of the photo and barcode image store.
#[derive(Debug)]
pub enum StorageError {
    /// Nothing is stored under this key, e.g. `photos/123456789012_shoe.jpg`.
    NotFound(String),
    Io(std::io::Error),
    /// The name would escape its namespace or is otherwise not a flat filename.
    InvalidName(String),
    /// An upload larger than `storage.max_asset_size`.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "no asset stored at {key}"),
            Self::Io(err) => write!(f, "asset store I/O failed: {err}"),
            Self::InvalidName(msg) => write!(f, "unusable asset name: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => write!(
                f,
                "asset of {actual} bytes is over the {limit}-byte upload limit"
            ),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
