use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Longest stored asset name, in bytes.
const MAX_NAME_LEN: usize = 200;

/// Namespace an asset lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Product photo uploaded by a user.
    Photo,
    /// Rendered barcode image.
    Barcode,
}

impl AssetKind {
    pub const ALL: &'static [AssetKind] = &[Self::Photo, Self::Barcode];

    /// Directory (or key prefix) holding assets of this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Photo => "photos",
            Self::Barcode => "barcodes",
        }
    }
}

/// Reference to a stored asset: a kind plus a flat, validated name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    kind: AssetKind,
    name: String,
}

impl AssetRef {
    /// Reference an existing asset by kind and stored name.
    pub fn new(kind: AssetKind, name: impl Into<String>) -> Result<Self, StorageError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { kind, name })
    }

    /// The barcode image for a product code: `{code}.png`.
    pub fn barcode(code: &str) -> Result<Self, StorageError> {
        Self::new(AssetKind::Barcode, format!("{code}.png"))
    }

    /// A product photo: `{owner}_{sanitized original filename}`.
    pub fn photo(owner: &str, original_filename: &str) -> Result<Self, StorageError> {
        let cleaned = sanitize_filename(original_filename);
        let cleaned = if cleaned.is_empty() {
            "photo".to_string()
        } else {
            cleaned
        };
        let mut name = format!("{owner}_{cleaned}");
        if name.len() > MAX_NAME_LEN {
            let mut cut = MAX_NAME_LEN;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }
        Self::new(AssetKind::Photo, name)
    }

    /// A photo name for a new upload that never equals `current`.
    ///
    /// Re-uploading under the stored filename would otherwise overwrite the
    /// live photo before the product row is repointed, so a clashing name
    /// gets a short random tag before its extension.
    pub fn photo_replacing(
        owner: &str,
        original_filename: &str,
        current: Option<&AssetRef>,
    ) -> Result<Self, StorageError> {
        let asset = Self::photo(owner, original_filename)?;
        if current != Some(&asset) {
            return Ok(asset);
        }

        let tag = uuid::Uuid::new_v4().simple().to_string();
        let tag = &tag[..8];
        let (stem, ext) = match asset.name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (asset.name.as_str(), String::new()),
        };

        let mut stem = stem.to_string();
        let room = MAX_NAME_LEN.saturating_sub(tag.len() + 1 + ext.len());
        if stem.len() > room {
            let mut cut = room;
            while !stem.is_char_boundary(cut) {
                cut -= 1;
            }
            stem.truncate(cut);
        }
        Self::new(AssetKind::Photo, format!("{stem}_{tag}{ext}"))
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relative key within the store, e.g. `photos/123456789012_shoe.jpg`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind.namespace(), self.name)
    }
}

impl fmt::Debug for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetRef({})", self.key())
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Reduce an uploaded filename to `[A-Za-z0-9._-]`, with spaces turned into
/// underscores and leading dots or underscores dropped.
pub fn sanitize_filename(filename: &str) -> String {
    // Only the last path component of whatever the client sent.
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let mapped: String = base
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '-' | '_' => Some(c),
            ' ' => Some('_'),
            _ => None,
        })
        .collect();

    mapped.trim_start_matches(['.', '_']).to_string()
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidName("name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StorageError::InvalidName(format!(
            "name exceeds {MAX_NAME_LEN} bytes"
        )));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(StorageError::InvalidName(
            "control characters are not allowed".into(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(StorageError::InvalidName(
            "path separators are not allowed".into(),
        ));
    }
    if name.starts_with('.') {
        return Err(StorageError::InvalidName(
            "hidden names (starting with '.') are not allowed".into(),
        ));
    }
    Ok(())
}
