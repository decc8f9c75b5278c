use serde::{Deserialize, Deserializer};

use crate::error::InventoryError;

/// Escape SQL LIKE wildcards (`%`, `_`, `\`) in user input.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * field absent  => `None`          (don't update)
/// * field = null  => `Some(None)`    (set to NULL)
/// * field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Trim a display name and check it is 1-256 characters.
pub fn validate_name(field: &str, name: &str) -> Result<String, InventoryError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(InventoryError::Validation(format!(
            "{field} must be 1-256 characters"
        )));
    }
    Ok(name.to_string())
}

pub fn validate_threshold(threshold: i64) -> Result<(), InventoryError> {
    if threshold < 0 {
        return Err(InventoryError::Validation(
            "Low stock threshold must be >= 0".into(),
        ));
    }
    Ok(())
}
