#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a requested stock movement.
///
/// The caller states the direction explicitly; the sign of the requested
/// amount is ignored when the ledger entry is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Stock coming in.
    In,
    /// Stock going out.
    Out,
}

impl Direction {
    /// Apply the direction to a requested amount: `In` is always positive,
    /// `Out` is always negative, whatever sign the caller passed.
    pub fn signed(&self, requested: i64) -> i64 {
        let magnitude = requested.saturating_abs();
        match self {
            Self::In => magnitude,
            Self::Out => -magnitude,
        }
    }

    /// The ledger kind recorded for this direction.
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::In => TransactionKind::Add,
            Self::Out => TransactionKind::Remove,
        }
    }
}

impl FromStr for Direction {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" | "ADD" => Ok(Self::In),
            "OUT" | "REMOVE" => Ok(Self::Out),
            _ => Err(ParseKindError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Kind of a persisted ledger entry.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Stock added; the entry's change amount is positive.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ADD"))]
    Add,
    /// Stock removed; the entry's change amount is negative.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "REMOVE"))]
    Remove,
}

impl TransactionKind {
    /// All possible kinds.
    pub const ALL: &'static [TransactionKind] = &[Self::Add, Self::Remove];

    /// Returns the string stored in the `transaction_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid kind or direction string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    invalid: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transaction kind '{}'. Valid values: {}",
            self.invalid,
            TransactionKind::ALL
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for TransactionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Self::Add),
            "REMOVE" => Ok(Self::Remove),
            _ => Err(ParseKindError {
                invalid: s.to_string(),
            }),
        }
    }
}
