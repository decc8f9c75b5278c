use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::CodeError;

/// Number of digits in a product code.
pub const CODE_LEN: usize = 12;

/// A validated 12-digit numeric product code.
///
/// This is the durable identity of a product: it is assigned once at creation
/// and never regenerated.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BarcodeCode(String);

impl BarcodeCode {
    /// Draw a random candidate code from the thread-local RNG.
    ///
    /// Uniqueness is not guaranteed; the caller checks the candidate against
    /// the catalog and draws again on collision.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Draw a random candidate code from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let digits: String = (0..CODE_LEN)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
        Self(digits)
    }

    /// Parse and validate a code string.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let trimmed = s.trim();
        if trimmed.len() != CODE_LEN {
            return Err(CodeError::WrongLength {
                expected: CODE_LEN,
                actual: trimmed.len(),
            });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NotNumeric(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for BarcodeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BarcodeCode({})", self.0)
    }
}

impl fmt::Display for BarcodeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BarcodeCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BarcodeCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BarcodeCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BarcodeCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
