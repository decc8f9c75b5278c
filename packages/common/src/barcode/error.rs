use thiserror::Error;

/// Errors raised while validating, encoding or scanning a product code.
#[derive(Debug, Error)]
pub enum CodeError {
    #[error("code must be {expected} digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("code must be numeric: {0}")]
    NotNumeric(String),

    #[error("malformed symbol: {0}")]
    Symbol(String),

    #[error("image encoding failed: {0}")]
    Image(String),
}

impl From<png::EncodingError> for CodeError {
    fn from(err: png::EncodingError) -> Self {
        CodeError::Image(err.to_string())
    }
}

impl From<png::DecodingError> for CodeError {
    fn from(err: png::DecodingError) -> Self {
        CodeError::Image(err.to_string())
    }
}
