use serde::Serialize;
use thiserror::Error;

/// Errors raised while converting between human amounts and base units.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AmountError {
    #[error("Invalid amount '{0}': {1}")]
    InvalidAmount(String, String),

    #[error("Unsupported decimals count: {0}")]
    UnsupportedDecimals(u8),

    #[error("Amount '{0}' does not fit in 256 bits")]
    Overflow(String),
}
