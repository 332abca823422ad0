use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum SignerError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Credential {index} is not available: {reason}")]
    CredentialUnavailable { index: usize, reason: String },

    #[error("Credential source error: {0}")]
    Source(String),
}
