use serde::Serialize;
use thiserror::Error;

use alloy::transports::{RpcError, TransportError, TransportErrorKind};

pub mod evm;
pub use evm::*;

mod retry;
pub use retry::*;

#[derive(Error, Debug, Clone, Serialize)]
pub enum ProviderError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("Request timeout")]
    Timeout,
    #[error("Rate limited (HTTP 429)")]
    RateLimited,
    #[error("Bad gateway (HTTP 502)")]
    BadGateway,
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },
    #[error("JSON-RPC error (code {code}): {message}")]
    RpcErrorCode { code: i64, message: String },
    #[error("Contract call returned malformed data: {0}")]
    Decode(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Other provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Determines if this error is transient (can retry) or permanent (should fail).
    pub fn is_transient(&self) -> bool {
        is_retriable_error(self)
    }

    /// The endpoint itself cannot be reached; every following call would fail the same way.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProviderError::Unreachable(_))
    }
}

/// Categorizes a reqwest error into an appropriate `ProviderError` variant.
///
/// - Connection failures become `ProviderError::Unreachable`
/// - Timeout errors become `ProviderError::Timeout`
/// - HTTP 429 responses become `ProviderError::RateLimited`
/// - HTTP 502 responses become `ProviderError::BadGateway`
/// - All other errors become `ProviderError::Other` with the error message
fn categorize_reqwest_error(err: &reqwest::Error) -> ProviderError {
    if err.is_connect() {
        return ProviderError::Unreachable(err.to_string());
    }

    if err.is_timeout() {
        return ProviderError::Timeout;
    }

    if let Some(status) = err.status() {
        return categorize_status_code(status.as_u16(), err.to_string());
    }

    ProviderError::Other(err.to_string())
}

fn categorize_status_code(status_code: u16, error: String) -> ProviderError {
    match status_code {
        429 => ProviderError::RateLimited,
        502 => ProviderError::BadGateway,
        _ => ProviderError::RequestError { error, status_code },
    }
}

fn categorize_transport_error(kind: TransportErrorKind) -> ProviderError {
    match kind {
        TransportErrorKind::HttpError(http) => categorize_status_code(http.status, http.body),
        TransportErrorKind::Custom(inner) => match inner.downcast_ref::<reqwest::Error>() {
            Some(reqwest_err) => categorize_reqwest_error(reqwest_err),
            None => ProviderError::TransportError(inner.to_string()),
        },
        TransportErrorKind::BackendGone => {
            ProviderError::Unreachable("transport backend gone".to_string())
        }
        other => ProviderError::TransportError(other.to_string()),
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        categorize_reqwest_error(&err)
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::Transport(kind) => categorize_transport_error(kind),
            RpcError::ErrorResp(payload) => ProviderError::RpcErrorCode {
                code: payload.code,
                message: payload.message.to_string(),
            },
            other => ProviderError::Other(format!("Other RPC error: {other}")),
        }
    }
}

impl From<alloy::sol_types::Error> for ProviderError {
    fn from(err: alloy::sol_types::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

// Errors that are retriable
pub fn is_retriable_error(error: &ProviderError) -> bool {
    match error {
        ProviderError::Timeout
        | ProviderError::RateLimited
        | ProviderError::BadGateway
        | ProviderError::TransportError(_) => true,

        ProviderError::RequestError { status_code, .. } => match *status_code {
            501 | 505 => false,
            500 | 502..=504 | 506..=599 => true,
            408 | 425 | 429 => true,
            _ => false,
        },

        ProviderError::Unreachable(_)
        | ProviderError::InvalidAddress(_)
        | ProviderError::NetworkConfiguration(_)
        | ProviderError::RpcErrorCode { .. }
        | ProviderError::Decode(_)
        | ProviderError::Other(_) => false,
    }
}
