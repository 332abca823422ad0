use serde::Serialize;
use thiserror::Error;

use super::AmountError;
use crate::{models::FailureKind, services::provider::ProviderError};

/// Errors raised while executing a single swap attempt.
///
/// Every variant maps onto exactly one [`FailureKind`]; the executor converts these into a
/// failed attempt outcome instead of propagating them.
#[derive(Error, Debug, Serialize)]
pub enum SwapError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Invalid swap intent: {0}")]
    InvalidIntent(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Approval rejected: {0}")]
    ApprovalRejected(String),

    #[error("Approval not confirmed in time: {0}")]
    ApprovalTimeout(String),

    #[error("Swap submission or confirmation failed: {0}")]
    SubmitOrConfirm(String),

    #[error("Swap not confirmed in time: {0}")]
    SwapTimeout(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl SwapError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SwapError::InvalidAmount(_) => FailureKind::InvalidAmount,
            SwapError::InvalidIntent(_) => FailureKind::InvalidIntent,
            SwapError::InsufficientBalance(_) => FailureKind::InsufficientBalance,
            SwapError::ApprovalRejected(_) => FailureKind::ApprovalRejected,
            SwapError::ApprovalTimeout(_) => FailureKind::ApprovalTimeout,
            SwapError::SubmitOrConfirm(_) => FailureKind::SubmitOrConfirmError,
            SwapError::SwapTimeout(_) => FailureKind::SwapTimeout,
            SwapError::ProviderUnavailable(_) => FailureKind::ProviderUnavailable,
        }
    }

    /// Keeps `ProviderUnavailable` for unreachable endpoints and classifies every other
    /// provider failure with `fallback`.
    pub fn from_provider(err: ProviderError, fallback: fn(String) -> SwapError) -> Self {
        if err.is_unavailable() {
            SwapError::ProviderUnavailable(err.to_string())
        } else {
            fallback(err.to_string())
        }
    }
}

/// Provider failures surface as `ProviderUnavailable` when the endpoint cannot be reached and
/// as a submit/confirm failure otherwise.
impl From<ProviderError> for SwapError {
    fn from(err: ProviderError) -> Self {
        SwapError::from_provider(err, SwapError::SubmitOrConfirm)
    }
}
