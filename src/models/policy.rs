use std::time::Duration;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::constants::{DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECONDS};

/// How much the router is allowed to spend when an approval is needed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ApprovalPolicy {
    /// Approve exactly the amount of the pending swap.
    #[default]
    #[strum(serialize = "exact", serialize = "exact_amount")]
    ExactAmount,
    /// Approve `U256::MAX` so later swaps skip the approval step. Opt-in only.
    #[strum(serialize = "unbounded", serialize = "max")]
    Unbounded,
}

impl ApprovalPolicy {
    pub fn approval_amount(&self, required: U256) -> U256 {
        match self {
            ApprovalPolicy::ExactAmount => required,
            ApprovalPolicy::Unbounded => U256::MAX,
        }
    }
}

/// How long to wait for a transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// `None` waits until the receipt shows up.
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECONDS)),
            poll_interval: Duration::from_millis(DEFAULT_CONFIRMATION_POLL_INTERVAL_MS),
        }
    }
}
