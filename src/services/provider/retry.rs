//! Retry helper for read-only RPC calls.
//!
//! Transient failures (timeouts, rate limits, 5xx) are retried with an exponential backoff.
//! Writes are never routed through this helper: resubmitting a transaction is a decision
//! for the batch runner, not the transport.

use std::{future::Future, time::Duration};

use log::{debug, warn};

use super::{is_retriable_error, ProviderError};
use crate::constants::{
    DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_RETRY_BASE_DELAY_MS, DEFAULT_RPC_RETRY_MAX_DELAY_MS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RPC_MAX_RETRIES,
            base_delay_ms: DEFAULT_RPC_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RPC_RETRY_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
        }
    }
}

/// Backoff for the given retry number (0-based), capped at `max_delay_ms`.
pub fn calculate_retry_delay(retry: u32, base_delay_ms: u64, max_delay_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
    Duration::from_millis(base_delay_ms.saturating_mul(factor).min(max_delay_ms))
}

pub async fn retry_rpc_call<T, F, Fut>(
    operation_name: &str,
    config: &RetryConfig,
    operation: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut retry = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retriable_error(&e) && retry < config.max_retries => {
                let delay = calculate_retry_delay(retry, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "RPC operation '{}' failed ({}), retry {}/{} in {:?}",
                    operation_name,
                    e,
                    retry + 1,
                    config.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) => {
                debug!("RPC operation '{}' failed permanently: {}", operation_name, e);
                return Err(e);
            }
        }
    }
}
