use std::future::Future;
use std::time::{Duration, Instant};

use alloy::primitives::TxHash;
use log::{debug, warn};
use thiserror::Error;

use crate::services::provider::{EvmProviderTrait, ProviderError, ReceiptSummary};

#[derive(Error, Debug, Clone)]
pub enum ConfirmationError {
    #[error("Transaction {tx_hash} not confirmed after {waited:?}")]
    Timeout { tx_hash: TxHash, waited: Duration },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Polls until `check` yields a value or `max_wait` elapses.
///
/// # Arguments
/// * `check` - Closure returning `Ok(Some(_))` when done, `Ok(None)` to keep polling
/// * `max_wait` - Ceiling for the whole wait; `None` waits indefinitely
/// * `poll_interval` - Time to sleep between polls
/// * `operation_name` - Name of the operation for logging
///
/// # Returns
/// * `Ok(Some(value))` - Condition was met within the ceiling
/// * `Ok(None)` - Ceiling reached without the condition being met
/// * `Err(_)` - The endpoint is unreachable; other errors are logged and polling continues
pub async fn poll_until<T, F, Fut>(
    check: F,
    max_wait: Option<Duration>,
    poll_interval: Duration,
    operation_name: &str,
) -> Result<Option<T>, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>, ProviderError>>,
{
    let start = Instant::now();

    loop {
        match check().await {
            Ok(Some(value)) => {
                debug!("{} completed", operation_name);
                return Ok(Some(value));
            }
            Ok(None) => {}
            Err(e) if e.is_unavailable() => return Err(e),
            Err(e) => {
                warn!("Error checking {} status while waiting: {}", operation_name, e);
            }
        }

        if max_wait.is_some_and(|ceiling| start.elapsed() > ceiling) {
            warn!("Timed out waiting for {} to complete", operation_name);
            return Ok(None);
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Waits for the receipt of `tx_hash`.
pub async fn wait_for_receipt<P>(
    provider: &P,
    tx_hash: TxHash,
    max_wait: Option<Duration>,
    poll_interval: Duration,
) -> Result<ReceiptSummary, ConfirmationError>
where
    P: EvmProviderTrait + ?Sized,
{
    let start = Instant::now();
    let operation_name = format!("receipt of {tx_hash}");

    poll_until(
        || provider.get_transaction_receipt(tx_hash),
        max_wait,
        poll_interval,
        &operation_name,
    )
    .await?
    .ok_or_else(|| ConfirmationError::Timeout {
        tx_hash,
        waited: start.elapsed(),
    })
}
