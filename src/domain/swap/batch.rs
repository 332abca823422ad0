//! Wallets x attempts loop.
//!
//! Wallets run strictly one after another and so do their attempts. A wallet that fails,
//! including one whose key cannot be loaded, never stops the batch; only an unreachable
//! provider or a shutdown request ends the run early.

use std::{collections::HashMap, fmt, time::Duration};

use log::{error, info, warn};
use serde::Serialize;
use tokio::{sync::watch, time::sleep};

use super::{finish_attempt, log_attempt, SwapExecutor};
use crate::{
    constants::{DEFAULT_SWAP_COUNT, DEFAULT_SWAP_DELAY_MS},
    models::{ConfigError, FailureKind, SwapAttempt, SwapIntent, SwapOutcome},
    services::{provider::EvmProviderTrait, signer::CredentialSource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub attempts_per_wallet: u32,
    /// Pause after every attempt, whatever its outcome.
    pub delay_between_attempts: Duration,
    /// Skip a wallet's remaining attempts once one fails for lack of balance.
    pub abort_wallet_on_insufficient_balance: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            attempts_per_wallet: DEFAULT_SWAP_COUNT,
            delay_between_attempts: Duration::from_millis(DEFAULT_SWAP_DELAY_MS),
            abort_wallet_on_insufficient_balance: true,
        }
    }
}

impl BatchConfig {
    pub fn new(
        attempts_per_wallet: u32,
        delay_between_attempts: Duration,
        abort_wallet_on_insufficient_balance: bool,
    ) -> Result<Self, ConfigError> {
        if attempts_per_wallet == 0 {
            return Err(ConfigError::invalid(
                "SWAP_COUNT",
                "at least one attempt per wallet is required",
            ));
        }
        Ok(Self {
            attempts_per_wallet,
            delay_between_attempts,
            abort_wallet_on_insufficient_balance,
        })
    }
}

/// A wallet whose credential could not be turned into a signer.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedWallet {
    /// 0-based position in the credential source.
    pub position: usize,
    pub reason: String,
}

/// Everything a run produced, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub attempts: Vec<SwapAttempt>,
    pub skipped_wallets: Vec<SkippedWallet>,
    /// Why the run stopped early, when the provider became unreachable.
    pub aborted: Option<String>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn confirmed(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_confirmed()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome.failure_kind().is_some())
            .count()
    }

    pub fn unknown(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, SwapOutcome::Unknown { .. }))
            .count()
    }

    pub fn failures_by_kind(&self) -> HashMap<FailureKind, usize> {
        let mut counts = HashMap::new();
        for kind in self.attempts.iter().filter_map(|a| a.outcome.failure_kind()) {
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempts: {} confirmed, {} failed, {} unknown; {} wallets skipped",
            self.attempts.len(),
            self.confirmed(),
            self.failed(),
            self.unknown(),
            self.skipped_wallets.len()
        )?;
        if let Some(reason) = &self.aborted {
            write!(f, "; aborted: {reason}")?;
        }
        if self.cancelled {
            write!(f, "; cancelled")?;
        }
        Ok(())
    }
}

/// Resolves once shutdown is requested. A dropped sender means shutdown can no longer
/// be requested, so the future then never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub struct BatchRunner<P>
where
    P: EvmProviderTrait,
{
    executor: SwapExecutor<P>,
    config: BatchConfig,
}

impl<P> BatchRunner<P>
where
    P: EvmProviderTrait,
{
    pub fn new(executor: SwapExecutor<P>, config: BatchConfig) -> Self {
        Self { executor, config }
    }

    /// Runs every attempt of every wallet in `credentials`.
    ///
    /// Setting `shutdown` to `true` stops the run; an attempt that is in flight at that
    /// moment is recorded as `Unknown` since its transaction may still be mined.
    pub async fn run(
        &self,
        credentials: &dyn CredentialSource,
        intent: &SwapIntent,
        mut shutdown: watch::Receiver<bool>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let wallet_count = credentials.len();
        info!(
            "Starting batch: {} wallets x {} attempts, swapping {}",
            wallet_count, self.config.attempts_per_wallet, intent
        );

        'wallets: for position in 0..wallet_count {
            if *shutdown.borrow() {
                report.cancelled = true;
                break;
            }

            // The signer, and the key it was built from, live only for this wallet's attempts.
            let signer = match credentials.load_signer(position) {
                Ok(signer) => signer,
                Err(e) => {
                    error!("Skipping wallet {}/{}: {}", position + 1, wallet_count, e);
                    report.skipped_wallets.push(SkippedWallet {
                        position,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            info!(
                "Wallet {}/{}: {}",
                position + 1,
                wallet_count,
                signer.address()
            );

            for index in 1..=self.config.attempts_per_wallet {
                let mut attempt = SwapAttempt::new(signer.address(), index);
                let result = tokio::select! {
                    biased;
                    _ = shutdown_requested(&mut shutdown) => None,
                    result = self.executor.run_attempt(&signer, intent, &mut attempt) => Some(result),
                };

                let Some(result) = result else {
                    attempt.mark_unknown();
                    log_attempt(&attempt);
                    report.attempts.push(attempt);
                    report.cancelled = true;
                    break 'wallets;
                };
                finish_attempt(&mut attempt, result);

                let failure = attempt.outcome.failure_kind();
                if let SwapOutcome::Failed {
                    kind: FailureKind::ProviderUnavailable,
                    message,
                } = &attempt.outcome
                {
                    error!("Provider unavailable, aborting run: {}", message);
                    report.aborted = Some(message.clone());
                    report.attempts.push(attempt);
                    break 'wallets;
                }
                report.attempts.push(attempt);

                let interrupted = tokio::select! {
                    biased;
                    _ = shutdown_requested(&mut shutdown) => true,
                    _ = sleep(self.config.delay_between_attempts) => false,
                };
                if interrupted {
                    report.cancelled = true;
                    break 'wallets;
                }

                if failure == Some(FailureKind::InsufficientBalance)
                    && self.config.abort_wallet_on_insufficient_balance
                {
                    warn!(
                        "[{}] Insufficient balance, skipping remaining {} attempts",
                        signer.address(),
                        self.config.attempts_per_wallet - index
                    );
                    break;
                }
            }
        }

        if report.cancelled {
            warn!("Batch cancelled by shutdown request");
        }
        info!("Batch finished: {}", report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::swap::SwapExecutorConfig,
        models::{Asset, ConfirmationPolicy, SlippageTolerance},
        services::{
            provider::MockEvmProviderTrait,
            signer::{InMemoryCredentialSource, WalletSigner},
        },
        utils::mocks::{
            ether, router, token_in, token_out, wrapped_native, MockChain, TEST_KEY_A, TEST_KEY_B,
        },
    };
    use alloy::primitives::{TxHash, U256};
    use std::sync::Arc;

    fn runner(chain: &MockChain, config: BatchConfig) -> BatchRunner<MockEvmProviderTrait> {
        runner_with_confirmation(
            chain,
            config,
            ConfirmationPolicy {
                timeout: Some(Duration::from_millis(20)),
                poll_interval: Duration::from_millis(1),
            },
        )
    }

    fn runner_with_confirmation(
        chain: &MockChain,
        config: BatchConfig,
        confirmation: ConfirmationPolicy,
    ) -> BatchRunner<MockEvmProviderTrait> {
        let mut executor_config = SwapExecutorConfig::new(router());
        executor_config.native_placeholder = Some(wrapped_native());
        executor_config.confirmation = confirmation;
        BatchRunner::new(
            SwapExecutor::new(Arc::new(chain.provider()), executor_config),
            config,
        )
    }

    fn batch(attempts: u32) -> BatchConfig {
        BatchConfig::new(attempts, Duration::ZERO, true).unwrap()
    }

    fn intent() -> SwapIntent {
        SwapIntent::new(
            Asset::token_with_decimals(token_in(), 18),
            Asset::token(token_out()),
            "1",
            Some(SlippageTolerance::from_basis_points(50).unwrap()),
        )
    }

    fn two_wallets() -> InMemoryCredentialSource {
        InMemoryCredentialSource::new([TEST_KEY_A, TEST_KEY_B])
    }

    fn address_of(key: &str) -> alloy::primitives::Address {
        WalletSigner::from_secret(key).unwrap().address()
    }

    #[test]
    fn test_batch_config_requires_an_attempt() {
        assert!(BatchConfig::new(0, Duration::ZERO, true).is_err());
        assert_eq!(BatchConfig::default().attempts_per_wallet, 5);
        assert_eq!(
            BatchConfig::default().delay_between_attempts,
            Duration::from_millis(4000)
        );
    }

    #[tokio::test]
    async fn test_failed_attempt_does_not_stop_wallet_or_batch() {
        let chain = MockChain::new(ether(100), ether(100), U256::ZERO);
        chain.reject_swap(2);
        let (_tx, shutdown) = watch::channel(false);

        let report = runner(&chain, batch(3))
            .run(&two_wallets(), &intent(), shutdown)
            .await;

        assert_eq!(report.attempts.len(), 6);
        let kinds: Vec<_> = report
            .attempts
            .iter()
            .map(|a| a.outcome.failure_kind())
            .collect();
        assert_eq!(kinds[1], Some(FailureKind::SubmitOrConfirmError));
        for (i, kind) in kinds.iter().enumerate() {
            if i != 1 {
                assert_eq!(*kind, None, "attempt {i} should be confirmed");
            }
        }

        let wallet_a = address_of(TEST_KEY_A);
        let wallet_b = address_of(TEST_KEY_B);
        assert!(report.attempts[..3].iter().all(|a| a.wallet == wallet_a));
        assert!(report.attempts[3..].iter().all(|a| a.wallet == wallet_b));
        assert_eq!(
            report.attempts.iter().map(|a| a.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 1, 2, 3]
        );
        assert_eq!(report.confirmed(), 5);
        assert_eq!(report.failed(), 1);
        assert!(report.aborted.is_none());
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_insufficient_balance_skips_rest_of_wallet() {
        let chain = MockChain::new(ether(100), U256::ZERO, U256::ZERO);
        let (_tx, shutdown) = watch::channel(false);

        let report = runner(&chain, batch(3))
            .run(&two_wallets(), &intent(), shutdown)
            .await;

        assert_eq!(report.attempts.len(), 2);
        assert_eq!(
            report.failures_by_kind().get(&FailureKind::InsufficientBalance),
            Some(&2)
        );
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_balance_keeps_going_when_disabled() {
        let chain = MockChain::new(ether(100), U256::ZERO, U256::ZERO);
        let (_tx, shutdown) = watch::channel(false);
        let config = BatchConfig::new(3, Duration::ZERO, false).unwrap();

        let report = runner(&chain, config)
            .run(&two_wallets(), &intent(), shutdown)
            .await;

        assert_eq!(report.attempts.len(), 6);
        assert_eq!(report.failed(), 6);
    }

    #[tokio::test]
    async fn test_bad_credential_skips_only_that_wallet() {
        let chain = MockChain::new(ether(100), ether(100), U256::ZERO);
        let credentials = InMemoryCredentialSource::new(["not-a-key", TEST_KEY_B]);
        let (_tx, shutdown) = watch::channel(false);

        let report = runner(&chain, batch(2))
            .run(&credentials, &intent(), shutdown)
            .await;

        assert_eq!(report.skipped_wallets.len(), 1);
        assert_eq!(report.skipped_wallets[0].position, 0);
        assert_eq!(report.attempts.len(), 2);
        assert_eq!(report.confirmed(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_provider_aborts_run() {
        let chain = MockChain {
            unreachable: true,
            ..MockChain::default()
        };
        let (_tx, shutdown) = watch::channel(false);

        let report = runner(&chain, batch(3))
            .run(&two_wallets(), &intent(), shutdown)
            .await;

        assert_eq!(report.attempts.len(), 1);
        assert_eq!(
            report.attempts[0].outcome.failure_kind(),
            Some(FailureKind::ProviderUnavailable)
        );
        assert!(report.aborted.is_some());
        assert!(report.to_string().contains("aborted"));
    }

    #[tokio::test]
    async fn test_shutdown_before_start_runs_nothing() {
        let chain = MockChain::new(ether(100), ether(100), U256::ZERO);
        let (tx, shutdown) = watch::channel(false);
        tx.send(true).unwrap();

        let report = runner(&chain, batch(3))
            .run(&two_wallets(), &intent(), shutdown)
            .await;

        assert!(report.attempts.is_empty());
        assert!(report.cancelled);
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_marks_in_flight_attempt_unknown() {
        let chain = MockChain {
            never_mined: true,
            ..MockChain::new(ether(100), ether(100), U256::ZERO)
        };
        let runner = runner_with_confirmation(
            &chain,
            batch(3),
            ConfirmationPolicy {
                timeout: None,
                poll_interval: Duration::from_millis(1),
            },
        );
        let (tx, shutdown) = watch::channel(false);

        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });
        let report = runner.run(&two_wallets(), &intent(), shutdown).await;

        assert!(report.cancelled);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(
            report.attempts[0].outcome,
            SwapOutcome::Unknown {
                tx_hash: Some(TxHash::with_last_byte(1))
            }
        );
        assert_eq!(chain.swaps().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_does_not_cancel() {
        let chain = MockChain::new(ether(100), ether(100), U256::ZERO);
        let (tx, shutdown) = watch::channel(false);
        drop(tx);

        let report = runner(&chain, batch(2))
            .run(&two_wallets(), &intent(), shutdown)
            .await;

        assert_eq!(report.confirmed(), 4);
        assert!(!report.cancelled);
    }
}
