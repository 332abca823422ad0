//! Single swap attempt, end to end.
//!
//! The executor resolves the route and amounts, runs the balance and allowance
//! preconditions, submits the router call and waits for it to be mined. Errors never
//! escape [`SwapExecutor::execute`]: each one becomes a `Failed` outcome on the attempt.

use std::sync::Arc;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use dashmap::DashMap;
use log::{info, warn};

use super::{
    abi::IUniswapV2Router02, read_decimals, to_base_units, to_human, AllowanceManager,
    BalanceGuard, PathResolver,
};
use crate::{
    constants::{DEFAULT_DEADLINE_SECONDS, DEFAULT_SWAP_GAS_LIMIT, NATIVE_DECIMALS},
    models::{
        ApprovalOutcome, ApprovalPolicy, Asset, ConfirmationPolicy, EntryPoint, SwapAttempt,
        SwapError, SwapIntent, SwapOutcome, SwapRoute,
    },
    services::{provider::EvmProviderTrait, signer::WalletSigner},
    utils::{deadline_from_now, wait_for_receipt, ConfirmationError},
};

/// Settings shared by every attempt of a run.
#[derive(Debug, Clone)]
pub struct SwapExecutorConfig {
    pub router: Address,
    /// Seconds between submission time and the router deadline.
    pub deadline_seconds: i64,
    /// Fixed gas limit for approvals and swaps; `None` lets the node estimate.
    pub gas_limit: Option<u64>,
    pub confirmation: ConfirmationPolicy,
    pub approval_policy: ApprovalPolicy,
    pub native_placeholder: Option<Address>,
}

impl SwapExecutorConfig {
    pub fn new(router: Address) -> Self {
        Self {
            router,
            deadline_seconds: DEFAULT_DEADLINE_SECONDS,
            gas_limit: Some(DEFAULT_SWAP_GAS_LIMIT),
            confirmation: ConfirmationPolicy::default(),
            approval_policy: ApprovalPolicy::default(),
            native_placeholder: None,
        }
    }
}

pub struct SwapExecutor<P>
where
    P: EvmProviderTrait,
{
    provider: Arc<P>,
    config: SwapExecutorConfig,
    balance_guard: BalanceGuard<P>,
    allowance_manager: AllowanceManager<P>,
    path_resolver: PathResolver,
    decimals_cache: DashMap<Address, u8>,
}

impl<P> SwapExecutor<P>
where
    P: EvmProviderTrait,
{
    pub fn new(provider: Arc<P>, config: SwapExecutorConfig) -> Self {
        Self {
            balance_guard: BalanceGuard::new(Arc::clone(&provider)),
            allowance_manager: AllowanceManager::new(
                Arc::clone(&provider),
                config.approval_policy,
                config.confirmation,
                config.gas_limit,
            ),
            path_resolver: PathResolver::new(config.native_placeholder),
            decimals_cache: DashMap::new(),
            provider,
            config,
        }
    }

    /// Runs one attempt and returns it in a terminal state.
    pub async fn execute(
        &self,
        signer: &WalletSigner,
        intent: &SwapIntent,
        index: u32,
    ) -> SwapAttempt {
        let mut attempt = SwapAttempt::new(signer.address(), index);
        let result = self.run_attempt(signer, intent, &mut attempt).await;
        finish_attempt(&mut attempt, result);
        attempt
    }

    /// Drives `attempt` through approval, submission and confirmation.
    ///
    /// Progress is recorded on `attempt` as it happens, so a caller that abandons this
    /// future still sees how far the attempt got. The router call is sent at most once.
    pub async fn run_attempt(
        &self,
        signer: &WalletSigner,
        intent: &SwapIntent,
        attempt: &mut SwapAttempt,
    ) -> Result<(), SwapError> {
        let owner = signer.address();

        // Pure check first so an impossible intent never touches the chain.
        let route = self.path_resolver.resolve(&intent.input, &intent.output)?;

        let decimals = self.input_decimals(&intent.input).await?;
        let amount_in = to_base_units(&intent.amount, decimals)?;
        if amount_in.is_zero() {
            return Err(SwapError::InvalidIntent(format!(
                "amount {} is zero",
                intent.amount
            )));
        }

        self.check_balance(owner, &intent.input, amount_in).await?;

        if let Asset::Token { address, .. } = intent.input {
            let outcome = self
                .allowance_manager
                .ensure_allowance(signer, self.config.router, address, amount_in)
                .await?;
            if let ApprovalOutcome::Approved {
                tx_hash,
                block_number,
            } = outcome
            {
                attempt.advance(SwapOutcome::Approved {
                    tx_hash,
                    block_number,
                });
            }
        }

        let min_amount_out = intent.min_amount_out(amount_in);
        if !intent.is_protected() {
            warn!("[{}] Swapping without slippage protection", owner);
        }
        let deadline = deadline_from_now(self.config.deadline_seconds);

        info!(
            "[{}] Swapping {} for {} via {} (min out {}, deadline {})",
            owner,
            describe_amount(&intent.input.with_decimals(decimals), amount_in),
            intent.output,
            route.entry_point,
            min_amount_out,
            deadline
        );

        let mut tx = TransactionRequest::default()
            .with_from(owner)
            .with_to(self.config.router)
            .with_input(encode_swap(&route, amount_in, min_amount_out, owner, deadline));
        if route.entry_point.is_payable() {
            tx = tx.with_value(amount_in);
        }
        if let Some(gas_limit) = self.config.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let tx_hash = self.provider.send_transaction(signer, tx).await?;
        attempt.advance(SwapOutcome::Submitted { tx_hash });
        info!("[{}] Swap submitted: {}", owner, tx_hash);

        let receipt = wait_for_receipt(
            self.provider.as_ref(),
            tx_hash,
            self.config.confirmation.timeout,
            self.config.confirmation.poll_interval,
        )
        .await
        .map_err(|e| match e {
            ConfirmationError::Timeout { .. } => SwapError::SwapTimeout(e.to_string()),
            ConfirmationError::Provider(err) => SwapError::from(err),
        })?;

        if !receipt.success {
            return Err(SwapError::SubmitOrConfirm(format!(
                "swap {tx_hash} reverted"
            )));
        }

        attempt.advance(SwapOutcome::Confirmed {
            tx_hash,
            block_number: receipt.block_number.unwrap_or_default(),
        });
        Ok(())
    }

    /// Decimals of the input asset: configured value, then cache, then `decimals()`.
    async fn input_decimals(&self, asset: &Asset) -> Result<u8, SwapError> {
        let address = match asset {
            Asset::Native => return Ok(NATIVE_DECIMALS),
            Asset::Token {
                decimals: Some(decimals),
                ..
            } => return Ok(*decimals),
            Asset::Token { address, .. } => *address,
        };

        if let Some(decimals) = self.decimals_cache.get(&address) {
            return Ok(*decimals);
        }

        let decimals = read_decimals(self.provider.as_ref(), address)
            .await
            .map_err(|e| {
                SwapError::from_provider(e, |msg| {
                    SwapError::InvalidIntent(format!("cannot read decimals: {msg}"))
                })
            })?;
        self.decimals_cache.insert(address, decimals);
        Ok(decimals)
    }

    async fn check_balance(
        &self,
        owner: Address,
        asset: &Asset,
        required: U256,
    ) -> Result<(), SwapError> {
        match self.balance_guard.check_sufficient(owner, asset, required).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                let balance = self
                    .balance_guard
                    .balance_of(owner, asset)
                    .await
                    .map(|b| b.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                Err(SwapError::InsufficientBalance(format!(
                    "{owner} holds {balance} of {asset}, needs {required}"
                )))
            }
            Err(e) if e.is_unavailable() => Err(SwapError::from(e)),
            // The check is advisory; the chain still rejects an underfunded swap.
            Err(e) => {
                warn!("[{}] Balance check skipped: {}", owner, e);
                Ok(())
            }
        }
    }
}

fn encode_swap(
    route: &SwapRoute,
    amount_in: U256,
    min_amount_out: U256,
    recipient: Address,
    deadline: U256,
) -> Vec<u8> {
    let path = route.path.clone();
    match route.entry_point {
        EntryPoint::TokenToToken => IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: amount_in,
            amountOutMin: min_amount_out,
            path,
            to: recipient,
            deadline,
        }
        .abi_encode(),
        EntryPoint::NativeToToken => IUniswapV2Router02::swapExactETHForTokensCall {
            amountOutMin: min_amount_out,
            path,
            to: recipient,
            deadline,
        }
        .abi_encode(),
        EntryPoint::TokenToNative => IUniswapV2Router02::swapExactTokensForETHCall {
            amountIn: amount_in,
            amountOutMin: min_amount_out,
            path,
            to: recipient,
            deadline,
        }
        .abi_encode(),
    }
}

/// Records the result of [`SwapExecutor::run_attempt`] on the attempt and logs the outcome.
pub fn finish_attempt(attempt: &mut SwapAttempt, result: Result<(), SwapError>) {
    if let Err(err) = result {
        attempt.fail(err.kind(), err.to_string());
    }
    log_attempt(attempt);
}

/// One log line per attempt: wallet, index and outcome.
pub fn log_attempt(attempt: &SwapAttempt) {
    match &attempt.outcome {
        SwapOutcome::Failed { .. } | SwapOutcome::Unknown { .. } => warn!(
            "[{}] Swap #{} {}",
            attempt.wallet, attempt.index, attempt.outcome
        ),
        _ => info!(
            "[{}] Swap #{} {}",
            attempt.wallet, attempt.index, attempt.outcome
        ),
    }
}

/// Human-readable form of an amount of `asset`, for logs.
pub fn describe_amount(asset: &Asset, amount: U256) -> String {
    match asset {
        Asset::Native => format!("{} native", to_human(amount, NATIVE_DECIMALS)),
        Asset::Token {
            address,
            decimals: Some(decimals),
        } => format!("{} of {}", to_human(amount, *decimals), address),
        Asset::Token { address, .. } => format!("{amount} base units of {address}"),
    }
}
