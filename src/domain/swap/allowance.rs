//! Router allowance management.
//!
//! The allowance is read fresh on every call; other transactions can change it between
//! attempts, so nothing is cached.

use std::sync::Arc;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use log::{debug, info};

use super::{abi::IERC20, read_allowance};
use crate::{
    models::{ApprovalOutcome, ApprovalPolicy, ConfirmationPolicy, SwapError},
    services::{provider::EvmProviderTrait, signer::WalletSigner},
    utils::{wait_for_receipt, ConfirmationError},
};

pub struct AllowanceManager<P>
where
    P: EvmProviderTrait,
{
    provider: Arc<P>,
    policy: ApprovalPolicy,
    confirmation: ConfirmationPolicy,
    gas_limit: Option<u64>,
}

impl<P> AllowanceManager<P>
where
    P: EvmProviderTrait,
{
    pub fn new(
        provider: Arc<P>,
        policy: ApprovalPolicy,
        confirmation: ConfirmationPolicy,
        gas_limit: Option<u64>,
    ) -> Self {
        Self {
            provider,
            policy,
            confirmation,
            gas_limit,
        }
    }

    /// Makes sure `spender` may move at least `required` of `token` on behalf of the signer.
    ///
    /// Sends at most one `approve` transaction and waits for it to be mined. When the
    /// current allowance already covers `required` nothing is sent.
    pub async fn ensure_allowance(
        &self,
        signer: &WalletSigner,
        spender: Address,
        token: Address,
        required: U256,
    ) -> Result<ApprovalOutcome, SwapError> {
        let owner = signer.address();
        let current = read_allowance(self.provider.as_ref(), token, owner, spender)
            .await
            .map_err(|e| SwapError::from_provider(e, SwapError::ApprovalRejected))?;

        if current >= required {
            debug!(
                "[{}] allowance {} covers required {}",
                owner, current, required
            );
            return Ok(ApprovalOutcome::AlreadySufficient);
        }

        let amount = self.policy.approval_amount(required);
        info!(
            "[{}] Approving token {} for spender {} (policy {:?}, allowance {} < {})",
            owner, token, spender, self.policy, current, required
        );

        let call = IERC20::approveCall { spender, amount };
        let mut tx = TransactionRequest::default()
            .with_from(owner)
            .with_to(token)
            .with_input(call.abi_encode());
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let tx_hash = self
            .provider
            .send_transaction(signer, tx)
            .await
            .map_err(|e| SwapError::from_provider(e, SwapError::ApprovalRejected))?;

        let receipt = wait_for_receipt(
            self.provider.as_ref(),
            tx_hash,
            self.confirmation.timeout,
            self.confirmation.poll_interval,
        )
        .await
        .map_err(|e| match e {
            ConfirmationError::Timeout { .. } => SwapError::ApprovalTimeout(e.to_string()),
            ConfirmationError::Provider(err) => {
                SwapError::from_provider(err, SwapError::ApprovalRejected)
            }
        })?;

        if !receipt.success {
            return Err(SwapError::ApprovalRejected(format!(
                "approval {tx_hash} reverted"
            )));
        }

        let block_number = receipt.block_number.unwrap_or_default();
        info!(
            "[{}] Token approved in tx {} (block {})",
            owner, tx_hash, block_number
        );
        Ok(ApprovalOutcome::Approved {
            tx_hash,
            block_number,
        })
    }
}
