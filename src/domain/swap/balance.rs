//! Advisory balance check run before anything is sent.
//!
//! The chain remains the authority: a swap can still fail if the balance moves between
//! this check and submission. Skipping a doomed attempt early only saves gas.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use log::debug;

use super::read_balance_of;
use crate::{
    models::Asset,
    services::provider::{EvmProviderTrait, ProviderError},
};

pub struct BalanceGuard<P>
where
    P: EvmProviderTrait,
{
    provider: Arc<P>,
}

impl<P> BalanceGuard<P>
where
    P: EvmProviderTrait,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Returns `Ok(false)` when `owner` cannot cover `required`; only read failures are errors.
    pub async fn check_sufficient(
        &self,
        owner: Address,
        asset: &Asset,
        required: U256,
    ) -> Result<bool, ProviderError> {
        let balance = self.balance_of(owner, asset).await?;
        debug!(
            "[{}] {} balance {} (required {})",
            owner, asset, balance, required
        );
        Ok(balance >= required)
    }

    pub async fn balance_of(&self, owner: Address, asset: &Asset) -> Result<U256, ProviderError> {
        match asset {
            Asset::Native => self.provider.get_balance(owner).await,
            Asset::Token { address, .. } => {
                read_balance_of(self.provider.as_ref(), *address, owner).await
            }
        }
    }
}
