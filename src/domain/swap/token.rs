//! Read-only ERC-20 queries.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};

use super::abi::IERC20;
use crate::services::provider::{EvmProviderTrait, ProviderError};

async fn call_token<P, C>(provider: &P, token: Address, call: C) -> Result<C::Return, ProviderError>
where
    P: EvmProviderTrait + ?Sized,
    C: SolCall,
{
    let tx = TransactionRequest::default()
        .with_to(token)
        .with_input(call.abi_encode());
    let data = provider.call_contract(&tx).await?;
    Ok(C::abi_decode_returns(&data)?)
}

pub async fn read_decimals<P>(provider: &P, token: Address) -> Result<u8, ProviderError>
where
    P: EvmProviderTrait + ?Sized,
{
    call_token(provider, token, IERC20::decimalsCall {}).await
}

pub async fn read_balance_of<P>(
    provider: &P,
    token: Address,
    account: Address,
) -> Result<U256, ProviderError>
where
    P: EvmProviderTrait + ?Sized,
{
    call_token(provider, token, IERC20::balanceOfCall { account }).await
}

pub async fn read_allowance<P>(
    provider: &P,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, ProviderError>
where
    P: EvmProviderTrait + ?Sized,
{
    call_token(provider, token, IERC20::allowanceCall { owner, spender }).await
}
