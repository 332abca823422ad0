//! EVM Provider implementation for interacting with EVM-compatible blockchain networks.
//!
//! A single HTTP RPC client is shared by every wallet of a run. Reads go through the
//! shared root provider; writes build a short-lived wallet-filling provider on top of the
//! same client so each wallet's key stays with that wallet.

use std::time::Duration;

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::{
        client::{ClientBuilder, RpcClient},
        types::TransactionRequest,
    },
    transports::http::Http,
};
use async_trait::async_trait;
use log::debug;
use reqwest::ClientBuilder as ReqwestClientBuilder;

use super::{retry_rpc_call, ProviderError, RetryConfig};
use crate::services::signer::WalletSigner;

#[cfg(test)]
use mockall::automock;

/// What the swap engine needs to know about a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Trait defining the chain operations used by the swap engine.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait EvmProviderTrait: Send + Sync {
    /// Gets the balance of an address in the native currency.
    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError>;

    /// Gets the current block number of the chain.
    async fn get_block_number(&self) -> Result<u64, ProviderError>;

    /// Executes a read-only contract call and returns the raw return data.
    async fn call_contract(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError>;

    /// Signs the transaction with `signer`, broadcasts it and returns its hash.
    ///
    /// Nonce, chain id and fees are filled in by the provider.
    async fn send_transaction(
        &self,
        signer: &WalletSigner,
        tx: TransactionRequest,
    ) -> Result<TxHash, ProviderError>;

    /// Gets a transaction receipt by its hash, `None` while the transaction is pending.
    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptSummary>, ProviderError>;
}

/// Provider implementation for EVM-compatible blockchain networks.
#[derive(Clone)]
pub struct EvmProvider {
    client: RpcClient,
    provider: RootProvider,
    retry_config: RetryConfig,
}

impl EvmProvider {
    /// Creates a new EVM provider instance.
    ///
    /// # Arguments
    /// * `rpc_url` - JSON-RPC endpoint
    /// * `timeout_seconds` - HTTP timeout applied to every request
    /// * `retry_config` - backoff used for read-only calls
    pub fn new(
        rpc_url: &str,
        timeout_seconds: u64,
        retry_config: RetryConfig,
    ) -> Result<Self, ProviderError> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| ProviderError::NetworkConfiguration(format!("Invalid URL format: {e}")))?;

        // Using use_rustls_tls() forces the use of rustls instead of native-tls to support TLS 1.3
        let http_client = ReqwestClientBuilder::new()
            .timeout(Duration::from_secs(timeout_seconds))
            .use_rustls_tls()
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to build HTTP client: {e}")))?;

        let transport = Http::with_client(http_client, url);
        let is_local = transport.guess_local();
        let client = ClientBuilder::default().transport(transport, is_local);
        let provider = RootProvider::new(client.clone());

        Ok(Self {
            client,
            provider,
            retry_config,
        })
    }

    async fn retry_rpc_call<T, F, Fut>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, ProviderError>
    where
        F: Fn(RootProvider) -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        debug!("Starting RPC operation '{}'", operation_name);
        retry_rpc_call(operation_name, &self.retry_config, || {
            operation(self.provider.clone())
        })
        .await
    }
}

#[async_trait]
impl EvmProviderTrait for EvmProvider {
    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        self.retry_rpc_call("get_balance", move |provider| async move {
            provider
                .get_balance(address)
                .await
                .map_err(ProviderError::from)
        })
        .await
    }

    async fn get_block_number(&self) -> Result<u64, ProviderError> {
        self.retry_rpc_call("get_block_number", |provider| async move {
            provider
                .get_block_number()
                .await
                .map_err(ProviderError::from)
        })
        .await
    }

    async fn call_contract(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError> {
        self.retry_rpc_call("call_contract", move |provider| {
            let tx_req = tx.clone();
            async move { provider.call(tx_req).await.map_err(ProviderError::from) }
        })
        .await
    }

    async fn send_transaction(
        &self,
        signer: &WalletSigner,
        tx: TransactionRequest,
    ) -> Result<TxHash, ProviderError> {
        let wallet = EthereumWallet::from(signer.local_signer().clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_client(self.client.clone());

        let pending_tx = provider
            .send_transaction(tx)
            .await
            .map_err(ProviderError::from)?;

        Ok(*pending_tx.tx_hash())
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptSummary>, ProviderError> {
        let receipt = self
            .retry_rpc_call("get_transaction_receipt", move |provider| async move {
                provider
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(ProviderError::from)
            })
            .await?;

        Ok(receipt.map(|receipt| ReceiptSummary {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            success: receipt.status(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_new_provider_rejects_invalid_url() {
        let result = EvmProvider::new("not a url", 5, RetryConfig::default());
        assert!(matches!(
            result,
            Err(ProviderError::NetworkConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_new_provider_accepts_http_url() {
        let result = EvmProvider::new("http://localhost:8545", 5, RetryConfig::default());
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_surfaces_as_unavailable() {
        let provider =
            EvmProvider::new("http://127.0.0.1:1", 2, RetryConfig::new(0, 1, 1)).unwrap();

        let err = provider.get_block_number().await.unwrap_err();
        assert!(err.is_unavailable(), "expected Unreachable, got {err:?}");
    }

    #[tokio::test]
    async fn test_mock_receipt_lookup() {
        let mut mock = MockEvmProviderTrait::new();
        let hash = TxHash::repeat_byte(0x42);
        mock.expect_get_transaction_receipt()
            .with(mockall::predicate::eq(hash))
            .times(1)
            .returning(move |tx_hash| {
                async move {
                    Ok(Some(ReceiptSummary {
                        tx_hash,
                        block_number: Some(12),
                        success: true,
                    }))
                }
                .boxed()
            });

        let receipt = mock.get_transaction_receipt(hash).await.unwrap().unwrap();
        assert_eq!(receipt.block_number, Some(12));
        assert!(receipt.success);
    }
}
