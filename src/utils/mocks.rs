//! Scripted chain used by the swap engine tests.
//!
//! `MockChain` keeps token and native balances, the router allowance, and every
//! transaction the engine sends. `MockChain::provider` wires a `MockEvmProviderTrait`
//! whose answers come from that state, so approvals raise the allowance exactly as the
//! token contract would.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
    sol_types::{SolCall, SolValue},
};
use futures::FutureExt;

use crate::{
    domain::swap::abi::{IUniswapV2Router02, IERC20},
    services::{
        provider::{MockEvmProviderTrait, ProviderError, ReceiptSummary},
        signer::WalletSigner,
    },
};

pub const TEST_KEY_A: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_KEY_B: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const MINED_BLOCK: u64 = 100;

pub fn token_in() -> Address {
    Address::repeat_byte(0x11)
}

pub fn token_out() -> Address {
    Address::repeat_byte(0x22)
}

pub fn router() -> Address {
    Address::repeat_byte(0x33)
}

pub fn wrapped_native() -> Address {
    Address::repeat_byte(0x44)
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u8))
}

pub fn test_signer() -> WalletSigner {
    WalletSigner::from_secret(TEST_KEY_A).unwrap()
}

/// A transaction the engine handed to the provider.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub selector: [u8; 4],
    pub input: Bytes,
    pub value: U256,
    pub gas_limit: Option<u64>,
}

impl SentTransaction {
    pub fn is_approval(&self) -> bool {
        self.selector == IERC20::approveCall::SELECTOR
    }

    pub fn is_swap(&self) -> bool {
        [
            IUniswapV2Router02::swapExactTokensForTokensCall::SELECTOR,
            IUniswapV2Router02::swapExactETHForTokensCall::SELECTOR,
            IUniswapV2Router02::swapExactTokensForETHCall::SELECTOR,
        ]
        .contains(&self.selector)
    }
}

#[derive(Clone)]
pub struct MockChain {
    pub decimals: u8,
    pub allowance: Arc<Mutex<U256>>,
    pub token_balance: Arc<Mutex<U256>>,
    pub native_balance: Arc<Mutex<U256>>,
    pub sent: Arc<Mutex<Vec<SentTransaction>>>,
    pub reads: Arc<Mutex<Vec<[u8; 4]>>>,
    /// 1-based numbers of swap submissions the node rejects.
    pub rejected_swaps: Arc<Mutex<HashSet<usize>>>,
    /// 1-based numbers of swap submissions that are mined but revert.
    pub reverted_swaps: Arc<Mutex<HashSet<usize>>>,
    pub approvals_revert: bool,
    pub never_mined: bool,
    pub unreachable: bool,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            decimals: 18,
            allowance: Arc::new(Mutex::new(U256::ZERO)),
            token_balance: Arc::new(Mutex::new(U256::ZERO)),
            native_balance: Arc::new(Mutex::new(U256::ZERO)),
            sent: Arc::new(Mutex::new(Vec::new())),
            reads: Arc::new(Mutex::new(Vec::new())),
            rejected_swaps: Arc::new(Mutex::new(HashSet::new())),
            reverted_swaps: Arc::new(Mutex::new(HashSet::new())),
            approvals_revert: false,
            never_mined: false,
            unreachable: false,
        }
    }
}

impl MockChain {
    pub fn new(allowance: U256, token_balance: U256, native_balance: U256) -> Self {
        let chain = Self::default();
        *chain.allowance.lock().unwrap() = allowance;
        *chain.token_balance.lock().unwrap() = token_balance;
        *chain.native_balance.lock().unwrap() = native_balance;
        chain
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn approvals(&self) -> Vec<SentTransaction> {
        self.sent().into_iter().filter(|tx| tx.is_approval()).collect()
    }

    pub fn swaps(&self) -> Vec<SentTransaction> {
        self.sent().into_iter().filter(|tx| tx.is_swap()).collect()
    }

    pub fn reject_swap(&self, submission: usize) {
        self.rejected_swaps.lock().unwrap().insert(submission);
    }

    pub fn revert_swap(&self, submission: usize) {
        self.reverted_swaps.lock().unwrap().insert(submission);
    }

    pub fn provider(&self) -> MockEvmProviderTrait {
        let mut mock = MockEvmProviderTrait::new();

        let unreachable = self.unreachable;
        let native_balance = Arc::clone(&self.native_balance);
        mock.expect_get_balance().returning(move |_| {
            let balance = *native_balance.lock().unwrap();
            async move {
                if unreachable {
                    Err(ProviderError::Unreachable("connection refused".into()))
                } else {
                    Ok(balance)
                }
            }
            .boxed()
        });

        mock.expect_get_block_number()
            .returning(|| async { Ok(MINED_BLOCK) }.boxed());

        let decimals = self.decimals;
        let allowance = Arc::clone(&self.allowance);
        let token_balance = Arc::clone(&self.token_balance);
        let reads = Arc::clone(&self.reads);
        mock.expect_call_contract().returning(move |tx| {
            let input = tx.input.input().cloned().unwrap_or_default();
            let selector = selector_of(&input);
            reads.lock().unwrap().push(selector);

            let response = if unreachable {
                Err(ProviderError::Unreachable("connection refused".into()))
            } else if selector == IERC20::decimalsCall::SELECTOR {
                Ok(encode_word(U256::from(decimals)))
            } else if selector == IERC20::allowanceCall::SELECTOR {
                Ok(encode_word(*allowance.lock().unwrap()))
            } else if selector == IERC20::balanceOfCall::SELECTOR {
                Ok(encode_word(*token_balance.lock().unwrap()))
            } else {
                Err(ProviderError::Other(format!(
                    "unexpected call selector {selector:?}"
                )))
            };
            async move { response }.boxed()
        });

        let sent = Arc::clone(&self.sent);
        let allowance = Arc::clone(&self.allowance);
        let rejected_swaps = Arc::clone(&self.rejected_swaps);
        mock.expect_send_transaction()
            .returning(move |_signer: &WalletSigner, tx: TransactionRequest| {
                let record = record_of(&tx);
                let mut sent = sent.lock().unwrap();
                sent.push(record.clone());
                let tx_hash = TxHash::with_last_byte(sent.len() as u8);

                let response = if unreachable {
                    Err(ProviderError::Unreachable("connection refused".into()))
                } else if record.is_approval() {
                    if let Ok(call) = IERC20::approveCall::abi_decode(&record.input) {
                        *allowance.lock().unwrap() = call.amount;
                    }
                    Ok(tx_hash)
                } else {
                    let submission = sent.iter().filter(|tx| tx.is_swap()).count();
                    if rejected_swaps.lock().unwrap().contains(&submission) {
                        Err(ProviderError::RpcErrorCode {
                            code: -32000,
                            message: "execution reverted".into(),
                        })
                    } else {
                        Ok(tx_hash)
                    }
                };
                async move { response }.boxed()
            });

        let sent = Arc::clone(&self.sent);
        let reverted_swaps = Arc::clone(&self.reverted_swaps);
        let approvals_revert = self.approvals_revert;
        let never_mined = self.never_mined;
        mock.expect_get_transaction_receipt().returning(move |tx_hash| {
            let sent = sent.lock().unwrap();
            let position = usize::from(tx_hash.0[31]).saturating_sub(1);
            let success = match sent.get(position) {
                Some(tx) if tx.is_approval() => !approvals_revert,
                Some(_) => {
                    let submission = sent[..=position].iter().filter(|tx| tx.is_swap()).count();
                    !reverted_swaps.lock().unwrap().contains(&submission)
                }
                None => false,
            };
            let receipt = (!never_mined).then_some(ReceiptSummary {
                tx_hash,
                block_number: Some(MINED_BLOCK),
                success,
            });
            async move { Ok(receipt) }.boxed()
        });

        mock
    }
}

fn selector_of(input: &[u8]) -> [u8; 4] {
    let mut selector = [0u8; 4];
    if input.len() >= 4 {
        selector.copy_from_slice(&input[..4]);
    }
    selector
}

fn encode_word(value: U256) -> Bytes {
    Bytes::from(value.abi_encode())
}

fn record_of(tx: &TransactionRequest) -> SentTransaction {
    let input = tx.input.input().cloned().unwrap_or_default();
    SentTransaction {
        from: tx.from,
        to: tx.to.and_then(|kind| kind.to().copied()),
        selector: selector_of(&input),
        input,
        value: tx.value.unwrap_or_default(),
        gas_limit: tx.gas,
    }
}
