use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Router entry point selected for a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum EntryPoint {
    /// `swapExactTokensForTokens`
    TokenToToken,
    /// `swapExactETHForTokens`, the only entry point that carries native value
    NativeToToken,
    /// `swapExactTokensForETH`
    TokenToNative,
}

impl EntryPoint {
    pub fn is_payable(&self) -> bool {
        matches!(self, EntryPoint::NativeToToken)
    }
}

/// Entry point plus the ordered token path handed to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRoute {
    pub entry_point: EntryPoint,
    pub path: Vec<Address>,
}
