use std::{fmt, str::FromStr};

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{BASIS_POINTS_DENOMINATOR, SLIPPAGE_DECIMALS},
    domain::swap::{to_base_units, to_human},
    models::{AmountError, Asset},
};

/// Fractional slippage tolerance, stored in basis points (1 bp = 0.0001).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageTolerance(u32);

impl SlippageTolerance {
    /// Tolerances of 100% or more would be indistinguishable from an unprotected swap.
    pub fn from_basis_points(bps: u32) -> Result<Self, AmountError> {
        if u64::from(bps) >= BASIS_POINTS_DENOMINATOR {
            return Err(AmountError::InvalidAmount(
                bps.to_string(),
                "slippage tolerance must be below 100%".to_string(),
            ));
        }
        Ok(Self(bps))
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// Linear minimum-output floor: `amount - amount * tolerance`.
    ///
    /// The result is in input-token base units, yet it is passed to the router as
    /// `amountOutMin`, which is read in output-token base units. It ignores the pool
    /// price, so a protected swap between assets with different decimals (native at 18
    /// into a 6-decimal token, for example) will revert on the output check.
    pub fn min_amount_out(&self, amount_in: U256) -> U256 {
        let bps = U256::from(self.0);
        let denominator = U256::from(BASIS_POINTS_DENOMINATOR);
        let shortfall = match amount_in.checked_mul(bps) {
            Some(product) => product / denominator,
            None => amount_in / denominator * bps,
        };
        amount_in.saturating_sub(shortfall)
    }
}

impl FromStr for SlippageTolerance {
    type Err = AmountError;

    /// Parses a fraction such as `0.005` (0.5%).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bps = to_base_units(s, SLIPPAGE_DECIMALS)?;
        let bps = u32::try_from(bps).map_err(|_| {
            AmountError::InvalidAmount(
                s.to_string(),
                "slippage tolerance must be below 1".to_string(),
            )
        })?;
        Self::from_basis_points(bps)
    }
}

impl fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            to_human(U256::from(self.0), SLIPPAGE_DECIMALS)
        )
    }
}

/// What a single swap attempt should do. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIntent {
    pub input: Asset,
    pub output: Asset,
    /// Human-denominated amount of the input asset, e.g. `"0.005"`.
    pub amount: String,
    /// `None` selects the unprotected mode where `minAmountOut` is zero.
    pub slippage: Option<SlippageTolerance>,
}

impl SwapIntent {
    pub fn new(
        input: Asset,
        output: Asset,
        amount: impl Into<String>,
        slippage: Option<SlippageTolerance>,
    ) -> Self {
        Self {
            input,
            output,
            amount: amount.into(),
            slippage,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.slippage.is_some()
    }

    pub fn min_amount_out(&self, amount_in: U256) -> U256 {
        self.slippage
            .map(|tolerance| tolerance.min_amount_out(amount_in))
            .unwrap_or(U256::ZERO)
    }
}

impl fmt::Display for SwapIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.amount, self.input, self.output)
    }
}
