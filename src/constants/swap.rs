//! Swap execution defaults

/// Number of swap attempts per wallet
pub const DEFAULT_SWAP_COUNT: u32 = 5;

/// Delay between two attempts of the same wallet (in milliseconds)
pub const DEFAULT_SWAP_DELAY_MS: u64 = 4_000;

/// Seconds added to the current time to build the router deadline
pub const DEFAULT_DEADLINE_SECONDS: i64 = 1_800;

/// Fixed gas limit attached to approvals and swaps
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 300_000;

/// Largest decimals count whose scale factor still fits in 256 bits
pub const MAX_TOKEN_DECIMALS: u8 = 77;

/// Slippage tolerance is stored in basis points
pub const SLIPPAGE_DECIMALS: u8 = 4;
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

/// Reserved address some tooling uses to denote the chain's native currency
pub const NATIVE_SENTINEL_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Case-insensitive aliases accepted for the native currency in configuration
pub const NATIVE_ALIASES: [&str; 2] = ["native", "eth"];

/// Decimals of the native currency on EVM chains
pub const NATIVE_DECIMALS: u8 = 18;
